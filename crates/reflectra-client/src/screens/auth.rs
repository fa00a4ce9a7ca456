use reflectra_shared::validation::{self, RegistrationForm, ResetConfirmForm};
use reflectra_shared::{ReflectraError, Result, ValidationError};

use super::scope::{scoped_call, ScreenState, Scoped};
use crate::api::ApiClient;

/// Where the two-step password reset stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResetStep {
    #[default]
    Request,
    /// A code was emailed to this address.
    Confirm { email: String },
    Done,
}

#[derive(Debug, Default)]
pub struct AuthState {
    reset: ResetStep,
    notice: Option<String>,
}

impl ScreenState for AuthState {
    fn notice_mut(&mut self) -> &mut Option<String> {
        &mut self.notice
    }
}

/// Sign-in, sign-up and password reset. Works on the transport directly
/// since none of these calls carry a credential.
pub struct AuthScreen {
    api: ApiClient,
    scoped: Scoped<AuthState>,
}

impl AuthScreen {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            scoped: Scoped::new(AuthState::default()),
        }
    }

    fn reject(&self, context: &'static str, e: ValidationError) -> ReflectraError {
        let err = ReflectraError::from(e);
        self.scoped.report(context, &err);
        err
    }

    fn succeed(&self, message: String) {
        self.scoped.apply(|s| s.notice = Some(message));
    }

    /// Sign in with a username or an email. Returns the canonical username.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<String> {
        let request = validation::login(identifier, password).map_err(|e| self.reject("login", e))?;
        let response = scoped_call(&self.scoped, "login", self.api.login(&request)).await?;
        self.succeed(format!("Login successful! Welcome, {}", response.user));
        Ok(response.user)
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<()> {
        let request = validation::registration(form).map_err(|e| self.reject("register", e))?;
        scoped_call(&self.scoped, "register", self.api.register(&request)).await?;
        self.succeed("Registration successful! You can now sign in.".to_string());
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let request = validation::reset_request(email)
            .map_err(|e| self.reject("password reset", e))?;
        scoped_call(
            &self.scoped,
            "password reset",
            self.api.request_password_reset(&request),
        )
        .await?;
        self.scoped.apply(|s| {
            s.reset = ResetStep::Confirm {
                email: request.email.clone(),
            };
            s.notice = Some("A verification code has been sent to your email.".to_string());
        });
        Ok(())
    }

    pub async fn confirm_password_reset(&self, form: &ResetConfirmForm) -> Result<()> {
        let request = validation::reset_confirm(form)
            .map_err(|e| self.reject("password reset", e))?;
        scoped_call(
            &self.scoped,
            "password reset",
            self.api.confirm_password_reset(&request),
        )
        .await?;
        self.scoped.apply(|s| {
            s.reset = ResetStep::Done;
            s.notice = Some("Password updated! You can sign in now.".to_string());
        });
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.api.logout()?;
        self.scoped.apply(|s| s.notice = None);
        Ok(())
    }

    pub fn reset_step(&self) -> ResetStep {
        self.scoped.read(|s| s.reset.clone())
    }

    pub fn notice(&self) -> Option<String> {
        self.scoped.notice()
    }

    pub fn unmount(&self) {
        self.scoped.unmount(|s| s.reset = ResetStep::Request);
    }
}
