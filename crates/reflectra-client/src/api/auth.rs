//! Credential flows. These endpoints carry no bearer token.

use reflectra_shared::protocol::{
    LoginRequest, LoginResponse, PasswordResetConfirm, PasswordResetRequest, RegisterRequest,
};
use reflectra_shared::Result;
use reqwest::Method;
use tracing::info;

use super::{encode, ApiClient, Endpoint};

impl ApiClient {
    /// Exchange a username (or email) and password for a token pair and
    /// persist it.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let response: LoginResponse = self
            .send_json(Method::POST, Endpoint::Login, request)
            .await?;
        self.session().sign_in(&response)?;
        Ok(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        self.send_unit(Method::POST, Endpoint::Register, Some(encode(request)?))
            .await?;
        info!(username = %request.username, "account registered");
        Ok(())
    }

    /// Ask the backend to email a verification code.
    pub async fn request_password_reset(&self, request: &PasswordResetRequest) -> Result<()> {
        self.send_unit(
            Method::POST,
            Endpoint::PasswordResetRequest,
            Some(encode(request)?),
        )
        .await
    }

    pub async fn confirm_password_reset(&self, request: &PasswordResetConfirm) -> Result<()> {
        self.send_unit(
            Method::POST,
            Endpoint::PasswordResetConfirm,
            Some(encode(request)?),
        )
        .await?;
        info!("password reset confirmed");
        Ok(())
    }

    /// Drop the stored session. No backend call is made.
    pub fn logout(&self) -> Result<()> {
        self.session().sign_out()
    }
}
