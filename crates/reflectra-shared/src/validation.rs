//! Form checks performed before a request is built.
//!
//! Every function here is pure; a failing check means the corresponding
//! network call must not be issued.

use crate::constants::{MAX_SCORE, MIN_SCORE};
use crate::error::ValidationError;
use crate::protocol::{
    LoginRequest, NewMoodLog, PasswordResetConfirm, PasswordResetRequest, ProfileUpdate,
    RegisterRequest,
};
use crate::types::SleepQuality;

/// Sign-up form as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Second step of the password reset flow.
#[derive(Debug, Clone, Default)]
pub struct ResetConfirmForm {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
}

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

fn score(value: i64, field: &'static str) -> Result<u8, ValidationError> {
    if value < MIN_SCORE as i64 || value > MAX_SCORE as i64 {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: MIN_SCORE,
            max: MAX_SCORE,
        });
    }
    Ok(value as u8)
}

pub fn login(username: &str, password: &str) -> Result<LoginRequest, ValidationError> {
    required(username, "Username or email")?;
    required(password, "Password")?;
    Ok(LoginRequest {
        username: username.trim().to_string(),
        password: password.to_string(),
    })
}

pub fn registration(form: &RegistrationForm) -> Result<RegisterRequest, ValidationError> {
    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    required(&form.username, "Username")?;
    required(&form.email, "Email")?;
    required(&form.password, "Password")?;
    Ok(RegisterRequest {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password.clone(),
    })
}

pub fn reset_request(email: &str) -> Result<PasswordResetRequest, ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    Ok(PasswordResetRequest {
        email: email.trim().to_string(),
    })
}

pub fn reset_confirm(form: &ResetConfirmForm) -> Result<PasswordResetConfirm, ValidationError> {
    if form.code.trim().is_empty() {
        return Err(ValidationError::MissingResetCode);
    }
    if form.new_password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if form.email.trim().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    required(&form.new_password, "New password")?;
    Ok(PasswordResetConfirm {
        email: form.email.trim().to_string(),
        code: form.code.trim().to_string(),
        new_password: form.new_password.clone(),
    })
}

pub fn profile_update(update: &ProfileUpdate) -> Result<(), ValidationError> {
    required(&update.name, "Name")?;
    required(&update.email, "Email")?;
    Ok(())
}

/// Returns the trimmed body to publish.
pub fn post_body(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPost);
    }
    Ok(trimmed.to_string())
}

pub fn message_body(text: &str) -> Result<String, ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    Ok(text.to_string())
}

/// Builds a check-in body from raw inputs. Scores arrive as `i64` so that
/// out-of-range input typed by a user is reported rather than truncated.
pub fn check_in(
    mood: i64,
    stress: i64,
    sleep: SleepQuality,
    notes: Option<&str>,
) -> Result<NewMoodLog, ValidationError> {
    Ok(NewMoodLog {
        mood: score(mood, "Mood")?,
        stress: score(stress, "Stress")?,
        sleep,
        notes: notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from),
    })
}
