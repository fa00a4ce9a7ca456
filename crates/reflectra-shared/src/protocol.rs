//! JSON bodies exchanged with the REST backend.

use serde::{Deserialize, Serialize};

use crate::types::{MoodTag, SleepQuality, User};

/// Body of `POST /api/login/`. `username` may also hold an email address.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login: the token pair and the canonical username.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetConfirm {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Body of `PUT /api/update_user_info/`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub bio: String,
    #[serde(serialize_with = "crate::types::mood_or_empty")]
    pub mood: Option<MoodTag>,
}

/// `GET /api/following/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FollowingResponse {
    #[serde(default)]
    pub following: Vec<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub content_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub receiver: String,
    pub content: String,
}

/// Body of `POST /api/moodlogs/`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewMoodLog {
    pub mood: u8,
    pub stress: u8,
    pub sleep: SleepQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Error payload. DRF uses `detail` for auth failures, the app views use
/// `error`, and a few success-ish replies use `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn text(self) -> Option<String> {
        self.error
            .or(self.detail)
            .or(self.message)
            .filter(|s| !s.trim().is_empty())
    }
}
