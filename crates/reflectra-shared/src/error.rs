use thiserror::Error;

/// Failure of any client operation against the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReflectraError {
    /// No credential, or the backend rejected it on a protected call.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Login or registration refused the submitted credentials.
    #[error("Credentials rejected: {0}")]
    CredentialRejected(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other 4xx the backend answers with.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 5xx or an interrupted exchange.
    #[error("Transient failure: {0}")]
    Transient(String),

    /// The backend could not be reached at all.
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Local storage error: {0}")]
    Storage(String),

    /// The owning screen was closed before the call finished.
    #[error("Operation cancelled")]
    Cancelled,
}

impl ReflectraError {
    /// Inline text a screen renders for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ReflectraError::Unauthenticated => {
                "Your session has expired. Please log in again.".to_string()
            }
            ReflectraError::CredentialRejected(msg)
            | ReflectraError::NotFound(msg)
            | ReflectraError::Conflict(msg)
            | ReflectraError::Rejected { message: msg, .. } => msg.clone(),
            ReflectraError::ValidationFailed(err) => err.to_string(),
            ReflectraError::Transient(_)
            | ReflectraError::Unreachable(_)
            | ReflectraError::Decode(_) => "Server error. Please try again.".to_string(),
            ReflectraError::Storage(_) => "Could not access local storage.".to_string(),
            ReflectraError::Cancelled => String::new(),
        }
    }

    /// Whether retrying the same call later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReflectraError::Transient(_) | ReflectraError::Unreachable(_)
        )
    }
}

/// Client-side form checks, all evaluated before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required.")]
    Required(&'static str),

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Please enter your email.")]
    MissingEmail,

    #[error("Please enter the verification code.")]
    MissingResetCode,

    #[error("Post content cannot be empty.")]
    EmptyPost,

    #[error("Message cannot be empty.")]
    EmptyMessage,

    #[error("{field} must be between {min} and {max}, got {value}.")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: u8,
        max: u8,
    },

    #[error("You cannot follow yourself.")]
    SelfFollow,

    #[error("No conversation is open.")]
    NoConversation,

    /// Validation reported by the backend (HTTP 400).
    #[error("{0}")]
    Server(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ReflectraError>;
