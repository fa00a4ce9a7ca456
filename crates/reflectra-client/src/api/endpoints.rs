use std::fmt;

use reflectra_shared::types::{PostId, UserId};

/// Every REST resource the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Register,
    Login,
    PasswordResetRequest,
    PasswordResetConfirm,
    /// Profile of the signed-in user, without an id.
    UserInfo,
    /// The signed-in user's own record, with id.
    Me,
    UpdateUserInfo,
    DeleteAccount,
    FindUsers,
    Follow(UserId),
    Unfollow(UserId),
    Following,
    Followers(UserId),
    Posts,
    Post(PostId),
    Inbox,
    Conversation(String),
    SendMessage,
    MoodLogs,
}

impl Endpoint {
    /// Path segments below the origin. The trailing slash is part of every route.
    pub fn segments(&self) -> Vec<String> {
        let fixed = |parts: &[&str]| parts.iter().map(|p| p.to_string()).collect::<Vec<_>>();
        match self {
            Endpoint::Register => fixed(&["api", "register"]),
            Endpoint::Login => fixed(&["api", "login"]),
            Endpoint::PasswordResetRequest => fixed(&["api", "password-reset", "request"]),
            Endpoint::PasswordResetConfirm => fixed(&["api", "password-reset", "confirm"]),
            Endpoint::UserInfo => fixed(&["api", "userinfo"]),
            Endpoint::Me => fixed(&["api", "me"]),
            Endpoint::UpdateUserInfo => fixed(&["api", "update_user_info"]),
            Endpoint::DeleteAccount => fixed(&["api", "delete_account"]),
            Endpoint::FindUsers => fixed(&["api", "find_users"]),
            Endpoint::Follow(id) => vec!["api".into(), "follow".into(), id.to_string()],
            Endpoint::Unfollow(id) => vec!["api".into(), "unfollow".into(), id.to_string()],
            Endpoint::Following => fixed(&["api", "following"]),
            Endpoint::Followers(id) => vec!["api".into(), "followers".into(), id.to_string()],
            Endpoint::Posts => fixed(&["api", "posts"]),
            Endpoint::Post(id) => vec!["api".into(), "posts".into(), id.to_string()],
            Endpoint::Inbox => fixed(&["api", "inbox"]),
            Endpoint::Conversation(username) => {
                vec!["api".into(), "messages".into(), username.clone()]
            }
            Endpoint::SendMessage => fixed(&["api", "messages", "send"]),
            Endpoint::MoodLogs => fixed(&["api", "moodlogs"]),
        }
    }

    /// Human-readable path, used for logging and auth-failure reports.
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in self.segments() {
            path.push('/');
            path.push_str(&segment);
        }
        path.push('/');
        path
    }

    /// Endpoints whose 401 means "wrong credentials typed", not "session expired".
    pub fn is_credential_check(&self) -> bool {
        matches!(self, Endpoint::Login | Endpoint::Register)
    }

    /// Endpoints that require a bearer credential.
    pub fn is_protected(&self) -> bool {
        !matches!(
            self,
            Endpoint::Login
                | Endpoint::Register
                | Endpoint::PasswordResetRequest
                | Endpoint::PasswordResetConfirm
        )
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
