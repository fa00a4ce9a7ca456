//! The operations screens need from the social backend.
//!
//! Screens and the relationship cache are generic over [`SocialBackend`] so
//! that tests can substitute an in-process fake for the REST transport.

use reflectra_shared::protocol::{
    FollowingResponse, NewMessage, NewMoodLog, NewPost, ProfileUpdate,
};
use reflectra_shared::types::{
    FollowerRef, Message, MoodLog, Post, PostId, Profile, User, UserId,
};
use reflectra_shared::Result;
use reqwest::Method;
use tracing::{info, warn};

use crate::api::{encode, ApiClient, Endpoint};

#[allow(async_fn_in_trait)]
pub trait SocialBackend {
    /// Signed-in user's own record, with id.
    async fn current_user(&self) -> Result<User>;

    /// Editable profile fields of the signed-in user.
    async fn profile(&self) -> Result<Profile>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<()>;

    async fn delete_account(&self) -> Result<()>;

    /// Users matching `query`; an empty query lists everyone.
    async fn search_users(&self, query: &str) -> Result<Vec<User>>;

    /// Users the signed-in user follows.
    async fn following(&self) -> Result<Vec<User>>;

    async fn followers(&self, user: UserId) -> Result<Vec<FollowerRef>>;

    async fn follow(&self, target: UserId) -> Result<()>;

    async fn unfollow(&self, target: UserId) -> Result<()>;

    async fn posts(&self) -> Result<Vec<Post>>;

    async fn create_post(&self, post: &NewPost) -> Result<Post>;

    async fn delete_post(&self, post: PostId) -> Result<()>;

    /// Latest message of every conversation the user takes part in.
    async fn inbox(&self) -> Result<Vec<Message>>;

    async fn conversation(&self, partner: &str) -> Result<Vec<Message>>;

    async fn send_message(&self, message: &NewMessage) -> Result<Message>;

    async fn mood_logs(&self) -> Result<Vec<MoodLog>>;

    async fn create_mood_log(&self, log: &NewMoodLog) -> Result<MoodLog>;
}

impl SocialBackend for ApiClient {
    async fn current_user(&self) -> Result<User> {
        self.get_json(Endpoint::Me).await
    }

    async fn profile(&self) -> Result<Profile> {
        self.get_json(Endpoint::UserInfo).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        self.send_unit(Method::PUT, Endpoint::UpdateUserInfo, Some(encode(update)?))
            .await?;
        info!(name = %update.name, "profile updated");
        if let Err(e) = self.session().set_display_name(&update.name) {
            warn!(error = %e, "failed to persist new display name");
        }
        Ok(())
    }

    async fn delete_account(&self) -> Result<()> {
        self.send_unit(Method::DELETE, Endpoint::DeleteAccount, None)
            .await?;
        info!("account deleted");
        // Already deleted server-side.
        if let Err(e) = self.session().sign_out() {
            warn!(error = %e, "failed to clear credential after account deletion");
        }
        Ok(())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        self.get_json_query(Endpoint::FindUsers, &[("q", query)])
            .await
    }

    async fn following(&self) -> Result<Vec<User>> {
        let body: FollowingResponse = self.get_json(Endpoint::Following).await?;
        Ok(body.following)
    }

    async fn followers(&self, user: UserId) -> Result<Vec<FollowerRef>> {
        self.get_json(Endpoint::Followers(user)).await
    }

    async fn follow(&self, target: UserId) -> Result<()> {
        self.send_unit(Method::POST, Endpoint::Follow(target), None)
            .await
    }

    async fn unfollow(&self, target: UserId) -> Result<()> {
        self.send_unit(Method::POST, Endpoint::Unfollow(target), None)
            .await
    }

    async fn posts(&self) -> Result<Vec<Post>> {
        self.get_json(Endpoint::Posts).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        self.send_json(Method::POST, Endpoint::Posts, post).await
    }

    async fn delete_post(&self, post: PostId) -> Result<()> {
        self.send_unit(Method::DELETE, Endpoint::Post(post), None)
            .await
    }

    async fn inbox(&self) -> Result<Vec<Message>> {
        self.get_json(Endpoint::Inbox).await
    }

    async fn conversation(&self, partner: &str) -> Result<Vec<Message>> {
        self.get_json(Endpoint::Conversation(partner.to_string()))
            .await
    }

    async fn send_message(&self, message: &NewMessage) -> Result<Message> {
        self.send_json(Method::POST, Endpoint::SendMessage, message)
            .await
    }

    async fn mood_logs(&self) -> Result<Vec<MoodLog>> {
        self.get_json(Endpoint::MoodLogs).await
    }

    async fn create_mood_log(&self, log: &NewMoodLog) -> Result<MoodLog> {
        self.send_json(Method::POST, Endpoint::MoodLogs, log).await
    }
}
