//! In-process backend double shared by the unit tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use reflectra_shared::protocol::{NewMessage, NewMoodLog, NewPost, ProfileUpdate};
use reflectra_shared::types::{
    FollowerRef, Message, MessageId, MoodLog, MoodLogId, Post, PostId, Profile, SleepQuality,
    User, UserId,
};
use reflectra_shared::{ReflectraError, Result, ValidationError};
use reflectra_store::{MemoryStore, StoredSession};
use tokio::sync::Semaphore;

use crate::api::ApiClient;
use crate::backend::SocialBackend;
use crate::session::{Session, SessionConfig};

/// Serve `router` on an ephemeral loopback port and return its origin.
pub(crate) async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A transport against `origin`, optionally already signed in with `token`.
/// The counter tracks auth-failure hook invocations.
pub(crate) fn api_client(origin: &str, token: Option<&str>) -> (ApiClient, Arc<AtomicUsize>) {
    let store = match token {
        Some(token) => MemoryStore::signed_in(&StoredSession {
            access_token: token.to_string(),
            refresh_token: "refresh".to_string(),
            username: "alice".to_string(),
        }),
        None => MemoryStore::new(),
    };
    let expired = Arc::new(AtomicUsize::new(0));
    let hook = expired.clone();
    let config = SessionConfig::new(origin).with_auth_failure_hook(move |_| {
        hook.fetch_add(1, Ordering::SeqCst);
    });
    let session = Arc::new(Session::new(config, Arc::new(store)));
    (ApiClient::new(session, Duration::from_secs(5)).unwrap(), expired)
}

pub(crate) fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub(crate) fn user(id: u64, username: &str) -> User {
    User {
        id: UserId(id),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        bio: String::new(),
        mood_preference: None,
    }
}

pub(crate) fn post(id: u64, author: &User, text: &str, at: i64) -> Post {
    Post {
        id: PostId(id),
        user_id: author.id,
        username: author.username.clone(),
        content_text: text.to_string(),
        timestamp: ts(at),
    }
}

pub(crate) fn message(id: u64, from: &str, to: &str, text: &str, at: i64) -> Message {
    Message {
        id: MessageId(id),
        sender: from.to_string(),
        receiver: to.to_string(),
        content: text.to_string(),
        timestamp: ts(at),
        is_read: false,
    }
}

pub(crate) fn mood_log(id: u64, at: DateTime<Utc>, mood: u8, stress: u8, sleep: SleepQuality) -> MoodLog {
    MoodLog {
        id: MoodLogId(id),
        timestamp: at,
        mood,
        stress,
        sleep,
        notes: None,
    }
}

/// Server-side state as the fake sees it.
#[derive(Debug, Default)]
pub(crate) struct World {
    pub me: Option<User>,
    pub users: Vec<User>,
    pub following: BTreeSet<UserId>,
    pub followers: HashMap<UserId, Vec<FollowerRef>>,
    pub posts: Vec<Post>,
    pub messages: Vec<Message>,
    pub mood_logs: Vec<MoodLog>,
    pub profile: Profile,
    pub account_deleted: bool,
    next_id: u64,
}

impl World {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        1000 + self.next_id
    }

    fn me(&self) -> Result<&User> {
        self.me.as_ref().ok_or(ReflectraError::Unauthenticated)
    }
}

#[derive(Default)]
struct Inner {
    world: Mutex<World>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, ReflectraError>>,
    gates: Mutex<HashMap<&'static str, Arc<Semaphore>>>,
}

/// Backend double with failure injection, call gating and a call log.
///
/// A gated operation records its call, then blocks until [`FakeBackend::release`]
/// hands it a permit.
#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    inner: Arc<Inner>,
}

impl FakeBackend {
    pub fn signed_in_as(me: User, others: Vec<User>) -> Self {
        let fake = Self::default();
        fake.with_world(|w| {
            w.profile = Profile {
                username: me.username.clone(),
                email: me.email.clone(),
                bio: me.bio.clone(),
                mood_preference: me.mood_preference,
            };
            w.users.push(me.clone());
            w.users.extend(others);
            w.me = Some(me);
        });
        fake
    }

    pub fn with_world<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.inner.world.lock())
    }

    pub fn fail(&self, op: &'static str, err: ReflectraError) {
        self.inner.failures.lock().insert(op, err);
    }

    pub fn clear_failure(&self, op: &'static str) {
        self.inner.failures.lock().remove(op);
    }

    pub fn gate(&self, op: &'static str) {
        self.inner
            .gates
            .lock()
            .insert(op, Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, op: &'static str, calls: usize) {
        if let Some(gate) = self.inner.gates.lock().get(op) {
            gate.add_permits(calls);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.inner
            .calls
            .lock()
            .iter()
            .filter(|c| c.split(':').next() == Some(op))
            .count()
    }

    async fn enter(&self, op: &'static str, arg: Option<String>) -> Result<()> {
        let entry = match arg {
            Some(arg) => format!("{op}:{arg}"),
            None => op.to_string(),
        };
        self.inner.calls.lock().push(entry);

        let gate = self.inner.gates.lock().get(op).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        match self.inner.failures.lock().get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl SocialBackend for FakeBackend {
    async fn current_user(&self) -> Result<User> {
        self.enter("me", None).await?;
        self.with_world(|w| w.me().cloned())
    }

    async fn profile(&self) -> Result<Profile> {
        self.enter("profile", None).await?;
        Ok(self.with_world(|w| w.profile.clone()))
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        self.enter("update_profile", None).await?;
        self.with_world(|w| {
            w.profile.username = update.name.clone();
            w.profile.email = update.email.clone();
            w.profile.bio = update.bio.clone();
            w.profile.mood_preference = update.mood;
        });
        Ok(())
    }

    async fn delete_account(&self) -> Result<()> {
        self.enter("delete_account", None).await?;
        self.with_world(|w| w.account_deleted = true);
        Ok(())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        self.enter("search", Some(query.to_string())).await?;
        let needle = query.to_lowercase();
        Ok(self.with_world(|w| {
            w.users
                .iter()
                .filter(|u| u.username.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        }))
    }

    async fn following(&self) -> Result<Vec<User>> {
        self.enter("following", None).await?;
        Ok(self.with_world(|w| {
            w.users
                .iter()
                .filter(|u| w.following.contains(&u.id))
                .cloned()
                .collect()
        }))
    }

    async fn followers(&self, user: UserId) -> Result<Vec<FollowerRef>> {
        self.enter("followers", Some(user.to_string())).await?;
        Ok(self.with_world(|w| w.followers.get(&user).cloned().unwrap_or_default()))
    }

    async fn follow(&self, target: UserId) -> Result<()> {
        self.enter("follow", Some(target.to_string())).await?;
        self.with_world(|w| {
            if w.me()?.id == target {
                return Err(ValidationError::Server("You cannot follow yourself".into()).into());
            }
            if !w.users.iter().any(|u| u.id == target) {
                return Err(ReflectraError::NotFound("User not found".into()));
            }
            // Already following is a 200, not an error.
            w.following.insert(target);
            Ok(())
        })
    }

    async fn unfollow(&self, target: UserId) -> Result<()> {
        self.enter("unfollow", Some(target.to_string())).await?;
        self.with_world(|w| {
            if !w.following.remove(&target) {
                return Err(ValidationError::Server("You are not following this user".into()).into());
            }
            Ok(())
        })
    }

    async fn posts(&self) -> Result<Vec<Post>> {
        self.enter("posts", None).await?;
        Ok(self.with_world(|w| w.posts.clone()))
    }

    async fn create_post(&self, new: &NewPost) -> Result<Post> {
        self.enter("create_post", None).await?;
        self.with_world(|w| {
            let me = w.me()?.clone();
            let id = w.next_id();
            let created = Post {
                id: PostId(id),
                user_id: me.id,
                username: me.username,
                content_text: new.content_text.clone(),
                timestamp: ts(id as i64),
            };
            w.posts.insert(0, created.clone());
            Ok(created)
        })
    }

    async fn delete_post(&self, id: PostId) -> Result<()> {
        self.enter("delete_post", Some(id.to_string())).await?;
        self.with_world(|w| {
            let me = w.me()?.id;
            let before = w.posts.len();
            w.posts.retain(|p| !(p.id == id && p.user_id == me));
            if w.posts.len() == before {
                return Err(ReflectraError::NotFound("Post not found".into()));
            }
            Ok(())
        })
    }

    async fn inbox(&self) -> Result<Vec<Message>> {
        self.enter("inbox", None).await?;
        self.with_world(|w| {
            let me = w.me()?.username.clone();
            let mut latest: HashMap<String, Message> = HashMap::new();
            for m in w.messages.iter().filter(|m| m.involves(&me)) {
                let partner = m.partner_of(&me).to_string();
                let newer = latest
                    .get(&partner)
                    .map_or(true, |seen| m.timestamp > seen.timestamp);
                if newer {
                    latest.insert(partner, m.clone());
                }
            }
            Ok(latest.into_values().collect())
        })
    }

    async fn conversation(&self, partner: &str) -> Result<Vec<Message>> {
        self.enter("conversation", Some(partner.to_string())).await?;
        self.with_world(|w| {
            let me = w.me()?.username.clone();
            Ok(w.messages
                .iter()
                .filter(|m| m.involves(&me) && m.involves(partner) && partner != me)
                .cloned()
                .collect())
        })
    }

    async fn send_message(&self, new: &NewMessage) -> Result<Message> {
        self.enter("send_message", Some(new.receiver.clone())).await?;
        self.with_world(|w| {
            let me = w.me()?.username.clone();
            let id = w.next_id();
            let sent = message(id, &me, &new.receiver, &new.content, id as i64);
            w.messages.push(sent.clone());
            Ok(sent)
        })
    }

    async fn mood_logs(&self) -> Result<Vec<MoodLog>> {
        self.enter("mood_logs", None).await?;
        Ok(self.with_world(|w| w.mood_logs.clone()))
    }

    async fn create_mood_log(&self, new: &NewMoodLog) -> Result<MoodLog> {
        self.enter("create_mood_log", None).await?;
        Ok(self.with_world(|w| {
            let id = w.next_id();
            let log = MoodLog {
                id: MoodLogId(id),
                timestamp: ts(id as i64),
                mood: new.mood,
                stress: new.stress,
                sleep: new.sleep,
                notes: new.notes.clone(),
            };
            w.mood_logs.push(log.clone());
            log
        }))
    }
}
