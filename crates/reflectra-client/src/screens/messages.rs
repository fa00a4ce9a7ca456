use reflectra_shared::protocol::NewMessage;
use reflectra_shared::types::{Message, User};
use reflectra_shared::{validation, ReflectraError, Result, ValidationError};
use tokio::sync::watch;
use tracing::{debug, info};

use super::scope::{scoped_call, ScreenState, Scoped};
use crate::backend::SocialBackend;
use crate::projector::{self, InboxRow};

#[derive(Debug, Default)]
pub struct MessagesState {
    me: Option<String>,
    following: Vec<User>,
    /// Latest message per conversation, as returned by the backend.
    inbox: Vec<Message>,
    open: Option<String>,
    /// Bumped on every select or close; a history fetch only lands if it
    /// still matches.
    selection: u64,
    history: Vec<Message>,
    loading_history: bool,
    notice: Option<String>,
}

impl ScreenState for MessagesState {
    fn notice_mut(&mut self) -> &mut Option<String> {
        &mut self.notice
    }
}

/// Direct messages: inbox, one open conversation, and sending.
pub struct MessagesScreen<B> {
    backend: B,
    scoped: Scoped<MessagesState>,
}

impl<B: SocialBackend> MessagesScreen<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            scoped: Scoped::new(MessagesState::default()),
        }
    }

    pub async fn mount(&self) {
        tokio::join!(self.load_me(), self.load_following(), self.refresh_inbox());
    }

    async fn load_me(&self) {
        match self.scoped.run(self.backend.profile()).await {
            None => {}
            Some(Ok(profile)) => {
                self.scoped.apply(|s| s.me = Some(profile.username));
            }
            Some(Err(err)) => self.scoped.report("load current user", &err),
        }
    }

    async fn load_following(&self) {
        match self.scoped.run(self.backend.following()).await {
            None => {}
            Some(Ok(users)) => {
                self.scoped.apply(|s| s.following = users);
            }
            Some(Err(err)) => self.scoped.report("load following", &err),
        }
    }

    async fn refresh_inbox(&self) {
        match self.scoped.run(self.backend.inbox()).await {
            None => {}
            Some(Ok(inbox)) => {
                self.scoped.apply(|s| s.inbox = inbox);
            }
            Some(Err(err)) => self.scoped.report("load inbox", &err),
        }
    }

    /// Conversation summaries, newest first. Empty until the current
    /// username is known.
    pub fn inbox(&self) -> Vec<InboxRow> {
        self.scoped.read(|s| match &s.me {
            Some(me) => projector::inbox_rows(&s.inbox, me),
            None => Vec::new(),
        })
    }

    pub fn suggested_contacts(&self) -> Vec<User> {
        self.scoped
            .read(|s| projector::suggested_contacts(&s.inbox, &s.following))
    }

    /// Select a conversation and fetch its full history.
    ///
    /// The history is fetched on every selection. If another conversation
    /// is selected before the response arrives, the response is dropped.
    pub async fn open_conversation(&self, partner: &str) -> Result<Vec<Message>> {
        let partner = partner.trim().to_string();
        let selection = self
            .scoped
            .apply(|s| {
                s.selection += 1;
                s.open = Some(partner.clone());
                s.history.clear();
                s.loading_history = true;
                s.selection
            })
            .unwrap_or_default();

        let outcome = scoped_call(
            &self.scoped,
            "load conversation",
            self.backend.conversation(&partner),
        )
        .await
        .map(projector::conversation_order);

        self.scoped.apply(|s| {
            if s.selection != selection {
                debug!(%partner, "dropping history for a superseded selection");
                return;
            }
            s.loading_history = false;
            if let Ok(history) = &outcome {
                s.history = history.clone();
            }
        });
        outcome
    }

    pub fn close_conversation(&self) {
        self.scoped.apply(|s| {
            s.selection += 1;
            s.open = None;
            s.history.clear();
            s.loading_history = false;
        });
    }

    pub fn open_chat(&self) -> Option<String> {
        self.scoped.read(|s| s.open.clone())
    }

    pub fn history(&self) -> Vec<Message> {
        self.scoped.read(|s| s.history.clone())
    }

    pub fn is_loading_history(&self) -> bool {
        self.scoped.read(|s| s.loading_history)
    }

    /// Send `text` to the open conversation. The backend's record is
    /// appended, then the inbox is refetched.
    pub async fn send(&self, text: &str) -> Result<Message> {
        let partner = self.scoped.read(|s| s.open.clone());
        let checked = validation::message_body(text).and_then(|content| {
            partner
                .clone()
                .map(|receiver| NewMessage { receiver, content })
                .ok_or(ValidationError::NoConversation)
        });
        let new = match checked {
            Ok(new) => new,
            Err(e) => {
                let err = ReflectraError::from(e);
                self.scoped.report("send message", &err);
                return Err(err);
            }
        };

        let sent = scoped_call(&self.scoped, "send message", self.backend.send_message(&new)).await?;
        info!(to = %new.receiver, "message sent");
        self.scoped.apply(|s| {
            if s.open.as_deref() == Some(new.receiver.as_str()) {
                s.history.push(sent.clone());
            }
            s.notice = None;
        });
        self.refresh_inbox().await;
        Ok(sent)
    }

    pub fn notice(&self) -> Option<String> {
        self.scoped.notice()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.scoped.subscribe()
    }

    pub fn unmount(&self) {
        self.scoped.unmount(|s| {
            s.open = None;
            s.history.clear();
        });
    }
}
