use std::collections::HashMap;

use reflectra_shared::constants::SUGGESTED_CONTACTS_LIMIT;
use reflectra_shared::types::{Message, User};

/// One conversation summary: the partner and the latest message exchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxRow {
    pub partner: String,
    pub last: Message,
}

/// Group messages by the participant that is not `me`, keep the newest of
/// each group and order rows newest first. Equal timestamps fall back to
/// the larger message id.
pub fn inbox_rows(messages: &[Message], me: &str) -> Vec<InboxRow> {
    let mut latest: HashMap<&str, &Message> = HashMap::new();
    for message in messages.iter().filter(|m| m.involves(me)) {
        let partner = message.partner_of(me);
        let newer = latest
            .get(partner)
            .map_or(true, |seen| (message.timestamp, message.id) > (seen.timestamp, seen.id));
        if newer {
            latest.insert(partner, message);
        }
    }

    let mut rows: Vec<InboxRow> = latest
        .into_iter()
        .map(|(partner, last)| InboxRow {
            partner: partner.to_string(),
            last: last.clone(),
        })
        .collect();
    rows.sort_by(|a, b| (b.last.timestamp, b.last.id).cmp(&(a.last.timestamp, a.last.id)));
    rows
}

/// Oldest first, as a chat is read.
pub fn conversation_order(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by_key(|m| (m.timestamp, m.id));
    messages
}

/// Followees offered as shortcuts while the inbox is empty.
pub fn suggested_contacts(inbox: &[Message], following: &[User]) -> Vec<User> {
    if !inbox.is_empty() {
        return Vec::new();
    }
    following
        .iter()
        .take(SUGGESTED_CONTACTS_LIMIT)
        .cloned()
        .collect()
}
