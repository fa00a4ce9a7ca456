use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// Backend-assigned numeric identifiers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MessageId(pub u64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MoodLogId(pub u64);

/// Mood preference tag a user can pin to their profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MoodTag {
    Happy,
    Sad,
    Angry,
    Tired,
    Confused,
    Chill,
    Anxious,
    Stressed,
    Motivated,
    Grateful,
    Bored,
    Excited,
    Lonely,
    Calm,
    Overwhelmed,
    Content,
    Focused,
    Neutral,
}

impl MoodTag {
    pub const ALL: [MoodTag; 18] = [
        MoodTag::Happy,
        MoodTag::Sad,
        MoodTag::Angry,
        MoodTag::Tired,
        MoodTag::Confused,
        MoodTag::Chill,
        MoodTag::Anxious,
        MoodTag::Stressed,
        MoodTag::Motivated,
        MoodTag::Grateful,
        MoodTag::Bored,
        MoodTag::Excited,
        MoodTag::Lonely,
        MoodTag::Calm,
        MoodTag::Overwhelmed,
        MoodTag::Content,
        MoodTag::Focused,
        MoodTag::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodTag::Happy => "happy",
            MoodTag::Sad => "sad",
            MoodTag::Angry => "angry",
            MoodTag::Tired => "tired",
            MoodTag::Confused => "confused",
            MoodTag::Chill => "chill",
            MoodTag::Anxious => "anxious",
            MoodTag::Stressed => "stressed",
            MoodTag::Motivated => "motivated",
            MoodTag::Grateful => "grateful",
            MoodTag::Bored => "bored",
            MoodTag::Excited => "excited",
            MoodTag::Lonely => "lonely",
            MoodTag::Calm => "calm",
            MoodTag::Overwhelmed => "overwhelmed",
            MoodTag::Content => "content",
            MoodTag::Focused => "focused",
            MoodTag::Neutral => "neutral",
        }
    }
}

impl fmt::Display for MoodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        MoodTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == needle)
            .ok_or_else(|| format!("unknown mood tag: {s}"))
    }
}

/// Sleep quality reported with a check-in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SleepQuality {
    Great,
    Okay,
    Poor,
}

impl SleepQuality {
    /// Higher is worse. Used to pick the worst night of a calendar day.
    pub fn severity(&self) -> u8 {
        match self {
            SleepQuality::Great => 0,
            SleepQuality::Okay => 1,
            SleepQuality::Poor => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SleepQuality::Great => "great",
            SleepQuality::Okay => "okay",
            SleepQuality::Poor => "poor",
        }
    }
}

impl FromStr for SleepQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "great" => Ok(SleepQuality::Great),
            "okay" => Ok(SleepQuality::Okay),
            "poor" => Ok(SleepQuality::Poor),
            other => Err(format!("unknown sleep quality: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user record as returned by search, `/api/me/` and the followee list.
///
/// The backend omits or nulls optional profile fields depending on the
/// endpoint, so every field except the id and username tolerates absence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bio: String,
    #[serde(default, deserialize_with = "lenient_mood")]
    pub mood_preference: Option<MoodTag>,
}

/// The signed-in user's own profile (`/api/userinfo/`). Carries no id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bio: String,
    #[serde(default, deserialize_with = "lenient_mood")]
    pub mood_preference: Option<MoodTag>,
}

/// A user record paired with the viewer's follow state.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AnnotatedUser {
    #[serde(flatten)]
    pub user: User,
    pub is_following: bool,
}

/// Entry of the followers list of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FollowerRef {
    pub id: UserId,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A short-form feed post. Immutable except for deletion by its author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    /// Author display name, denormalized by the backend at fetch time.
    pub username: String,
    pub content_text: String,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A direct message. Participants are identified by username, which is also
/// how conversations are addressed on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "MessageWire")]
pub struct Message {
    pub id: MessageId,
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

impl Message {
    /// The participant that is not `me`.
    pub fn partner_of<'a>(&'a self, me: &str) -> &'a str {
        if self.sender == me {
            &self.receiver
        } else {
            &self.sender
        }
    }

    pub fn involves(&self, username: &str) -> bool {
        self.sender == username || self.receiver == username
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Participant {
    Name(String),
    Id(u64),
}

/// Raw message shape. The backend sends the participants either as
/// usernames in `sender`/`receiver` or as ids alongside
/// `sender_username`/`receiver_username`.
#[derive(Deserialize)]
struct MessageWire {
    id: MessageId,
    #[serde(default)]
    sender: Option<Participant>,
    #[serde(default)]
    receiver: Option<Participant>,
    #[serde(default)]
    sender_username: Option<String>,
    #[serde(default)]
    receiver_username: Option<String>,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    is_read: bool,
}

fn participant_name(
    username: Option<String>,
    raw: Option<Participant>,
    field: &str,
) -> Result<String, String> {
    match (username, raw) {
        (Some(name), _) => Ok(name),
        (None, Some(Participant::Name(name))) => Ok(name),
        (None, Some(Participant::Id(id))) => Err(format!("{field} {id} has no username")),
        (None, None) => Err(format!("message is missing {field}")),
    }
}

impl TryFrom<MessageWire> for Message {
    type Error = String;

    fn try_from(wire: MessageWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: wire.id,
            sender: participant_name(wire.sender_username, wire.sender, "sender")?,
            receiver: participant_name(wire.receiver_username, wire.receiver, "receiver")?,
            content: wire.content,
            timestamp: wire.timestamp,
            is_read: wire.is_read,
        })
    }
}

// ---------------------------------------------------------------------------
// Mood log
// ---------------------------------------------------------------------------

/// One wellness check-in. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodLog {
    pub id: MoodLogId,
    pub timestamp: DateTime<Utc>,
    pub mood: u8,
    pub stress: u8,
    pub sleep: SleepQuality,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

// Unknown or blank tags decode as "no preference" rather than failing the record.
fn lenient_mood<'de, D>(deserializer: D) -> Result<Option<MoodTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// Serialize an optional mood as the backend expects it: blank when unset.
pub(crate) fn mood_or_empty<S>(mood: &Option<MoodTag>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(mood.map(|m| m.as_str()).unwrap_or(""))
}
