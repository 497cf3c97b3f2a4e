//! Chat conversations and messages.
//!
//! Room membership is ephemeral socket-layer state; only conversations and
//! messages are persisted. A message is immutable once stored except for its
//! delivery [`MessageStatus`] and `seen_by` set.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Number of persisted messages replayed to a client on room join.
pub const HISTORY_LIMIT: i64 = 50;

/// Maximum accepted message body length in characters.
pub const MESSAGE_MAX_CHARS: usize = 4000;

/// Identifier of a persisted conversation, doubling as the room id clients
/// join over the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(Uuid);

impl ConversationId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = ChatValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ChatValidationError::InvalidRoomId)
    }
}

/// Delivery status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Seen,
}

impl MessageStatus {
    /// Stable string form stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Seen => "seen",
        }
    }
}

impl FromStr for MessageStatus {
    type Err = ChatValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "seen" => Ok(Self::Seen),
            _ => Err(ChatValidationError::UnknownStatus),
        }
    }
}

/// Validation errors for chat construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatValidationError {
    InvalidRoomId,
    EmptyBody,
    BodyTooLong { max: usize },
    UnknownStatus,
}

impl fmt::Display for ChatValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRoomId => write!(f, "room id must be a valid UUID"),
            Self::EmptyBody => write!(f, "message content must not be empty"),
            Self::BodyTooLong { max } => {
                write!(f, "message content must be at most {max} characters")
            }
            Self::UnknownStatus => write!(f, "status is not a known message status"),
        }
    }
}

impl std::error::Error for ChatValidationError {}

/// Persisted conversation between a user and a mentor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    id: ConversationId,
    user_id: UserId,
    mentor_id: UserId,
    created_at: DateTime<Utc>,
}

impl Conversation {
    /// Construct a conversation record.
    pub fn new(
        id: ConversationId,
        user_id: UserId,
        mentor_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            mentor_id,
            created_at,
        }
    }

    /// Open a fresh conversation.
    pub fn open(user_id: UserId, mentor_id: UserId, now: DateTime<Utc>) -> Self {
        Self::new(ConversationId::random(), user_id, mentor_id, now)
    }

    /// Conversation identifier.
    pub fn id(&self) -> ConversationId {
        self.id
    }

    /// Mentee side of the conversation.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Mentor side of the conversation.
    pub fn mentor_id(&self) -> &UserId {
        &self.mentor_id
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether a user belongs to this conversation.
    pub fn includes(&self, user: &UserId) -> bool {
        &self.user_id == user || &self.mentor_id == user
    }
}

/// Chat message within a conversation.
///
/// Identity is assigned at persistence time; broadcast payloads always carry
/// the stored id, never a client-generated one.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: Uuid,
    conversation_id: ConversationId,
    sender_id: UserId,
    content: String,
    attachments: Vec<String>,
    status: MessageStatus,
    seen_by: Vec<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Message {
    /// Validate and construct a new message ready for persistence.
    pub fn compose(
        conversation_id: ConversationId,
        sender_id: UserId,
        content: impl Into<String>,
        attachments: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, ChatValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ChatValidationError::EmptyBody);
        }
        if content.chars().count() > MESSAGE_MAX_CHARS {
            return Err(ChatValidationError::BodyTooLong {
                max: MESSAGE_MAX_CHARS,
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            content,
            attachments,
            status: MessageStatus::Sent,
            seen_by: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a stored message without re-validating the body.
    #[allow(clippy::too_many_arguments, reason = "flat row constructor")]
    pub fn from_stored(
        id: Uuid,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: String,
        attachments: Vec<String>,
        status: MessageStatus,
        seen_by: Vec<UserId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_id,
            content,
            attachments,
            status,
            seen_by,
            created_at,
            updated_at,
        }
    }

    /// Record that a user has seen this message.
    ///
    /// Idempotent; the sender's own view does not change the status.
    pub fn mark_seen(&mut self, viewer: UserId, now: DateTime<Utc>) {
        if viewer == self.sender_id {
            return;
        }
        if !self.seen_by.contains(&viewer) {
            self.seen_by.push(viewer);
        }
        self.status = MessageStatus::Seen;
        self.updated_at = now;
    }

    /// Mark the message as delivered to at least one peer.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) {
        // Seen outranks delivered.
        if self.status == MessageStatus::Sent {
            self.status = MessageStatus::Delivered;
            self.updated_at = now;
        }
    }

    /// Message identifier assigned at persistence time.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Conversation this message belongs to.
    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Author of the message.
    pub fn sender_id(&self) -> &UserId {
        &self.sender_id
    }

    /// Message body.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Attachment URLs.
    pub fn attachments(&self) -> &[String] {
        &self.attachments
    }

    /// Delivery status.
    pub fn status(&self) -> MessageStatus {
        self.status
    }

    /// Users who have seen the message.
    pub fn seen_by(&self) -> &[UserId] {
        &self.seen_by
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last status change timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
