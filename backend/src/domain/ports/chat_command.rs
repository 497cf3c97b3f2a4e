//! Driving port for chat room use-cases.
//!
//! The WebSocket adapter calls this port on `joinRoom`, `sendMessage`, and
//! `markSeen` events. Persistence comes first: a message is stored and only
//! then fanned out, so every broadcast payload carries its stored identifier.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ConversationId, Error, Message, MessageStatus, UserId};

/// Serializable message payload for driving ports and socket frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: Uuid,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub status: MessageStatus,
    #[serde(default)]
    pub seen_by: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessagePayload {
    fn from(value: Message) -> Self {
        Self {
            id: value.id(),
            conversation_id: value.conversation_id(),
            sender_id: value.sender_id().clone(),
            content: value.content().to_owned(),
            attachments: value.attachments().to_vec(),
            status: value.status(),
            seen_by: value.seen_by().to_vec(),
            created_at: value.created_at(),
        }
    }
}

/// History replayed to a client joining a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub room_id: ConversationId,
    /// The last window of persisted messages, oldest first.
    pub history: Vec<MessagePayload>,
}

/// Request to send a message into a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub room_id: ConversationId,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Request to record that the actor has seen a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSeenRequest {
    pub room_id: ConversationId,
    pub message_id: Uuid,
}

/// Driving port for chat operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCommand: Send + Sync {
    /// Join a room, returning the bounded message history.
    ///
    /// Fails with a not-found error when the room does not exist and a
    /// forbidden error when the actor is not a member.
    async fn join_room(
        &self,
        actor: &UserId,
        room_id: ConversationId,
    ) -> Result<JoinRoomResponse, Error>;

    /// Persist a message and return the stored payload for broadcast.
    async fn send_message(
        &self,
        actor: &UserId,
        request: SendMessageRequest,
    ) -> Result<MessagePayload, Error>;

    /// Record the actor's view of a message and return the updated payload
    /// for broadcast.
    async fn mark_seen(
        &self,
        actor: &UserId,
        request: MarkSeenRequest,
    ) -> Result<MessagePayload, Error>;
}

/// Fixture chat command for tests that do not need persistence.
///
/// Rooms always exist and history is empty; sent messages are echoed with a
/// fresh identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureChatCommand;

#[async_trait]
impl ChatCommand for FixtureChatCommand {
    async fn join_room(
        &self,
        _actor: &UserId,
        room_id: ConversationId,
    ) -> Result<JoinRoomResponse, Error> {
        Ok(JoinRoomResponse {
            room_id,
            history: Vec::new(),
        })
    }

    async fn send_message(
        &self,
        actor: &UserId,
        request: SendMessageRequest,
    ) -> Result<MessagePayload, Error> {
        let message = Message::compose(
            request.room_id,
            actor.clone(),
            request.content,
            request.attachments,
            Utc::now(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(message.into())
    }

    async fn mark_seen(
        &self,
        _actor: &UserId,
        request: MarkSeenRequest,
    ) -> Result<MessagePayload, Error> {
        Err(Error::not_found(format!(
            "no message with id {}",
            request.message_id
        )))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[tokio::test]
    async fn fixture_join_returns_empty_history() {
        let room = ConversationId::random();
        let response = FixtureChatCommand
            .join_room(&UserId::random(), room)
            .await
            .expect("fixture join succeeds");
        assert_eq!(response.room_id, room);
        assert!(response.history.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_send_assigns_identity() {
        let actor = UserId::random();
        let payload = FixtureChatCommand
            .send_message(
                &actor,
                SendMessageRequest {
                    room_id: ConversationId::random(),
                    content: "hello".to_owned(),
                    attachments: Vec::new(),
                },
            )
            .await
            .expect("fixture send succeeds");
        assert!(!payload.id.is_nil());
        assert_eq!(payload.sender_id, actor);
        assert_eq!(payload.status, MessageStatus::Sent);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_mark_seen_knows_no_messages() {
        let err = FixtureChatCommand
            .mark_seen(
                &UserId::random(),
                MarkSeenRequest {
                    room_id: ConversationId::random(),
                    message_id: Uuid::new_v4(),
                },
            )
            .await
            .expect_err("fixture holds no messages");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_send_rejects_empty_body() {
        let err = FixtureChatCommand
            .send_message(
                &UserId::random(),
                SendMessageRequest {
                    room_id: ConversationId::random(),
                    content: "   ".to_owned(),
                    attachments: Vec::new(),
                },
            )
            .await
            .expect_err("empty body rejected");
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }
}
