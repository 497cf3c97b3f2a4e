//! Wire-level event definitions for the chat WebSocket.
//!
//! Every frame is a JSON envelope `{ "event": ..., "data": ... }`. Clients
//! send `joinRoom`, `sendMessage`, and `markSeen`; the server answers with
//! `history`, `receiveMessage`, `messageSeen`, `userJoined`, and `error`.

use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    JoinRoomResponse, MarkSeenRequest, MessagePayload, SendMessageRequest,
};
use crate::domain::{ConversationId, Error, ErrorCode, UserId};

/// Room join request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_id: ConversationId,
}

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinRoom(JoinRoomRequest),
    SendMessage(SendMessageRequest),
    MarkSeen(MarkSeenRequest),
}

/// Announcement that a member joined a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJoinedEvent {
    pub room_id: ConversationId,
    pub user_id: UserId,
}

/// Error envelope sent instead of closing the socket, so one bad request
/// does not tear down an otherwise healthy connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    pub code: ErrorCode,
    pub message: String,
}

impl From<Error> for ErrorEvent {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
        }
    }
}

/// Events the server emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    History(JoinRoomResponse),
    ReceiveMessage(MessagePayload),
    MessageSeen(MessagePayload),
    UserJoined(UserJoinedEvent),
    Error(ErrorEvent),
}
