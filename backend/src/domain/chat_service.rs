//! Chat use-case service implementing the driving chat port.
//!
//! Persist-then-broadcast: `send_message` stores the message before handing
//! the payload back for fan-out, so every frame a peer receives carries the
//! stored identifier.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::chat::HISTORY_LIMIT;
use crate::domain::ports::{
    ChatCommand, ChatRepository, ChatRepositoryError, JoinRoomResponse, MarkSeenRequest,
    MessagePayload, SendMessageRequest,
};
use crate::domain::{Conversation, ConversationId, Error, Message, UserId};

/// Chat use-case service over the chat repository port.
pub struct ChatService {
    chats: Arc<dyn ChatRepository>,
}

impl ChatService {
    /// Build the service from its driven port.
    pub fn new(chats: Arc<dyn ChatRepository>) -> Self {
        Self { chats }
    }

    async fn load_for_member(
        &self,
        actor: &UserId,
        room_id: ConversationId,
    ) -> Result<Conversation, Error> {
        let conversation = self
            .chats
            .find_conversation(room_id)
            .await
            .map_err(map_chat_repository_error)?
            .ok_or_else(|| Error::not_found(format!("no room with id {room_id}")))?;
        if !conversation.includes(actor) {
            return Err(Error::forbidden("not a member of this room"));
        }
        Ok(conversation)
    }
}

fn map_chat_repository_error(error: ChatRepositoryError) -> Error {
    match error {
        ChatRepositoryError::Connection { .. } => {
            Error::service_unavailable("chat storage is unavailable")
        }
        ChatRepositoryError::Query { message } => {
            Error::internal(format!("chat query failed: {message}"))
        }
    }
}

#[async_trait]
impl ChatCommand for ChatService {
    async fn join_room(
        &self,
        actor: &UserId,
        room_id: ConversationId,
    ) -> Result<JoinRoomResponse, Error> {
        let conversation = self.load_for_member(actor, room_id).await?;
        // Joining counts as delivery for everything the peer sent while the
        // actor was away; the replayed history then carries the new statuses.
        self.chats
            .mark_delivered(conversation.id(), actor, Utc::now())
            .await
            .map_err(map_chat_repository_error)?;
        let history = self
            .chats
            .recent_messages(conversation.id(), HISTORY_LIMIT)
            .await
            .map_err(map_chat_repository_error)?;
        Ok(JoinRoomResponse {
            room_id: conversation.id(),
            history: history.into_iter().map(Into::into).collect(),
        })
    }

    async fn send_message(
        &self,
        actor: &UserId,
        request: SendMessageRequest,
    ) -> Result<MessagePayload, Error> {
        let conversation = self.load_for_member(actor, request.room_id).await?;
        let message = Message::compose(
            conversation.id(),
            actor.clone(),
            request.content,
            request.attachments,
            Utc::now(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.chats
            .append_message(&message)
            .await
            .map_err(map_chat_repository_error)?;
        Ok(message.into())
    }

    async fn mark_seen(
        &self,
        actor: &UserId,
        request: MarkSeenRequest,
    ) -> Result<MessagePayload, Error> {
        let conversation = self.load_for_member(actor, request.room_id).await?;
        let mut message = self
            .chats
            .find_message(request.message_id)
            .await
            .map_err(map_chat_repository_error)?
            .filter(|message| message.conversation_id() == conversation.id())
            .ok_or_else(|| {
                Error::not_found(format!("no message with id {}", request.message_id))
            })?;

        message.mark_seen(actor.clone(), Utc::now());
        self.chats
            .update_message(&message)
            .await
            .map_err(map_chat_repository_error)?;
        Ok(message.into())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;
    use crate::domain::{ErrorCode, MessageStatus};

    #[derive(Default)]
    struct InMemoryChats {
        conversations: Mutex<HashMap<ConversationId, Conversation>>,
        messages: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl ChatRepository for InMemoryChats {
        async fn find_conversation(
            &self,
            conversation_id: ConversationId,
        ) -> Result<Option<Conversation>, ChatRepositoryError> {
            Ok(self
                .conversations
                .lock()
                .expect("conversations lock")
                .get(&conversation_id)
                .cloned())
        }

        async fn find_or_open_conversation(
            &self,
            user_id: &UserId,
            mentor_id: &UserId,
        ) -> Result<Conversation, ChatRepositoryError> {
            let mut conversations = self.conversations.lock().expect("conversations lock");
            if let Some(existing) = conversations
                .values()
                .find(|c| c.includes(user_id) && c.includes(mentor_id))
            {
                return Ok(existing.clone());
            }
            let conversation =
                Conversation::open(user_id.clone(), mentor_id.clone(), Utc::now());
            conversations.insert(conversation.id(), conversation.clone());
            Ok(conversation)
        }

        async fn list_conversations_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Vec<Conversation>, ChatRepositoryError> {
            Ok(self
                .conversations
                .lock()
                .expect("conversations lock")
                .values()
                .filter(|c| c.includes(user_id))
                .cloned()
                .collect())
        }

        async fn append_message(&self, message: &Message) -> Result<(), ChatRepositoryError> {
            self.messages
                .lock()
                .expect("messages lock")
                .push(message.clone());
            Ok(())
        }

        async fn find_message(
            &self,
            message_id: Uuid,
        ) -> Result<Option<Message>, ChatRepositoryError> {
            Ok(self
                .messages
                .lock()
                .expect("messages lock")
                .iter()
                .find(|m| m.id() == message_id)
                .cloned())
        }

        async fn update_message(&self, message: &Message) -> Result<(), ChatRepositoryError> {
            let mut messages = self.messages.lock().expect("messages lock");
            if let Some(stored) = messages.iter_mut().find(|m| m.id() == message.id()) {
                *stored = message.clone();
            }
            Ok(())
        }

        async fn mark_delivered(
            &self,
            conversation_id: ConversationId,
            recipient: &UserId,
            now: chrono::DateTime<Utc>,
        ) -> Result<u64, ChatRepositoryError> {
            let mut messages = self.messages.lock().expect("messages lock");
            let mut changed = 0;
            for message in messages.iter_mut().filter(|m| {
                m.conversation_id() == conversation_id
                    && m.sender_id() != recipient
                    && m.status() == MessageStatus::Sent
            }) {
                message.mark_delivered(now);
                changed += 1;
            }
            Ok(changed)
        }

        async fn recent_messages(
            &self,
            conversation_id: ConversationId,
            limit: i64,
        ) -> Result<Vec<Message>, ChatRepositoryError> {
            let messages = self.messages.lock().expect("messages lock");
            let mut window: Vec<Message> = messages
                .iter()
                .filter(|m| m.conversation_id() == conversation_id)
                .cloned()
                .collect();
            window.sort_by_key(Message::created_at);
            let keep = usize::try_from(limit).unwrap_or(usize::MAX);
            let skip = window.len().saturating_sub(keep);
            Ok(window.split_off(skip))
        }
    }

    struct Harness {
        service: ChatService,
        chats: Arc<InMemoryChats>,
        room: ConversationId,
        user: UserId,
        mentor: UserId,
    }

    #[fixture]
    fn harness() -> Harness {
        let chats = Arc::new(InMemoryChats::default());
        let user = UserId::random();
        let mentor = UserId::random();
        let conversation = Conversation::open(user.clone(), mentor.clone(), Utc::now());
        let room = conversation.id();
        chats
            .conversations
            .lock()
            .expect("conversations lock")
            .insert(room, conversation);
        Harness {
            service: ChatService::new(Arc::clone(&chats) as Arc<dyn ChatRepository>),
            chats,
            room,
            user,
            mentor,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn join_unknown_room_is_not_found(harness: Harness) {
        let err = harness
            .service
            .join_room(&harness.user, ConversationId::random())
            .await
            .expect_err("unknown room rejected");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn join_as_non_member_is_forbidden(harness: Harness) {
        let err = harness
            .service
            .join_room(&UserId::random(), harness.room)
            .await
            .expect_err("stranger rejected");
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn sent_messages_carry_stored_identity(harness: Harness) {
        let payload = harness
            .service
            .send_message(
                &harness.user,
                SendMessageRequest {
                    room_id: harness.room,
                    content: "hello mentor".to_owned(),
                    attachments: Vec::new(),
                },
            )
            .await
            .expect("message sent");

        assert!(!payload.id.is_nil());
        let stored = harness.chats.messages.lock().expect("messages lock");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id(), payload.id);
    }

    #[rstest]
    #[tokio::test]
    async fn join_replays_bounded_chronological_history(harness: Harness) {
        for index in 0..(HISTORY_LIMIT + 10) {
            harness
                .service
                .send_message(
                    &harness.user,
                    SendMessageRequest {
                        room_id: harness.room,
                        content: format!("message {index}"),
                        attachments: Vec::new(),
                    },
                )
                .await
                .expect("message sent");
        }

        let response = harness
            .service
            .join_room(&harness.mentor, harness.room)
            .await
            .expect("join succeeds");

        let expected =
            usize::try_from(HISTORY_LIMIT).expect("history limit fits usize");
        assert_eq!(response.history.len(), expected);
        // Oldest of the window first; the newest message closes the replay.
        let last = response.history.last().expect("history is non-empty");
        assert_eq!(last.content, format!("message {}", HISTORY_LIMIT + 9));
        let timestamps: Vec<_> = response
            .history
            .iter()
            .map(|message| message.created_at)
            .collect();
        let mut sorted = timestamps.clone();
        sorted.sort();
        assert_eq!(timestamps, sorted);
    }

    async fn send(harness: &Harness, sender: &UserId, content: &str) -> MessagePayload {
        harness
            .service
            .send_message(
                sender,
                SendMessageRequest {
                    room_id: harness.room,
                    content: content.to_owned(),
                    attachments: Vec::new(),
                },
            )
            .await
            .expect("message sent")
    }

    #[rstest]
    #[tokio::test]
    async fn joining_marks_the_peers_messages_delivered(harness: Harness) {
        send(&harness, &harness.user, "are you there?").await;
        send(&harness, &harness.user, "ping").await;

        let response = harness
            .service
            .join_room(&harness.mentor, harness.room)
            .await
            .expect("join succeeds");

        assert!(
            response
                .history
                .iter()
                .all(|message| message.status == MessageStatus::Delivered)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn rejoining_leaves_own_messages_as_sent(harness: Harness) {
        send(&harness, &harness.user, "hello").await;

        let response = harness
            .service
            .join_room(&harness.user, harness.room)
            .await
            .expect("join succeeds");

        assert_eq!(response.history[0].status, MessageStatus::Sent);
    }

    #[rstest]
    #[tokio::test]
    async fn mark_seen_records_the_viewer_and_persists(harness: Harness) {
        let sent = send(&harness, &harness.user, "see this").await;

        let payload = harness
            .service
            .mark_seen(
                &harness.mentor,
                MarkSeenRequest {
                    room_id: harness.room,
                    message_id: sent.id,
                },
            )
            .await
            .expect("mark seen succeeds");

        assert_eq!(payload.status, MessageStatus::Seen);
        assert_eq!(payload.seen_by, vec![harness.mentor.clone()]);
        let stored = harness.chats.messages.lock().expect("messages lock");
        assert_eq!(stored[0].status(), MessageStatus::Seen);
        assert_eq!(stored[0].seen_by(), &[harness.mentor.clone()]);
    }

    #[rstest]
    #[tokio::test]
    async fn mark_seen_unknown_message_is_not_found(harness: Harness) {
        let err = harness
            .service
            .mark_seen(
                &harness.mentor,
                MarkSeenRequest {
                    room_id: harness.room,
                    message_id: Uuid::new_v4(),
                },
            )
            .await
            .expect_err("unknown message rejected");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn mark_seen_rejects_messages_from_other_rooms(harness: Harness) {
        let other_mentor = UserId::random();
        let other = harness
            .chats
            .find_or_open_conversation(&harness.user, &other_mentor)
            .await
            .expect("conversation opens");
        let stray = harness
            .service
            .send_message(
                &harness.user,
                SendMessageRequest {
                    room_id: other.id(),
                    content: "different room".to_owned(),
                    attachments: Vec::new(),
                },
            )
            .await
            .expect("message sent");

        let err = harness
            .service
            .mark_seen(
                &harness.mentor,
                MarkSeenRequest {
                    room_id: harness.room,
                    message_id: stray.id,
                },
            )
            .await
            .expect_err("cross-room view rejected");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn empty_messages_are_rejected_before_persistence(harness: Harness) {
        let err = harness
            .service
            .send_message(
                &harness.user,
                SendMessageRequest {
                    room_id: harness.room,
                    content: "  ".to_owned(),
                    attachments: Vec::new(),
                },
            )
            .await
            .expect_err("empty body rejected");
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert!(harness.chats.messages.lock().expect("messages lock").is_empty());
    }
}
