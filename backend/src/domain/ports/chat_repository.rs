//! Port for conversation and message persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Conversation, ConversationId, Message, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by chat repository adapters.
    pub enum ChatRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "chat repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "chat repository query failed: {message}",
    }
}

/// Port for conversation and message storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Find a conversation by id.
    async fn find_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Conversation>, ChatRepositoryError>;

    /// Return the existing conversation for the pair, or persist a new one.
    async fn find_or_open_conversation(
        &self,
        user_id: &UserId,
        mentor_id: &UserId,
    ) -> Result<Conversation, ChatRepositoryError>;

    /// List conversations where the user is either party.
    async fn list_conversations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, ChatRepositoryError>;

    /// Persist a message.
    async fn append_message(&self, message: &Message) -> Result<(), ChatRepositoryError>;

    /// Find a message by id.
    async fn find_message(&self, message_id: Uuid)
    -> Result<Option<Message>, ChatRepositoryError>;

    /// Persist the mutable part of a message: status, seen set, and the
    /// updated timestamp.
    async fn update_message(&self, message: &Message) -> Result<(), ChatRepositoryError>;

    /// Mark every sent message addressed to `recipient` in the conversation
    /// as delivered, returning the number of rows changed.
    async fn mark_delivered(
        &self,
        conversation_id: ConversationId,
        recipient: &UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, ChatRepositoryError>;

    /// Read the last `limit` messages of a conversation in chronological
    /// order (oldest of the window first).
    async fn recent_messages(
        &self,
        conversation_id: ConversationId,
        limit: i64,
    ) -> Result<Vec<Message>, ChatRepositoryError>;
}

/// Fixture implementation for tests that do not exercise chat persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureChatRepository;

#[async_trait]
impl ChatRepository for FixtureChatRepository {
    async fn find_conversation(
        &self,
        _conversation_id: ConversationId,
    ) -> Result<Option<Conversation>, ChatRepositoryError> {
        Ok(None)
    }

    async fn find_or_open_conversation(
        &self,
        user_id: &UserId,
        mentor_id: &UserId,
    ) -> Result<Conversation, ChatRepositoryError> {
        Ok(Conversation::open(
            user_id.clone(),
            mentor_id.clone(),
            chrono::Utc::now(),
        ))
    }

    async fn list_conversations_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Conversation>, ChatRepositoryError> {
        Ok(Vec::new())
    }

    async fn append_message(&self, _message: &Message) -> Result<(), ChatRepositoryError> {
        Ok(())
    }

    async fn find_message(
        &self,
        _message_id: Uuid,
    ) -> Result<Option<Message>, ChatRepositoryError> {
        Ok(None)
    }

    async fn update_message(&self, _message: &Message) -> Result<(), ChatRepositoryError> {
        Ok(())
    }

    async fn mark_delivered(
        &self,
        _conversation_id: ConversationId,
        _recipient: &UserId,
        _now: DateTime<Utc>,
    ) -> Result<u64, ChatRepositoryError> {
        Ok(0)
    }

    async fn recent_messages(
        &self,
        _conversation_id: ConversationId,
        _limit: i64,
    ) -> Result<Vec<Message>, ChatRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_opens_a_fresh_conversation() {
        let user = UserId::random();
        let mentor = UserId::random();
        let conversation = FixtureChatRepository
            .find_or_open_conversation(&user, &mentor)
            .await
            .expect("fixture open succeeds");
        assert!(conversation.includes(&user));
        assert!(conversation.includes(&mentor));
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_history_is_empty() {
        let history = FixtureChatRepository
            .recent_messages(ConversationId::random(), 50)
            .await
            .expect("fixture read succeeds");
        assert!(history.is_empty());
    }

    #[rstest]
    fn connection_error_formats_message() {
        let err = ChatRepositoryError::connection("refused");
        assert!(err.to_string().contains("refused"));
    }
}
