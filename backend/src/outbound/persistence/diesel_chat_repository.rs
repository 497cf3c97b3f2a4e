//! PostgreSQL-backed `ChatRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ChatRepository, ChatRepositoryError};
use crate::domain::{Conversation, ConversationId, Message, UserId};

use super::error_mapping::{self, is_unique_violation};
use super::models::{ConversationRow, MessageRow, NewConversationRow, NewMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::{conversations, messages};

/// Diesel-backed implementation of the chat repository port.
#[derive(Clone)]
pub struct DieselChatRepository {
    pool: DbPool,
}

impl DieselChatRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ChatRepositoryError {
    error_mapping::map_pool_error(error, ChatRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ChatRepositoryError {
    error_mapping::map_diesel_error(
        error,
        ChatRepositoryError::query,
        ChatRepositoryError::connection,
    )
}

fn row_to_conversation(row: ConversationRow) -> Conversation {
    Conversation::new(
        ConversationId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        UserId::from_uuid(row.mentor_id),
        row.created_at,
    )
}

fn row_to_message(row: MessageRow) -> Result<Message, ChatRepositoryError> {
    let status = row
        .status
        .parse()
        .map_err(|_| ChatRepositoryError::query(format!("unknown status: {}", row.status)))?;
    Ok(Message::from_stored(
        row.id,
        ConversationId::from_uuid(row.conversation_id),
        UserId::from_uuid(row.sender_id),
        row.content,
        row.attachments,
        status,
        row.seen_by.into_iter().map(UserId::from_uuid).collect(),
        row.created_at,
        row.updated_at,
    ))
}

async fn load_conversation_for_pair(
    conn: &mut diesel_async::pooled_connection::bb8::PooledConnection<
        '_,
        diesel_async::AsyncPgConnection,
    >,
    user_id: &UserId,
    mentor_id: &UserId,
) -> Result<Option<Conversation>, ChatRepositoryError> {
    let row = conversations::table
        .filter(conversations::user_id.eq(user_id.as_uuid()))
        .filter(conversations::mentor_id.eq(mentor_id.as_uuid()))
        .select(ConversationRow::as_select())
        .first::<ConversationRow>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    Ok(row.map(row_to_conversation))
}

#[async_trait]
impl ChatRepository for DieselChatRepository {
    async fn find_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Conversation>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conversations::table
            .filter(conversations::id.eq(conversation_id.as_uuid()))
            .select(ConversationRow::as_select())
            .first::<ConversationRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_conversation))
    }

    async fn find_or_open_conversation(
        &self,
        user_id: &UserId,
        mentor_id: &UserId,
    ) -> Result<Conversation, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        if let Some(existing) = load_conversation_for_pair(&mut conn, user_id, mentor_id).await? {
            return Ok(existing);
        }

        let conversation = Conversation::open(
            user_id.clone(),
            mentor_id.clone(),
            chrono::Utc::now(),
        );
        let new_row = NewConversationRow {
            id: *conversation.id().as_uuid(),
            user_id: *conversation.user_id().as_uuid(),
            mentor_id: *conversation.mentor_id().as_uuid(),
            created_at: conversation.created_at(),
        };

        let inserted = diesel::insert_into(conversations::table)
            .values(&new_row)
            .execute(&mut conn)
            .await;

        match inserted {
            Ok(_) => Ok(conversation),
            // A concurrent open for the same pair won the race; read theirs.
            Err(err) if is_unique_violation(&err) => {
                load_conversation_for_pair(&mut conn, user_id, mentor_id)
                    .await?
                    .ok_or_else(|| ChatRepositoryError::query("conversation vanished after race"))
            }
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn list_conversations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ConversationRow> = conversations::table
            .filter(
                conversations::user_id
                    .eq(user_id.as_uuid())
                    .or(conversations::mentor_id.eq(user_id.as_uuid())),
            )
            .order(conversations::created_at.desc())
            .select(ConversationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_conversation).collect())
    }

    async fn append_message(&self, message: &Message) -> Result<(), ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let seen_by: Vec<Uuid> = message
            .seen_by()
            .iter()
            .map(|viewer| *viewer.as_uuid())
            .collect();
        let new_row = NewMessageRow {
            id: message.id(),
            conversation_id: *message.conversation_id().as_uuid(),
            sender_id: *message.sender_id().as_uuid(),
            content: message.content(),
            attachments: message.attachments(),
            status: message.status().as_str(),
            seen_by: &seen_by,
            created_at: message.created_at(),
            updated_at: message.updated_at(),
        };

        diesel::insert_into(messages::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_message(
        &self,
        message_id: Uuid,
    ) -> Result<Option<Message>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = messages::table
            .filter(messages::id.eq(message_id))
            .select(MessageRow::as_select())
            .first::<MessageRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_message).transpose()
    }

    async fn update_message(&self, message: &Message) -> Result<(), ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let seen_by: Vec<Uuid> = message
            .seen_by()
            .iter()
            .map(|viewer| *viewer.as_uuid())
            .collect();
        diesel::update(messages::table.filter(messages::id.eq(message.id())))
            .set((
                messages::status.eq(message.status().as_str()),
                messages::seen_by.eq(&seen_by),
                messages::updated_at.eq(message.updated_at()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn mark_delivered(
        &self,
        conversation_id: ConversationId,
        recipient: &UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changed = diesel::update(
            messages::table
                .filter(messages::conversation_id.eq(conversation_id.as_uuid()))
                .filter(messages::sender_id.ne(recipient.as_uuid()))
                .filter(messages::status.eq("sent")),
        )
        .set((
            messages::status.eq("delivered"),
            messages::updated_at.eq(now),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(u64::try_from(changed).unwrap_or(u64::MAX))
    }

    async fn recent_messages(
        &self,
        conversation_id: ConversationId,
        limit: i64,
    ) -> Result<Vec<Message>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Newest rows first to honour the limit, then flipped so callers get
        // the window in chronological order.
        let rows: Vec<MessageRow> = messages::table
            .filter(messages::conversation_id.eq(conversation_id.as_uuid()))
            .order(messages::created_at.desc())
            .limit(limit)
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut history: Vec<Message> = rows
            .into_iter()
            .map(row_to_message)
            .collect::<Result<_, _>>()?;
        history.reverse();
        Ok(history)
    }
}
