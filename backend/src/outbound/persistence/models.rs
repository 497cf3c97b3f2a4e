//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    bookings, conversations, kanban_tasks, messages, notifications, users, wallet_transactions,
    wallets,
};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub mentor_expertise: Option<String>,
    pub mentor_hourly_rate_cents: Option<i64>,
    pub mentor_bio: Option<String>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub mentor_expertise: Option<&'a str>,
    pub mentor_hourly_rate_cents: Option<i64>,
    pub mentor_bio: Option<&'a str>,
}

/// Row struct for reading from the bookings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mentor_id: Uuid,
    pub booking_date: NaiveDate,
    pub slot: String,
    pub status: String,
    pub duration_minutes: i32,
    pub topic: Option<String>,
    pub reschedule_by: Option<String>,
    pub proposed_date: Option<NaiveDate>,
    pub proposed_slot: Option<String>,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new booking records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub(crate) struct NewBookingRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mentor_id: Uuid,
    pub booking_date: NaiveDate,
    pub slot: &'a str,
    pub status: &'a str,
    pub duration_minutes: i32,
    pub topic: Option<&'a str>,
    pub reschedule_by: Option<&'a str>,
    pub proposed_date: Option<NaiveDate>,
    pub proposed_slot: Option<&'a str>,
    pub meeting_link: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for replacing a booking's mutable state.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BookingUpdate<'a> {
    pub booking_date: NaiveDate,
    pub slot: &'a str,
    pub status: &'a str,
    pub reschedule_by: Option<&'a str>,
    pub proposed_date: Option<NaiveDate>,
    pub proposed_slot: Option<&'a str>,
    pub meeting_link: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the conversations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConversationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mentor_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for opening conversations.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = conversations)]
pub(crate) struct NewConversationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mentor_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the messages table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub attachments: Vec<String>,
    pub status: String,
    pub seen_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for appending messages.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub(crate) struct NewMessageRow<'a> {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: &'a str,
    pub attachments: &'a [String],
    pub status: &'a str,
    pub seen_by: &'a [Uuid],
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the wallets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wallets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WalletRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub balance_cents: i64,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for opening wallets.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wallets)]
pub(crate) struct NewWalletRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub balance_cents: i64,
    pub currency: &'a str,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for appending ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wallet_transactions)]
pub(crate) struct NewWalletTransactionRow<'a> {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub kind: &'a str,
    pub amount_cents: i64,
    pub description: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the wallet_transactions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wallet_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WalletTransactionRow {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub kind: String,
    pub amount_cents: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the kanban_tasks table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = kanban_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct KanbanTaskRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub board_column: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating task cards.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = kanban_tasks)]
pub(crate) struct NewKanbanTaskRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub board_column: &'a str,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for updating task cards.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = kanban_tasks)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct KanbanTaskUpdate<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub board_column: &'a str,
    pub position: i32,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the notifications table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: String,
    pub body: String,
    pub booking_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for delivering notifications.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: &'a str,
    pub body: &'a str,
    pub booking_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
