//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.
//! Regenerate with `diesel print-schema` when migrations change.

diesel::table! {
    /// Registered accounts, both mentees and mentors.
    ///
    /// Mentor directory fields are nullable and only populated for
    /// mentor-role rows.
    users (id) {
        id -> Uuid,
        display_name -> Varchar,
        /// Lowercased, unique login address.
        email -> Varchar,
        /// `user` or `mentor`.
        role -> Varchar,
        /// Salted digest in `salt_hex$digest_hex` form.
        password_hash -> Varchar,
        mentor_expertise -> Nullable<Varchar>,
        mentor_hourly_rate_cents -> Nullable<Int8>,
        mentor_bio -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Mentoring session bookings and their reschedule state.
    bookings (id) {
        id -> Uuid,
        user_id -> Uuid,
        mentor_id -> Uuid,
        booking_date -> Date,
        /// `HH:MM-HH:MM` window within the day.
        slot -> Varchar,
        status -> Varchar,
        duration_minutes -> Int4,
        topic -> Nullable<Text>,
        /// Which party proposed the pending reschedule, if any.
        reschedule_by -> Nullable<Varchar>,
        proposed_date -> Nullable<Date>,
        proposed_slot -> Nullable<Varchar>,
        meeting_link -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One chat room per user/mentor pair.
    conversations (id) {
        id -> Uuid,
        user_id -> Uuid,
        mentor_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Chat messages, append-only.
    messages (id) {
        id -> Uuid,
        conversation_id -> Uuid,
        sender_id -> Uuid,
        content -> Text,
        attachments -> Array<Text>,
        status -> Varchar,
        seen_by -> Array<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One wallet per user, opened lazily.
    wallets (id) {
        id -> Uuid,
        owner_id -> Uuid,
        balance_cents -> Int8,
        currency -> Varchar,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ledger entries recording every wallet balance change.
    wallet_transactions (id) {
        id -> Uuid,
        wallet_id -> Uuid,
        /// `credit` or `debit`.
        kind -> Varchar,
        amount_cents -> Int8,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Personal kanban board cards.
    kanban_tasks (id) {
        id -> Uuid,
        owner_id -> Uuid,
        title -> Varchar,
        description -> Nullable<Text>,
        /// `todo`, `in_progress`, or `done`. Named to avoid the reserved word.
        board_column -> Varchar,
        position -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// In-app notification inbox.
    notifications (id) {
        id -> Uuid,
        recipient_id -> Uuid,
        kind -> Varchar,
        body -> Text,
        booking_id -> Nullable<Uuid>,
        read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    bookings,
    conversations,
    messages,
    wallets,
    wallet_transactions,
    kanban_tasks,
    notifications,
);
