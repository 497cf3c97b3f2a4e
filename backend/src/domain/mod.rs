//! Domain primitives, aggregates, and use-case services.
//!
//! Purpose: define the strongly typed entities of the mentoring platform and
//! the lifecycle rules that govern them. Types are constructed through
//! validating constructors so adapters can trust every instance they hold;
//! serialisation contracts (serde) live in each type's Rustdoc.
//!
//! Layout:
//! - `booking`, `chat`, `user`, `kanban`, `wallet`, `notification` — entities
//!   and their invariants.
//! - `booking_service`, `chat_service` — use-case services implementing the
//!   driving ports in [`ports`].
//! - `error` — the transport-agnostic API error payload.

pub mod booking;
pub mod booking_service;
pub mod chat;
pub mod chat_service;
pub mod error;
pub mod kanban;
pub mod notification;
pub mod ports;
pub mod user;
pub mod wallet;

pub use self::booking::{
    Booking, BookingDraft, BookingStatus, BookingTransitionError, BookingValidationError,
    RescheduleBy, RescheduleDecision, Slot,
};
pub use self::booking_service::BookingService;
pub use self::chat::{
    ChatValidationError, Conversation, ConversationId, Message, MessageStatus,
};
pub use self::chat_service::ChatService;
pub use self::error::{Error, ErrorCode};
pub use self::kanban::{Column, KanbanTask, KanbanValidationError};
pub use self::notification::{Notification, NotificationKind};
pub use self::user::{
    DisplayName, EmailAddress, LoginCredentials, LoginValidationError, MentorProfile,
    PasswordHash, Role, User, UserId, UserValidationError,
};
pub use self::wallet::{
    DEFAULT_CURRENCY, TransactionKind, Wallet, WalletError, WalletTransaction,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
