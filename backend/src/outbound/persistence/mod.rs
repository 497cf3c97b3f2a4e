//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and `bb8`
//! connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: All database errors are mapped to the
//!   domain port error types.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, PoolConfig, DieselUserRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/mentordesk");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_booking_repository;
mod diesel_chat_repository;
mod diesel_kanban_repository;
mod diesel_login_service;
mod diesel_notification_repository;
mod diesel_user_repository;
mod diesel_wallet_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_chat_repository::DieselChatRepository;
pub use diesel_kanban_repository::DieselKanbanRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_wallet_repository::DieselWalletRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
