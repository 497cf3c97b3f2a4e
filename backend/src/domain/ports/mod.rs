//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod booking_command;
mod booking_query;
mod booking_repository;
mod chat_command;
mod chat_repository;
mod checkout;
mod kanban_repository;
mod login_service;
mod notification_repository;
mod user_repository;
mod wallet_repository;

#[cfg(test)]
pub use booking_command::MockBookingCommand;
pub use booking_command::{
    BookingCommand, BookingPayload, CreateBookingRequest, FixtureBookingCommand,
    RequestRescheduleRequest, RespondRescheduleRequest, UpdateBookingStatusRequest,
};
#[cfg(test)]
pub use booking_query::MockBookingQuery;
pub use booking_query::{BookingQuery, FixtureBookingQuery};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{BookingRepository, BookingRepositoryError, FixtureBookingRepository};
#[cfg(test)]
pub use chat_command::MockChatCommand;
pub use chat_command::{
    ChatCommand, FixtureChatCommand, JoinRoomResponse, MarkSeenRequest, MessagePayload,
    SendMessageRequest,
};
#[cfg(test)]
pub use chat_repository::MockChatRepository;
pub use chat_repository::{ChatRepository, ChatRepositoryError, FixtureChatRepository};
#[cfg(test)]
pub use checkout::MockCheckoutService;
pub use checkout::{
    CheckoutError, CheckoutRequest, CheckoutService, CheckoutSession, FixtureCheckoutService,
    PaymentEvent,
};
#[cfg(test)]
pub use kanban_repository::MockKanbanRepository;
pub use kanban_repository::{FixtureKanbanRepository, KanbanRepository, KanbanRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FIXTURE_USER_ID, FixtureLoginService, LoginService};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{
    FixtureNotificationRepository, NotificationRepository, NotificationRepositoryError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
#[cfg(test)]
pub use wallet_repository::MockWalletRepository;
pub use wallet_repository::{FixtureWalletRepository, WalletRepository, WalletRepositoryError};
