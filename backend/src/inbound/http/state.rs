//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BookingCommand, BookingQuery, CheckoutService, FixtureBookingCommand, FixtureBookingQuery,
    FixtureCheckoutService, FixtureKanbanRepository, FixtureLoginService,
    FixtureNotificationRepository, FixtureUserRepository, FixtureWalletRepository,
    KanbanRepository, LoginService, NotificationRepository, UserRepository, WalletRepository,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserRepository>,
    pub bookings: Arc<dyn BookingCommand>,
    pub bookings_query: Arc<dyn BookingQuery>,
    pub kanban: Arc<dyn KanbanRepository>,
    pub wallets: Arc<dyn WalletRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub checkout: Arc<dyn CheckoutService>,
}

impl HttpState {
    /// State backed entirely by fixture ports, for tests and for running
    /// without a configured database.
    ///
    /// # Examples
    /// ```
    /// use backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::fixture();
    /// let _login = state.login.clone();
    /// ```
    pub fn fixture() -> Self {
        Self {
            login: Arc::new(FixtureLoginService),
            users: Arc::new(FixtureUserRepository),
            bookings: Arc::new(FixtureBookingCommand),
            bookings_query: Arc::new(FixtureBookingQuery),
            kanban: Arc::new(FixtureKanbanRepository),
            wallets: Arc::new(FixtureWalletRepository),
            notifications: Arc::new(FixtureNotificationRepository),
            checkout: Arc::new(FixtureCheckoutService),
        }
    }
}
