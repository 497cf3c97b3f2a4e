//! Builders for HTTP and WebSocket state from configured ports.
//!
//! Each builder selects a database-backed implementation when a pool is
//! available and falls back to fixture ports otherwise, so the server can
//! run without infrastructure during development and in handler tests.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    CheckoutService, FixtureBookingCommand, FixtureBookingQuery, FixtureCheckoutService,
    FixtureKanbanRepository, FixtureLoginService, FixtureNotificationRepository,
    FixtureUserRepository, FixtureWalletRepository,
};
use crate::domain::{BookingService, ChatService};
use crate::inbound::http::state::HttpState;
use crate::inbound::ws::state::WsState;
use crate::outbound::persistence::{
    DbPool, DieselBookingRepository, DieselChatRepository, DieselKanbanRepository,
    DieselLoginService, DieselNotificationRepository, DieselUserRepository,
    DieselWalletRepository,
};
use crate::outbound::stripe::StripeCheckoutService;

use super::ServerConfig;

fn build_checkout_service(config: &ServerConfig) -> Arc<dyn CheckoutService> {
    match &config.stripe {
        Some(settings) => Arc::new(StripeCheckoutService::new(
            settings.secret_key.clone(),
            settings.webhook_secret.clone(),
        )),
        None => Arc::new(FixtureCheckoutService),
    }
}

fn build_database_backed_state(config: &ServerConfig, pool: &DbPool) -> HttpState {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let wallets = Arc::new(DieselWalletRepository::new(pool.clone()));
    let notifications = Arc::new(DieselNotificationRepository::new(pool.clone()));
    let bookings = Arc::new(BookingService::new(
        Arc::new(DieselBookingRepository::new(pool.clone())),
        users.clone(),
        wallets.clone(),
        notifications.clone(),
    ));

    HttpState {
        login: Arc::new(DieselLoginService::new(users.clone())),
        users,
        bookings: bookings.clone(),
        bookings_query: bookings,
        kanban: Arc::new(DieselKanbanRepository::new(pool.clone())),
        wallets,
        notifications,
        checkout: build_checkout_service(config),
    }
}

/// Build the shared HTTP state from configured ports and fixture fallbacks.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => build_database_backed_state(config, pool),
        None => HttpState {
            login: Arc::new(FixtureLoginService),
            users: Arc::new(FixtureUserRepository),
            bookings: Arc::new(FixtureBookingCommand),
            bookings_query: Arc::new(FixtureBookingQuery),
            kanban: Arc::new(FixtureKanbanRepository),
            wallets: Arc::new(FixtureWalletRepository),
            notifications: Arc::new(FixtureNotificationRepository),
            checkout: build_checkout_service(config),
        },
    };
    web::Data::new(state)
}

/// Build the shared WebSocket state with a fresh room registry.
pub(super) fn build_ws_state(config: &ServerConfig) -> web::Data<WsState> {
    let state = match &config.db_pool {
        Some(pool) => WsState::new(Arc::new(ChatService::new(Arc::new(
            DieselChatRepository::new(pool.clone()),
        )))),
        None => WsState::fixture(),
    };
    web::Data::new(state)
}
