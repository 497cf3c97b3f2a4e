//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod bookings;
pub mod error;
pub mod health;
pub mod kanban;
pub mod mentors;
pub mod notifications;
pub mod payments;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod wallet;

use actix_web::web;

/// Register every `/api/v1` route on the given scope.
///
/// The caller owns the surrounding scope so middleware (sessions, tracing)
/// can be applied once, in one place.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/register", web::post().to(auth::register))
        .route("/auth/login", web::post().to(auth::login))
        .route("/auth/logout", web::post().to(auth::logout))
        .route("/auth/me", web::get().to(auth::me))
        .route("/mentors", web::get().to(mentors::list_mentors))
        .route("/bookings", web::post().to(bookings::create_booking))
        .route("/bookings", web::get().to(bookings::list_bookings))
        .route("/bookings/{id}", web::get().to(bookings::get_booking))
        .route(
            "/bookings/{id}/status",
            web::patch().to(bookings::update_status),
        )
        .route(
            "/bookings/{id}/reschedule",
            web::post().to(bookings::request_reschedule),
        )
        .route(
            "/bookings/{id}/reschedule/respond",
            web::post().to(bookings::respond_reschedule),
        )
        .route("/kanban", web::get().to(kanban::get_board))
        .route("/kanban/tasks", web::post().to(kanban::create_task))
        .route("/kanban/tasks/{id}", web::patch().to(kanban::update_task))
        .route("/kanban/tasks/{id}", web::delete().to(kanban::delete_task))
        .route("/wallet", web::get().to(wallet::get_wallet))
        .route(
            "/wallet/transactions",
            web::get().to(wallet::list_transactions),
        )
        .route("/payments/checkout", web::post().to(payments::checkout))
        .route("/payments/webhook", web::post().to(payments::webhook))
        .route(
            "/notifications",
            web::get().to(notifications::list_notifications),
        )
        .route(
            "/notifications/{id}/read",
            web::post().to(notifications::mark_read),
        );
}
