//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API. It registers every HTTP endpoint from the inbound
//! layer, the request/response schemas those endpoints exchange, and the
//! session cookie security scheme. The generated specification backs
//! Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::CreateBookingRequest;
use crate::domain::{Error, ErrorCode, MentorProfile};
use crate::inbound::http::auth::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::inbound::http::bookings::{RescheduleBody, RespondBody, UpdateStatusBody};
use crate::inbound::http::kanban::{BoardResponse, CreateTaskBody, TaskResponse, UpdateTaskBody};
use crate::inbound::http::notifications::NotificationResponse;
use crate::inbound::http::payments::CheckoutBody;
use crate::inbound::http::wallet::{TransactionResponse, WalletResponse};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Mentoring platform backend API",
        description = "HTTP interface for accounts, bookings, chat rooms, \
                       kanban boards, wallets, and payments."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::mentors::list_mentors,
        crate::inbound::http::bookings::create_booking,
        crate::inbound::http::bookings::list_bookings,
        crate::inbound::http::bookings::get_booking,
        crate::inbound::http::bookings::update_status,
        crate::inbound::http::bookings::request_reschedule,
        crate::inbound::http::bookings::respond_reschedule,
        crate::inbound::http::kanban::get_board,
        crate::inbound::http::kanban::create_task,
        crate::inbound::http::kanban::update_task,
        crate::inbound::http::kanban::delete_task,
        crate::inbound::http::wallet::get_wallet,
        crate::inbound::http::wallet::list_transactions,
        crate::inbound::http::payments::checkout,
        crate::inbound::http::payments::webhook,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        MentorProfile,
        UserResponse,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        CreateBookingRequest,
        UpdateStatusBody,
        RescheduleBody,
        RespondBody,
        BoardResponse,
        TaskResponse,
        CreateTaskBody,
        UpdateTaskBody,
        WalletResponse,
        TransactionResponse,
        CheckoutBody,
        NotificationResponse,
    )),
    tags(
        (name = "auth", description = "Registration and session management"),
        (name = "mentors", description = "Public mentor directory"),
        (name = "bookings", description = "Session booking lifecycle"),
        (name = "kanban", description = "Personal kanban board"),
        (name = "wallet", description = "Wallet balance and ledger"),
        (name = "payments", description = "Hosted checkout and provider callbacks"),
        (name = "notifications", description = "In-app notification inbox"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
