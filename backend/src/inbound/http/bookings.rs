//! Booking lifecycle endpoints.
//!
//! All routes require a session; the acting user is taken from the cookie,
//! never from the request body.

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    CreateBookingRequest, RequestRescheduleRequest, RespondRescheduleRequest,
    UpdateBookingStatusRequest,
};
use crate::domain::{ApiResult, BookingStatus, RescheduleDecision};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_uuid;

/// Direct status transition body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusBody {
    /// Target status: `confirmed`, `cancelled`, or `completed`.
    #[schema(value_type = String, example = "confirmed")]
    pub status: BookingStatus,
}

/// Reschedule proposal body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleBody {
    /// Proposed replacement date (`YYYY-MM-DD`).
    #[schema(value_type = String, example = "2026-04-01")]
    pub proposed_date: NaiveDate,
    /// Proposed replacement slot (`HH:MM-HH:MM`).
    pub proposed_slot: String,
}

/// Reschedule resolution body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondBody {
    /// `approve` or `reject`.
    #[schema(value_type = String, example = "approve")]
    pub decision: RescheduleDecision,
}

/// Create a pending booking with a mentor.
///
/// Body: `{ mentorId, bookingDate, slot, durationMinutes, topic? }`.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Mentor not found"),
    ),
    tag = "bookings"
)]
pub async fn create_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<CreateBookingRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let payload = state
        .bookings
        .create_booking(&actor, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(payload))
}

/// List the acting user's bookings, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    responses((status = 200, description = "Bookings for the current user")),
    tag = "bookings"
)]
pub async fn list_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let bookings = state.bookings_query.list_bookings(&actor).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

/// Fetch one booking the acting user is a party to.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    params(("id" = String, Path, description = "Booking id")),
    responses(
        (status = 200, description = "The booking"),
        (status = 404, description = "Unknown booking"),
    ),
    tag = "bookings"
)]
pub async fn get_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let booking_id = parse_uuid("id", &path.into_inner())?;
    let booking = state.bookings_query.get_booking(&actor, booking_id).await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// Apply a direct lifecycle transition (confirm, cancel, complete).
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}/status",
    params(("id" = String, Path, description = "Booking id")),
    request_body = UpdateStatusBody,
    responses(
        (status = 200, description = "Booking updated"),
        (status = 409, description = "Illegal transition"),
    ),
    tag = "bookings"
)]
pub async fn update_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Json<UpdateStatusBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let booking_id = parse_uuid("id", &path.into_inner())?;
    let booking = state
        .bookings
        .update_status(
            &actor,
            UpdateBookingStatusRequest {
                booking_id,
                status: body.into_inner().status,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// Propose a new date and slot for a confirmed booking.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/reschedule",
    params(("id" = String, Path, description = "Booking id")),
    request_body = RescheduleBody,
    responses(
        (status = 200, description = "Reschedule pending"),
        (status = 409, description = "Booking cannot be rescheduled"),
    ),
    tag = "bookings"
)]
pub async fn request_reschedule(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Json<RescheduleBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let booking_id = parse_uuid("id", &path.into_inner())?;
    let body = body.into_inner();
    let booking = state
        .bookings
        .request_reschedule(
            &actor,
            RequestRescheduleRequest {
                booking_id,
                proposed_date: body.proposed_date,
                proposed_slot: body.proposed_slot,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// Approve or reject the pending reschedule as the counterparty.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/reschedule/respond",
    params(("id" = String, Path, description = "Booking id")),
    request_body = RespondBody,
    responses(
        (status = 200, description = "Reschedule resolved"),
        (status = 403, description = "Requester cannot answer its own proposal"),
        (status = 409, description = "No reschedule pending"),
    ),
    tag = "bookings"
)]
pub async fn respond_reschedule(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Json<RespondBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let booking_id = parse_uuid("id", &path.into_inner())?;
    let booking = state
        .bookings
        .respond_reschedule(
            &actor,
            RespondRescheduleRequest {
                booking_id,
                decision: body.into_inner().decision,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(booking))
}
