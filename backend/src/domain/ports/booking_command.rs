//! Driving port for booking mutations.
//!
//! Inbound adapters call this port to create bookings and drive the
//! lifecycle without knowing the backing persistence. Authorisation is part
//! of the contract: every method takes the acting user and rejects callers
//! who are not a party to the booking.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    Booking, BookingDraft, BookingStatus, BookingValidationError, Error, RescheduleBy,
    RescheduleDecision, Slot, UserId,
};

/// Serializable booking payload for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub id: Uuid,
    pub user_id: UserId,
    pub mentor_id: UserId,
    pub booking_date: NaiveDate,
    pub slot: Slot,
    pub status: BookingStatus,
    pub duration_minutes: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reschedule_by: Option<RescheduleBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_slot: Option<Slot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingPayload {
    fn from(value: Booking) -> Self {
        Self {
            id: value.id(),
            user_id: value.user_id().clone(),
            mentor_id: value.mentor_id().clone(),
            booking_date: value.booking_date(),
            slot: value.slot().clone(),
            status: value.status(),
            duration_minutes: value.duration_minutes(),
            topic: value.topic().map(str::to_owned),
            reschedule_by: value.reschedule_by(),
            proposed_date: value.proposed_date(),
            proposed_slot: value.proposed_slot().cloned(),
            meeting_link: value.meeting_link().map(str::to_owned),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

impl TryFrom<BookingPayload> for Booking {
    type Error = BookingValidationError;

    fn try_from(value: BookingPayload) -> Result<Self, Self::Error> {
        Booking::new(BookingDraft {
            id: value.id,
            user_id: value.user_id,
            mentor_id: value.mentor_id,
            booking_date: value.booking_date,
            slot: value.slot,
            status: value.status,
            duration_minutes: value.duration_minutes,
            topic: value.topic,
            reschedule_by: value.reschedule_by,
            proposed_date: value.proposed_date,
            proposed_slot: value.proposed_slot,
            meeting_link: value.meeting_link,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

/// Request to create a booking with a mentor.
///
/// `slot` arrives as a raw string and is validated during handling so the
/// caller receives a field-level validation error rather than a
/// deserialisation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[schema(value_type = String)]
    pub mentor_id: UserId,
    pub booking_date: NaiveDate,
    pub slot: String,
    pub duration_minutes: i32,
    #[serde(default)]
    pub topic: Option<String>,
}

/// Request to move a booking along a direct lifecycle edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusRequest {
    pub booking_id: Uuid,
    pub status: BookingStatus,
}

/// Request to open a reschedule proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRescheduleRequest {
    pub booking_id: Uuid,
    pub proposed_date: NaiveDate,
    pub proposed_slot: String,
}

/// Request to resolve a pending reschedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRescheduleRequest {
    pub booking_id: Uuid,
    pub decision: RescheduleDecision,
}

/// Driving port for booking write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Create a pending booking owned by the acting user.
    async fn create_booking(
        &self,
        actor: &UserId,
        request: CreateBookingRequest,
    ) -> Result<BookingPayload, Error>;

    /// Apply a direct status transition (confirm, cancel, complete).
    async fn update_status(
        &self,
        actor: &UserId,
        request: UpdateBookingStatusRequest,
    ) -> Result<BookingPayload, Error>;

    /// Open a reschedule proposal on behalf of the acting party.
    async fn request_reschedule(
        &self,
        actor: &UserId,
        request: RequestRescheduleRequest,
    ) -> Result<BookingPayload, Error>;

    /// Approve or reject the pending reschedule as the counterparty.
    async fn respond_reschedule(
        &self,
        actor: &UserId,
        request: RespondRescheduleRequest,
    ) -> Result<BookingPayload, Error>;
}

/// Fixture command implementation for tests that do not need persistence.
///
/// Creation succeeds and echoes a fresh booking; mutations report the
/// booking as missing because nothing is stored.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingCommand;

#[async_trait]
impl BookingCommand for FixtureBookingCommand {
    async fn create_booking(
        &self,
        actor: &UserId,
        request: CreateBookingRequest,
    ) -> Result<BookingPayload, Error> {
        let slot = Slot::new(request.slot).map_err(|err| Error::invalid_request(err.to_string()))?;
        let booking = Booking::create(
            actor.clone(),
            request.mentor_id,
            request.booking_date,
            slot,
            request.duration_minutes,
            request.topic,
            Utc::now(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(booking.into())
    }

    async fn update_status(
        &self,
        _actor: &UserId,
        request: UpdateBookingStatusRequest,
    ) -> Result<BookingPayload, Error> {
        Err(Error::not_found(format!(
            "no booking with id {}",
            request.booking_id
        )))
    }

    async fn request_reschedule(
        &self,
        _actor: &UserId,
        request: RequestRescheduleRequest,
    ) -> Result<BookingPayload, Error> {
        Err(Error::not_found(format!(
            "no booking with id {}",
            request.booking_id
        )))
    }

    async fn respond_reschedule(
        &self,
        _actor: &UserId,
        request: RespondRescheduleRequest,
    ) -> Result<BookingPayload, Error> {
        Err(Error::not_found(format!(
            "no booking with id {}",
            request.booking_id
        )))
    }
}
