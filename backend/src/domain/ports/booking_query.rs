//! Driving port for booking reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, UserId};

use super::booking_command::BookingPayload;

/// Driving port for booking read operations.
///
/// Reads are scoped to the acting user: a booking is only visible to its two
/// parties.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingQuery: Send + Sync {
    /// Fetch one booking the acting user is a party to.
    async fn get_booking(&self, actor: &UserId, booking_id: Uuid)
    -> Result<BookingPayload, Error>;

    /// List the acting user's bookings, newest first.
    async fn list_bookings(&self, actor: &UserId) -> Result<Vec<BookingPayload>, Error>;
}

/// Fixture query implementation backed by no storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingQuery;

#[async_trait]
impl BookingQuery for FixtureBookingQuery {
    async fn get_booking(
        &self,
        _actor: &UserId,
        booking_id: Uuid,
    ) -> Result<BookingPayload, Error> {
        Err(Error::not_found(format!("no booking with id {booking_id}")))
    }

    async fn list_bookings(&self, _actor: &UserId) -> Result<Vec<BookingPayload>, Error> {
        Ok(Vec::new())
    }
}
