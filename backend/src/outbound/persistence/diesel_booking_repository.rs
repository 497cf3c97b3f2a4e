//! PostgreSQL-backed `BookingRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{BookingRepository, BookingRepositoryError};
use crate::domain::{Booking, BookingDraft, Slot, UserId};

use super::error_mapping;
use super::models::{BookingRow, BookingUpdate, NewBookingRow};
use super::pool::{DbPool, PoolError};
use super::schema::bookings;

/// Diesel-backed implementation of the booking repository port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookingRepositoryError {
    error_mapping::map_pool_error(error, BookingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> BookingRepositoryError {
    error_mapping::map_diesel_error(
        error,
        BookingRepositoryError::query,
        BookingRepositoryError::connection,
    )
}

/// Rehydrate a stored row through the domain validator.
///
/// A row that fails validation means the database holds state the domain
/// no longer accepts, which is a query error rather than a missing record.
fn row_to_booking(row: BookingRow) -> Result<Booking, BookingRepositoryError> {
    let slot =
        Slot::new(row.slot).map_err(|err| BookingRepositoryError::query(err.to_string()))?;
    let proposed_slot = row
        .proposed_slot
        .map(Slot::new)
        .transpose()
        .map_err(|err| BookingRepositoryError::query(err.to_string()))?;
    let status = row
        .status
        .parse()
        .map_err(|_| BookingRepositoryError::query(format!("unknown status: {}", row.status)))?;
    let reschedule_by = row
        .reschedule_by
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|_| BookingRepositoryError::query("unknown reschedule party"))?;

    Booking::new(BookingDraft {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        mentor_id: UserId::from_uuid(row.mentor_id),
        booking_date: row.booking_date,
        slot,
        status,
        duration_minutes: row.duration_minutes,
        topic: row.topic,
        reschedule_by,
        proposed_date: row.proposed_date,
        proposed_slot,
        meeting_link: row.meeting_link,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| BookingRepositoryError::query(err.to_string()))
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewBookingRow {
            id: booking.id(),
            user_id: *booking.user_id().as_uuid(),
            mentor_id: *booking.mentor_id().as_uuid(),
            booking_date: booking.booking_date(),
            slot: booking.slot().as_ref(),
            status: booking.status().as_str(),
            duration_minutes: booking.duration_minutes(),
            topic: booking.topic(),
            reschedule_by: booking.reschedule_by().map(|by| by.as_str()),
            proposed_date: booking.proposed_date(),
            proposed_slot: booking.proposed_slot().map(Slot::as_ref),
            meeting_link: booking.meeting_link(),
            created_at: booking.created_at(),
            updated_at: booking.updated_at(),
        };

        diesel::insert_into(bookings::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = BookingUpdate {
            booking_date: booking.booking_date(),
            slot: booking.slot().as_ref(),
            status: booking.status().as_str(),
            reschedule_by: booking.reschedule_by().map(|by| by.as_str()),
            proposed_date: booking.proposed_date(),
            proposed_slot: booking.proposed_slot().map(Slot::as_ref),
            meeting_link: booking.meeting_link(),
            updated_at: booking.updated_at(),
        };

        diesel::update(bookings::table.filter(bookings::id.eq(booking.id())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        booking_id: &uuid::Uuid,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = bookings::table
            .filter(bookings::id.eq(booking_id))
            .select(BookingRow::as_select())
            .first::<BookingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_booking).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<BookingRow> = bookings::table
            .filter(
                bookings::user_id
                    .eq(user_id.as_uuid())
                    .or(bookings::mentor_id.eq(user_id.as_uuid())),
            )
            .order(bookings::created_at.desc())
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_booking).collect()
    }
}
