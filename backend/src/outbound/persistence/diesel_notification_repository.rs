//! PostgreSQL-backed `NotificationRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{Notification, UserId};

use super::error_mapping;
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel-backed implementation of the notification repository port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationRepositoryError {
    error_mapping::map_pool_error(error, NotificationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    error_mapping::map_diesel_error(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

fn row_to_notification(row: NotificationRow) -> Result<Notification, NotificationRepositoryError> {
    let kind = row
        .kind
        .parse()
        .map_err(|_| NotificationRepositoryError::query(format!("unknown kind: {}", row.kind)))?;
    Ok(Notification::from_stored(
        row.id,
        UserId::from_uuid(row.recipient_id),
        kind,
        row.body,
        row.booking_id,
        row.read,
        row.created_at,
    ))
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn push(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewNotificationRow {
            id: notification.id(),
            recipient_id: *notification.recipient_id().as_uuid(),
            kind: notification.kind().as_str(),
            body: notification.body(),
            booking_id: notification.booking_id(),
            read: notification.is_read(),
            created_at: notification.created_at(),
        };

        diesel::insert_into(notifications::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::recipient_id.eq(user_id.as_uuid()))
            .order(notifications::created_at.desc())
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_notification).collect()
    }

    async fn mark_read(
        &self,
        notification_id: &Uuid,
        user_id: &UserId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Filtering on the recipient keeps one user from touching another's
        // inbox; a foreign id simply matches no rows.
        let touched = diesel::update(
            notifications::table
                .filter(notifications::id.eq(notification_id))
                .filter(notifications::recipient_id.eq(user_id.as_uuid())),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(touched > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion.

    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::NotificationKind;

    #[fixture]
    fn inbox_row() -> NotificationRow {
        NotificationRow {
            id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            kind: "reschedule_requested".to_owned(),
            body: "Your mentor proposed a new time".to_owned(),
            booking_id: Some(Uuid::new_v4()),
            read: false,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn stored_notification_rehydrates(inbox_row: NotificationRow) {
        let notification = row_to_notification(inbox_row).expect("valid row");
        assert_eq!(notification.kind(), NotificationKind::RescheduleRequested);
        assert!(!notification.is_read());
        assert!(notification.booking_id().is_some());
    }

    #[rstest]
    fn corrupt_kind_is_a_query_error(mut inbox_row: NotificationRow) {
        inbox_row.kind = "marketing".to_owned();
        let error = row_to_notification(inbox_row).expect_err("unknown kind rejected");
        assert!(matches!(error, NotificationRepositoryError::Query { .. }));
    }
}
