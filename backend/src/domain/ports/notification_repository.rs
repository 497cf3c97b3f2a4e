//! Port for notification persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Notification, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification repository query failed: {message}",
    }
}

/// Port for delivering and reading in-app notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persist a notification for its recipient.
    async fn push(&self, notification: &Notification) -> Result<(), NotificationRepositoryError>;

    /// List a user's notifications, newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Mark one of the user's notifications as read, reporting whether a row
    /// was touched.
    async fn mark_read(
        &self,
        notification_id: &Uuid,
        user_id: &UserId,
    ) -> Result<bool, NotificationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationRepository;

#[async_trait]
impl NotificationRepository for FixtureNotificationRepository {
    async fn push(&self, _notification: &Notification) -> Result<(), NotificationRepositoryError> {
        Ok(())
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        Ok(Vec::new())
    }

    async fn mark_read(
        &self,
        _notification_id: &Uuid,
        _user_id: &UserId,
    ) -> Result<bool, NotificationRepositoryError> {
        Ok(false)
    }
}
