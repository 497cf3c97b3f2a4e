//! In-app notifications raised by booking lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingCreated,
    BookingConfirmed,
    BookingCancelled,
    BookingCompleted,
    RescheduleRequested,
    RescheduleApproved,
    RescheduleRejected,
}

impl NotificationKind {
    /// Stable string form stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BookingCreated => "booking_created",
            Self::BookingConfirmed => "booking_confirmed",
            Self::BookingCancelled => "booking_cancelled",
            Self::BookingCompleted => "booking_completed",
            Self::RescheduleRequested => "reschedule_requested",
            Self::RescheduleApproved => "reschedule_approved",
            Self::RescheduleRejected => "reschedule_rejected",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booking_created" => Ok(Self::BookingCreated),
            "booking_confirmed" => Ok(Self::BookingConfirmed),
            "booking_cancelled" => Ok(Self::BookingCancelled),
            "booking_completed" => Ok(Self::BookingCompleted),
            "reschedule_requested" => Ok(Self::RescheduleRequested),
            "reschedule_approved" => Ok(Self::RescheduleApproved),
            "reschedule_rejected" => Ok(Self::RescheduleRejected),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// Notification delivered to a user's inbox.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    id: Uuid,
    recipient_id: UserId,
    kind: NotificationKind,
    body: String,
    booking_id: Option<Uuid>,
    read: bool,
    created_at: DateTime<Utc>,
}

impl Notification {
    /// Create an unread notification.
    pub fn new(
        recipient_id: UserId,
        kind: NotificationKind,
        body: impl Into<String>,
        booking_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            kind,
            body: body.into(),
            booking_id,
            read: false,
            created_at: now,
        }
    }

    /// Rehydrate a stored notification.
    pub fn from_stored(
        id: Uuid,
        recipient_id: UserId,
        kind: NotificationKind,
        body: String,
        booking_id: Option<Uuid>,
        read: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            recipient_id,
            kind,
            body,
            booking_id,
            read,
            created_at,
        }
    }

    /// Mark the notification as read.
    pub fn mark_read(&mut self) {
        self.read = true;
    }

    /// Notification identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// User the notification is addressed to.
    pub fn recipient_id(&self) -> &UserId {
        &self.recipient_id
    }

    /// Notification category.
    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Human-readable text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Booking the notification refers to, if any.
    pub fn booking_id(&self) -> Option<Uuid> {
        self.booking_id
    }

    /// Whether the recipient has read it.
    pub fn is_read(&self) -> bool {
        self.read
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
