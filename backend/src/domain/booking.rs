//! Booking aggregate and its status state machine.
//!
//! A booking moves along a fixed set of edges:
//!
//! ```text
//! pending -> confirmed | cancelled
//! confirmed -> rescheduled | completed | cancelled
//! rescheduled -> confirmed | cancelled
//! cancelled, completed -> (terminal)
//! ```
//!
//! ## Invariants
//! - `reschedule_by`, `proposed_date`, and `proposed_slot` are set together
//!   while `status` is [`BookingStatus::Rescheduled`] and cleared together on
//!   resolution.
//! - All mutation goes through the methods below; rows loaded from storage are
//!   re-validated by [`Booking::new`].

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rescheduled,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Stable string form stored in the database and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rescheduled => "rescheduled",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Whether the status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Whether the edge `self -> next` is part of the lifecycle.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (
                    Self::Confirmed,
                    Self::Rescheduled | Self::Completed | Self::Cancelled
                )
                | (Self::Rescheduled, Self::Confirmed | Self::Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "rescheduled" => Ok(Self::Rescheduled),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(BookingValidationError::UnknownStatus),
        }
    }
}

/// Which party opened the pending reschedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RescheduleBy {
    User,
    Mentor,
}

impl RescheduleBy {
    /// Stable string form stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Mentor => "mentor",
        }
    }

    /// The party expected to answer this proposal.
    pub fn counterparty(self) -> Self {
        match self {
            Self::User => Self::Mentor,
            Self::Mentor => Self::User,
        }
    }
}

impl FromStr for RescheduleBy {
    type Err = BookingValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "mentor" => Ok(Self::Mentor),
            _ => Err(BookingValidationError::UnknownParty),
        }
    }
}

/// Decision taken by the counterparty of a pending reschedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RescheduleDecision {
    Approve,
    Reject,
}

/// Validation errors for booking construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingValidationError {
    InvalidSlot,
    InvalidDuration,
    DateInPast,
    UnknownStatus,
    UnknownParty,
    DanglingRescheduleFields,
    MissingRescheduleFields,
}

impl fmt::Display for BookingValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSlot => write!(f, "slot must use the HH:MM-HH:MM format with start before end"),
            Self::InvalidDuration => write!(f, "duration must be a positive number of minutes"),
            Self::DateInPast => write!(f, "booking date must not be in the past"),
            Self::UnknownStatus => write!(f, "status is not a known booking status"),
            Self::UnknownParty => write!(f, "reschedule party must be user or mentor"),
            Self::DanglingRescheduleFields => write!(
                f,
                "reschedule fields are only valid while a reschedule is pending"
            ),
            Self::MissingRescheduleFields => write!(
                f,
                "a rescheduled booking must carry reschedule_by and proposed date/slot"
            ),
        }
    }
}

impl std::error::Error for BookingValidationError {}

/// Errors from lifecycle mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingTransitionError {
    /// The requested edge is not part of the lifecycle.
    #[error("cannot move booking from {from} to {to}")]
    IllegalTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    /// `update-status` cannot enter the reschedule sub-state directly.
    #[error("a reschedule must be requested with a proposed date and slot")]
    RescheduleRequiresProposal,
    /// A response arrived while no reschedule was pending.
    #[error("no reschedule is pending on this booking")]
    NoPendingReschedule,
    /// The proposing party tried to answer its own proposal.
    #[error("the requesting party cannot respond to its own reschedule")]
    SamePartyResponse,
}

/// Time-of-day slot in `HH:MM-HH:MM` form with start strictly before end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slot(String);

static SLOT_RE: OnceLock<Regex> = OnceLock::new();

fn slot_regex() -> &'static Regex {
    SLOT_RE.get_or_init(|| {
        Regex::new("^([01][0-9]|2[0-3]):([0-5][0-9])-([01][0-9]|2[0-3]):([0-5][0-9])$")
            .unwrap_or_else(|error| panic!("slot regex failed to compile: {error}"))
    })
}

impl Slot {
    /// Validate and construct a [`Slot`].
    pub fn new(slot: impl Into<String>) -> Result<Self, BookingValidationError> {
        let slot = slot.into();
        let Some((start, end)) = slot_regex()
            .is_match(&slot)
            .then(|| slot.split_once('-'))
            .flatten()
        else {
            return Err(BookingValidationError::InvalidSlot);
        };
        // Lexicographic order matches chronological order for zero-padded HH:MM.
        if start >= end {
            return Err(BookingValidationError::InvalidSlot);
        }
        Ok(Self(slot))
    }
}

impl AsRef<str> for Slot {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Slot> for String {
    fn from(value: Slot) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slot {
    type Error = BookingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Raw booking fields used to construct or rehydrate a [`Booking`].
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub id: Uuid,
    pub user_id: UserId,
    pub mentor_id: UserId,
    pub booking_date: NaiveDate,
    pub slot: Slot,
    pub status: BookingStatus,
    pub duration_minutes: i32,
    pub topic: Option<String>,
    pub reschedule_by: Option<RescheduleBy>,
    pub proposed_date: Option<NaiveDate>,
    pub proposed_slot: Option<Slot>,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mentoring session booking between a user and a mentor.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    id: Uuid,
    user_id: UserId,
    mentor_id: UserId,
    booking_date: NaiveDate,
    slot: Slot,
    status: BookingStatus,
    duration_minutes: i32,
    topic: Option<String>,
    reschedule_by: Option<RescheduleBy>,
    proposed_date: Option<NaiveDate>,
    proposed_slot: Option<Slot>,
    meeting_link: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Booking {
    /// Validate a draft into a booking, enforcing the reschedule invariant.
    pub fn new(draft: BookingDraft) -> Result<Self, BookingValidationError> {
        if draft.duration_minutes <= 0 {
            return Err(BookingValidationError::InvalidDuration);
        }

        let reschedule_fields = [
            draft.reschedule_by.is_some(),
            draft.proposed_date.is_some(),
            draft.proposed_slot.is_some(),
        ];
        let pending = draft.status == BookingStatus::Rescheduled;
        if pending && reschedule_fields.contains(&false) {
            return Err(BookingValidationError::MissingRescheduleFields);
        }
        if !pending && reschedule_fields.contains(&true) {
            return Err(BookingValidationError::DanglingRescheduleFields);
        }

        Ok(Self {
            id: draft.id,
            user_id: draft.user_id,
            mentor_id: draft.mentor_id,
            booking_date: draft.booking_date,
            slot: draft.slot,
            status: draft.status,
            duration_minutes: draft.duration_minutes,
            topic: draft.topic,
            reschedule_by: draft.reschedule_by,
            proposed_date: draft.proposed_date,
            proposed_slot: draft.proposed_slot,
            meeting_link: draft.meeting_link,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    /// Create a fresh pending booking.
    pub fn create(
        user_id: UserId,
        mentor_id: UserId,
        booking_date: NaiveDate,
        slot: Slot,
        duration_minutes: i32,
        topic: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, BookingValidationError> {
        if booking_date < now.date_naive() {
            return Err(BookingValidationError::DateInPast);
        }
        Self::new(BookingDraft {
            id: Uuid::new_v4(),
            user_id,
            mentor_id,
            booking_date,
            slot,
            status: BookingStatus::Pending,
            duration_minutes,
            topic,
            reschedule_by: None,
            proposed_date: None,
            proposed_slot: None,
            meeting_link: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a direct status transition (`confirm`, `cancel`, `complete`).
    ///
    /// Entering the reschedule sub-state this way is rejected; use
    /// [`Booking::request_reschedule`] so the proposal fields travel with the
    /// status change.
    pub fn update_status(
        &mut self,
        next: BookingStatus,
        now: DateTime<Utc>,
    ) -> Result<(), BookingTransitionError> {
        if next == BookingStatus::Rescheduled {
            return Err(BookingTransitionError::RescheduleRequiresProposal);
        }
        if !self.status.can_transition_to(next) {
            return Err(BookingTransitionError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        // Leaving the reschedule sub-state by any edge resolves the proposal.
        if self.status == BookingStatus::Rescheduled {
            self.clear_reschedule_fields();
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Open a reschedule proposal on a confirmed booking.
    pub fn request_reschedule(
        &mut self,
        by: RescheduleBy,
        proposed_date: NaiveDate,
        proposed_slot: Slot,
        now: DateTime<Utc>,
    ) -> Result<(), BookingTransitionError> {
        if !self.status.can_transition_to(BookingStatus::Rescheduled) {
            return Err(BookingTransitionError::IllegalTransition {
                from: self.status,
                to: BookingStatus::Rescheduled,
            });
        }
        self.status = BookingStatus::Rescheduled;
        self.reschedule_by = Some(by);
        self.proposed_date = Some(proposed_date);
        self.proposed_slot = Some(proposed_slot);
        self.updated_at = now;
        Ok(())
    }

    /// Resolve a pending reschedule.
    ///
    /// Approval commits the proposed date and slot; rejection keeps the
    /// original schedule. Either way the proposal fields are cleared and the
    /// booking returns to [`BookingStatus::Confirmed`].
    pub fn respond_reschedule(
        &mut self,
        responder: RescheduleBy,
        decision: RescheduleDecision,
        now: DateTime<Utc>,
    ) -> Result<(), BookingTransitionError> {
        let Some(requested_by) = self.reschedule_by else {
            return Err(BookingTransitionError::NoPendingReschedule);
        };
        if self.status != BookingStatus::Rescheduled {
            return Err(BookingTransitionError::NoPendingReschedule);
        }
        if responder == requested_by {
            return Err(BookingTransitionError::SamePartyResponse);
        }

        if decision == RescheduleDecision::Approve {
            if let (Some(date), Some(slot)) = (self.proposed_date, self.proposed_slot.take()) {
                self.booking_date = date;
                self.slot = slot;
            }
        }
        self.clear_reschedule_fields();
        self.status = BookingStatus::Confirmed;
        self.updated_at = now;
        Ok(())
    }

    /// Attach the meeting link assigned on confirmation.
    pub fn set_meeting_link(&mut self, link: impl Into<String>) {
        self.meeting_link = Some(link.into());
    }

    fn clear_reschedule_fields(&mut self) {
        self.reschedule_by = None;
        self.proposed_date = None;
        self.proposed_slot = None;
    }

    /// Booking identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Booking owner (the mentee).
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Booked mentor.
    pub fn mentor_id(&self) -> &UserId {
        &self.mentor_id
    }

    /// Scheduled calendar date.
    pub fn booking_date(&self) -> NaiveDate {
        self.booking_date
    }

    /// Scheduled time slot.
    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    /// Current lifecycle status.
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// Session length in minutes.
    pub fn duration_minutes(&self) -> i32 {
        self.duration_minutes
    }

    /// Optional session topic.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// The party that opened the pending reschedule, if any.
    pub fn reschedule_by(&self) -> Option<RescheduleBy> {
        self.reschedule_by
    }

    /// Proposed replacement date while a reschedule is pending.
    pub fn proposed_date(&self) -> Option<NaiveDate> {
        self.proposed_date
    }

    /// Proposed replacement slot while a reschedule is pending.
    pub fn proposed_slot(&self) -> Option<&Slot> {
        self.proposed_slot.as_ref()
    }

    /// Meeting link assigned on confirmation.
    pub fn meeting_link(&self) -> Option<&str> {
        self.meeting_link.as_deref()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Which side of the booking a user is on, if any.
    pub fn party_of(&self, user: &UserId) -> Option<RescheduleBy> {
        if &self.user_id == user {
            Some(RescheduleBy::User)
        } else if &self.mentor_id == user {
            Some(RescheduleBy::Mentor)
        } else {
            None
        }
    }
}
