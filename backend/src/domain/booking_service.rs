//! Booking use-case service implementing the driving booking ports.
//!
//! Bridges inbound adapters to the booking aggregate: loads the booking,
//! applies the lifecycle mutation, persists the result, and raises a
//! notification for the counterparty. Notification delivery is best effort;
//! a failed push is logged and never rolls back the booking change.
//! Completing a booking settles the session fee against the mentee's wallet
//! before the completion persists, so an unfunded wallet blocks completion.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{
    BookingCommand, BookingPayload, BookingQuery, BookingRepository, BookingRepositoryError,
    CreateBookingRequest, NotificationRepository, RequestRescheduleRequest,
    RespondRescheduleRequest, UpdateBookingStatusRequest, UserRepository, UserRepositoryError,
    WalletRepository, WalletRepositoryError,
};
use crate::domain::{
    Booking, BookingStatus, BookingTransitionError, Error, Notification, NotificationKind,
    RescheduleBy, RescheduleDecision, Role, Slot, User, UserId, WalletError,
};

/// Booking use-case service over the booking, user, wallet, and notification
/// ports.
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn UserRepository>,
    wallets: Arc<dyn WalletRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl BookingService {
    /// Build the service from its driven ports.
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        users: Arc<dyn UserRepository>,
        wallets: Arc<dyn WalletRepository>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            bookings,
            users,
            wallets,
            notifications,
        }
    }

    async fn load_for_party(
        &self,
        actor: &UserId,
        booking_id: Uuid,
    ) -> Result<(Booking, RescheduleBy), Error> {
        let booking = self
            .bookings
            .find_by_id(&booking_id)
            .await
            .map_err(map_booking_repository_error)?
            .ok_or_else(|| Error::not_found(format!("no booking with id {booking_id}")))?;
        // Non-parties learn nothing about the booking, not even that it
        // exists.
        let party = booking
            .party_of(actor)
            .ok_or_else(|| Error::not_found(format!("no booking with id {booking_id}")))?;
        Ok((booking, party))
    }

    /// Debit the session fee from the mentee's wallet.
    ///
    /// The fee is the mentor's hourly rate prorated by the booked duration.
    /// Runs before the completed status persists; an insufficient balance
    /// surfaces as a conflict and the booking stays in its prior state.
    async fn settle(&self, booking: &Booking) -> Result<(), Error> {
        let mentor = self
            .users
            .find_by_id(booking.mentor_id())
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::internal("mentor account missing at settlement"))?;
        let fee = session_fee_cents(&mentor, booking.duration_minutes());
        if fee == 0 {
            return Ok(());
        }

        let mut wallet = self
            .wallets
            .find_or_open_for_user(booking.user_id())
            .await
            .map_err(map_wallet_repository_error)?;
        let entry = wallet
            .debit(
                fee,
                Some(format!("session with {}", mentor.display_name())),
                Utc::now(),
            )
            .map_err(|err| match err {
                WalletError::InsufficientFunds { balance_cents } => Error::conflict(format!(
                    "wallet balance of {balance_cents} cents cannot cover the {fee} cent session fee"
                )),
                other => Error::internal(other.to_string()),
            })?;
        self.wallets
            .record(&wallet, &entry)
            .await
            .map_err(map_wallet_repository_error)?;
        Ok(())
    }

    async fn notify(&self, booking: &Booking, recipient: RescheduleBy, kind: NotificationKind) {
        let recipient_id = match recipient {
            RescheduleBy::User => booking.user_id().clone(),
            RescheduleBy::Mentor => booking.mentor_id().clone(),
        };
        let body = notification_body(kind, booking);
        let notification = Notification::new(
            recipient_id,
            kind,
            body,
            Some(booking.id()),
            Utc::now(),
        );
        if let Err(error) = self.notifications.push(&notification).await {
            warn!(%error, booking_id = %booking.id(), "failed to deliver booking notification");
        }
    }
}

fn notification_body(kind: NotificationKind, booking: &Booking) -> String {
    let date = booking.booking_date();
    match kind {
        NotificationKind::BookingCreated => {
            format!("New booking request for {date} ({})", booking.slot())
        }
        NotificationKind::BookingConfirmed => {
            format!("Your booking on {date} ({}) is confirmed", booking.slot())
        }
        NotificationKind::BookingCancelled => {
            format!("Your booking on {date} ({}) was cancelled", booking.slot())
        }
        NotificationKind::BookingCompleted => {
            format!("Your booking on {date} was marked completed")
        }
        NotificationKind::RescheduleRequested => format!(
            "A new time was proposed for your booking on {date}: {} ({})",
            booking.proposed_date().map_or_else(String::new, |d| d.to_string()),
            booking
                .proposed_slot()
                .map_or("", |slot| slot.as_ref()),
        ),
        NotificationKind::RescheduleApproved => {
            format!("Your reschedule was approved; see you on {date} ({})", booking.slot())
        }
        NotificationKind::RescheduleRejected => {
            format!("Your reschedule was declined; the booking stays on {date}")
        }
    }
}

fn session_fee_cents(mentor: &User, duration_minutes: i32) -> i64 {
    let rate = mentor
        .mentor_profile()
        .map_or(0, |profile| profile.hourly_rate_cents);
    rate * i64::from(duration_minutes) / 60
}

fn map_booking_repository_error(error: BookingRepositoryError) -> Error {
    match error {
        BookingRepositoryError::Connection { .. } => {
            Error::service_unavailable("booking storage is unavailable")
        }
        BookingRepositoryError::Query { message } => {
            Error::internal(format!("booking query failed: {message}"))
        }
    }
}

fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { .. } => {
            Error::service_unavailable("user storage is unavailable")
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user query failed: {message}"))
        }
        UserRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("an account already exists for {email}"))
        }
    }
}

fn map_wallet_repository_error(error: WalletRepositoryError) -> Error {
    match error {
        WalletRepositoryError::Connection { .. } => {
            Error::service_unavailable("wallet storage is unavailable")
        }
        WalletRepositoryError::Query { message } => {
            Error::internal(format!("wallet query failed: {message}"))
        }
    }
}

fn map_transition_error(error: BookingTransitionError) -> Error {
    match error {
        BookingTransitionError::IllegalTransition { from, to } => {
            Error::conflict(format!("cannot move booking from {from} to {to}"))
        }
        BookingTransitionError::RescheduleRequiresProposal => {
            Error::invalid_request("a reschedule needs a proposed date and slot")
        }
        BookingTransitionError::NoPendingReschedule => {
            Error::conflict("no reschedule is pending on this booking")
        }
        BookingTransitionError::SamePartyResponse => {
            Error::forbidden("the requesting party cannot respond to its own reschedule")
        }
    }
}

fn meeting_link(booking_id: Uuid) -> String {
    format!("https://meet.mentordesk.example/{}", booking_id.simple())
}

#[async_trait]
impl BookingCommand for BookingService {
    async fn create_booking(
        &self,
        actor: &UserId,
        request: CreateBookingRequest,
    ) -> Result<BookingPayload, Error> {
        let mentor = self
            .users
            .find_by_id(&request.mentor_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("no mentor with id {}", request.mentor_id)))?;
        if mentor.role() != Role::Mentor {
            return Err(Error::invalid_request(format!(
                "user {} is not a mentor",
                request.mentor_id
            )));
        }

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

        self.bookings
            .insert(&booking)
            .await
            .map_err(map_booking_repository_error)?;
        self.notify(&booking, RescheduleBy::Mentor, NotificationKind::BookingCreated)
            .await;
        Ok(booking.into())
    }

    async fn update_status(
        &self,
        actor: &UserId,
        request: UpdateBookingStatusRequest,
    ) -> Result<BookingPayload, Error> {
        let (mut booking, acting_party) = self.load_for_party(actor, request.booking_id).await?;

        booking
            .update_status(request.status, Utc::now())
            .map_err(map_transition_error)?;
        if request.status == BookingStatus::Confirmed && booking.meeting_link().is_none() {
            booking.set_meeting_link(meeting_link(booking.id()));
        }
        if request.status == BookingStatus::Completed {
            self.settle(&booking).await?;
        }

        self.bookings
            .update(&booking)
            .await
            .map_err(map_booking_repository_error)?;

        let kind = match request.status {
            BookingStatus::Confirmed => NotificationKind::BookingConfirmed,
            BookingStatus::Cancelled => NotificationKind::BookingCancelled,
            BookingStatus::Completed => NotificationKind::BookingCompleted,
            BookingStatus::Pending | BookingStatus::Rescheduled => {
                // update_status rejects these edges before reaching here.
                return Ok(booking.into());
            }
        };
        self.notify(&booking, acting_party.counterparty(), kind).await;
        Ok(booking.into())
    }

    async fn request_reschedule(
        &self,
        actor: &UserId,
        request: RequestRescheduleRequest,
    ) -> Result<BookingPayload, Error> {
        let (mut booking, acting_party) = self.load_for_party(actor, request.booking_id).await?;

        let proposed_slot = Slot::new(request.proposed_slot)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        booking
            .request_reschedule(acting_party, request.proposed_date, proposed_slot, Utc::now())
            .map_err(map_transition_error)?;

        self.bookings
            .update(&booking)
            .await
            .map_err(map_booking_repository_error)?;
        self.notify(
            &booking,
            acting_party.counterparty(),
            NotificationKind::RescheduleRequested,
        )
        .await;
        Ok(booking.into())
    }

    async fn respond_reschedule(
        &self,
        actor: &UserId,
        request: RespondRescheduleRequest,
    ) -> Result<BookingPayload, Error> {
        let (mut booking, acting_party) = self.load_for_party(actor, request.booking_id).await?;

        booking
            .respond_reschedule(acting_party, request.decision, Utc::now())
            .map_err(map_transition_error)?;

        self.bookings
            .update(&booking)
            .await
            .map_err(map_booking_repository_error)?;
        let kind = match request.decision {
            RescheduleDecision::Approve => NotificationKind::RescheduleApproved,
            RescheduleDecision::Reject => NotificationKind::RescheduleRejected,
        };
        self.notify(&booking, acting_party.counterparty(), kind).await;
        Ok(booking.into())
    }
}

#[async_trait]
impl BookingQuery for BookingService {
    async fn get_booking(
        &self,
        actor: &UserId,
        booking_id: Uuid,
    ) -> Result<BookingPayload, Error> {
        self.load_for_party(actor, booking_id)
            .await
            .map(|(booking, _)| booking.into())
    }

    async fn list_bookings(&self, actor: &UserId) -> Result<Vec<BookingPayload>, Error> {
        let bookings = self
            .bookings
            .list_for_user(actor)
            .await
            .map_err(map_booking_repository_error)?;
        Ok(bookings.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{
        BookingRepositoryError, FixtureUserRepository, FixtureWalletRepository,
        NotificationRepositoryError,
    };
    use crate::domain::{
        DisplayName, EmailAddress, ErrorCode, MentorProfile, PasswordHash, TransactionKind,
        Wallet, WalletTransaction,
    };

    #[derive(Default)]
    struct InMemoryBookings {
        rows: Mutex<HashMap<Uuid, Booking>>,
    }

    #[async_trait]
    impl BookingRepository for InMemoryBookings {
        async fn insert(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
            self.rows
                .lock()
                .expect("bookings lock")
                .insert(booking.id(), booking.clone());
            Ok(())
        }

        async fn update(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
            self.rows
                .lock()
                .expect("bookings lock")
                .insert(booking.id(), booking.clone());
            Ok(())
        }

        async fn find_by_id(
            &self,
            booking_id: &Uuid,
        ) -> Result<Option<Booking>, BookingRepositoryError> {
            Ok(self
                .rows
                .lock()
                .expect("bookings lock")
                .get(booking_id)
                .cloned())
        }

        async fn list_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Vec<Booking>, BookingRepositoryError> {
            let rows = self.rows.lock().expect("bookings lock");
            let mut bookings: Vec<Booking> = rows
                .values()
                .filter(|booking| booking.party_of(user_id).is_some())
                .cloned()
                .collect();
            bookings.sort_by_key(|booking| std::cmp::Reverse(booking.created_at()));
            Ok(bookings)
        }
    }

    #[derive(Default)]
    struct RecordingNotifications {
        pushed: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationRepository for RecordingNotifications {
        async fn push(
            &self,
            notification: &Notification,
        ) -> Result<(), NotificationRepositoryError> {
            self.pushed
                .lock()
                .expect("notifications lock")
                .push(notification.clone());
            Ok(())
        }

        async fn list_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Vec<Notification>, NotificationRepositoryError> {
            Ok(self
                .pushed
                .lock()
                .expect("notifications lock")
                .iter()
                .filter(|n| n.recipient_id() == user_id)
                .cloned()
                .collect())
        }

        async fn mark_read(
            &self,
            _notification_id: &Uuid,
            _user_id: &UserId,
        ) -> Result<bool, NotificationRepositoryError> {
            Ok(false)
        }
    }

    #[derive(Default)]
    struct InMemoryWallets {
        state: Mutex<Option<(Wallet, Vec<WalletTransaction>)>>,
    }

    impl InMemoryWallets {
        fn fund(&self, owner: &UserId, amount_cents: i64) {
            let mut wallet = Wallet::open(owner.clone(), Utc::now());
            let entry = wallet
                .credit(amount_cents, None, Utc::now())
                .expect("positive credit");
            *self.state.lock().expect("wallets lock") = Some((wallet, vec![entry]));
        }

        fn balance_cents(&self) -> i64 {
            self.state
                .lock()
                .expect("wallets lock")
                .as_ref()
                .map_or(0, |(wallet, _)| wallet.balance_cents())
        }

        fn ledger(&self) -> Vec<WalletTransaction> {
            self.state
                .lock()
                .expect("wallets lock")
                .as_ref()
                .map_or_else(Vec::new, |(_, ledger)| ledger.clone())
        }
    }

    #[async_trait]
    impl WalletRepository for InMemoryWallets {
        async fn find_or_open_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Wallet, WalletRepositoryError> {
            let mut state = self.state.lock().expect("wallets lock");
            let (wallet, _) = state
                .get_or_insert_with(|| (Wallet::open(user_id.clone(), Utc::now()), Vec::new()));
            Ok(wallet.clone())
        }

        async fn record(
            &self,
            wallet: &Wallet,
            transaction: &WalletTransaction,
        ) -> Result<(), WalletRepositoryError> {
            let mut state = self.state.lock().expect("wallets lock");
            match state.as_mut() {
                Some((stored, ledger)) => {
                    *stored = wallet.clone();
                    ledger.push(transaction.clone());
                }
                None => *state = Some((wallet.clone(), vec![transaction.clone()])),
            }
            Ok(())
        }

        async fn list_transactions(
            &self,
            _wallet_id: &Uuid,
        ) -> Result<Vec<WalletTransaction>, WalletRepositoryError> {
            Ok(self.ledger())
        }
    }

    struct KnownMentor {
        mentor: User,
    }

    #[async_trait]
    impl UserRepository for KnownMentor {
        async fn create(&self, _user: &User) -> Result<(), UserRepositoryError> {
            Ok(())
        }

        async fn find_by_id(
            &self,
            user_id: &UserId,
        ) -> Result<Option<User>, UserRepositoryError> {
            Ok((self.mentor.id() == user_id).then(|| self.mentor.clone()))
        }

        async fn find_by_email(
            &self,
            _email: &EmailAddress,
        ) -> Result<Option<User>, UserRepositoryError> {
            Ok(None)
        }

        async fn list_mentors(&self) -> Result<Vec<User>, UserRepositoryError> {
            Ok(vec![self.mentor.clone()])
        }
    }

    fn build_mentor() -> User {
        User::new(
            UserId::random(),
            DisplayName::new("Grace Hopper").expect("valid name"),
            EmailAddress::new("grace@example.com").expect("valid email"),
            Role::Mentor,
            PasswordHash::derive("longenough").expect("valid password"),
            Some(MentorProfile {
                expertise: "compilers".to_owned(),
                hourly_rate_cents: 9_000,
                bio: None,
            }),
        )
    }

    struct Harness {
        service: BookingService,
        notifications: Arc<RecordingNotifications>,
        wallets: Arc<InMemoryWallets>,
        mentor_id: UserId,
    }

    #[fixture]
    fn harness() -> Harness {
        let mentor = build_mentor();
        let mentor_id = mentor.id().clone();
        let notifications = Arc::new(RecordingNotifications::default());
        let wallets = Arc::new(InMemoryWallets::default());
        let service = BookingService::new(
            Arc::new(InMemoryBookings::default()),
            Arc::new(KnownMentor { mentor }),
            Arc::clone(&wallets) as Arc<dyn WalletRepository>,
            Arc::clone(&notifications) as Arc<dyn NotificationRepository>,
        );
        Harness {
            service,
            notifications,
            wallets,
            mentor_id,
        }
    }

    fn create_request(mentor_id: &UserId) -> CreateBookingRequest {
        CreateBookingRequest {
            mentor_id: mentor_id.clone(),
            booking_date: NaiveDate::from_ymd_opt(2099, 1, 15).expect("valid date"),
            slot: "10:00-11:00".to_owned(),
            duration_minutes: 60,
            topic: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_persists_and_notifies_mentor(harness: Harness) {
        let actor = UserId::random();
        let payload = harness
            .service
            .create_booking(&actor, create_request(&harness.mentor_id))
            .await
            .expect("booking created");

        assert_eq!(payload.status, BookingStatus::Pending);
        let inbox = harness
            .notifications
            .list_for_user(&harness.mentor_id)
            .await
            .expect("inbox reads");
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind(), NotificationKind::BookingCreated);

        let listed = harness
            .service
            .list_bookings(&actor)
            .await
            .expect("bookings list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, payload.id);
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_unknown_mentor(harness: Harness) {
        let err = harness
            .service
            .create_booking(&UserId::random(), create_request(&UserId::random()))
            .await
            .expect_err("unknown mentor rejected");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn confirm_assigns_meeting_link_once(harness: Harness) {
        let actor = UserId::random();
        let created = harness
            .service
            .create_booking(&actor, create_request(&harness.mentor_id))
            .await
            .expect("booking created");

        let confirmed = harness
            .service
            .update_status(
                &harness.mentor_id,
                UpdateBookingStatusRequest {
                    booking_id: created.id,
                    status: BookingStatus::Confirmed,
                },
            )
            .await
            .expect("booking confirmed");

        let link = confirmed.meeting_link.expect("meeting link assigned");
        assert!(link.contains(&created.id.simple().to_string()));
    }

    #[rstest]
    #[tokio::test]
    async fn full_reschedule_round_trip(harness: Harness) {
        let actor = UserId::random();
        let created = harness
            .service
            .create_booking(&actor, create_request(&harness.mentor_id))
            .await
            .expect("booking created");
        harness
            .service
            .update_status(
                &harness.mentor_id,
                UpdateBookingStatusRequest {
                    booking_id: created.id,
                    status: BookingStatus::Confirmed,
                },
            )
            .await
            .expect("booking confirmed");

        let proposed_date = NaiveDate::from_ymd_opt(2099, 1, 20).expect("valid date");
        let rescheduled = harness
            .service
            .request_reschedule(
                &actor,
                RequestRescheduleRequest {
                    booking_id: created.id,
                    proposed_date,
                    proposed_slot: "14:00-15:00".to_owned(),
                },
            )
            .await
            .expect("reschedule requested");
        assert_eq!(rescheduled.status, BookingStatus::Rescheduled);
        assert_eq!(rescheduled.reschedule_by, Some(RescheduleBy::User));

        let approved = harness
            .service
            .respond_reschedule(
                &harness.mentor_id,
                RespondRescheduleRequest {
                    booking_id: created.id,
                    decision: RescheduleDecision::Approve,
                },
            )
            .await
            .expect("reschedule approved");
        assert_eq!(approved.status, BookingStatus::Confirmed);
        assert_eq!(approved.booking_date, proposed_date);
        assert!(approved.reschedule_by.is_none());
        assert!(approved.proposed_date.is_none());

        // Mentor got created + requested, user got confirmed + approved.
        let user_inbox = harness
            .notifications
            .list_for_user(&actor)
            .await
            .expect("inbox reads");
        assert!(
            user_inbox
                .iter()
                .any(|n| n.kind() == NotificationKind::RescheduleApproved)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn requester_cannot_answer_own_proposal(harness: Harness) {
        let actor = UserId::random();
        let created = harness
            .service
            .create_booking(&actor, create_request(&harness.mentor_id))
            .await
            .expect("booking created");
        harness
            .service
            .update_status(
                &harness.mentor_id,
                UpdateBookingStatusRequest {
                    booking_id: created.id,
                    status: BookingStatus::Confirmed,
                },
            )
            .await
            .expect("booking confirmed");
        harness
            .service
            .request_reschedule(
                &actor,
                RequestRescheduleRequest {
                    booking_id: created.id,
                    proposed_date: NaiveDate::from_ymd_opt(2099, 1, 20).expect("valid date"),
                    proposed_slot: "14:00-15:00".to_owned(),
                },
            )
            .await
            .expect("reschedule requested");

        let err = harness
            .service
            .respond_reschedule(
                &actor,
                RespondRescheduleRequest {
                    booking_id: created.id,
                    decision: RescheduleDecision::Approve,
                },
            )
            .await
            .expect_err("self-approval rejected");
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn completing_settles_the_session_fee(harness: Harness) {
        let actor = UserId::random();
        harness.wallets.fund(&actor, 10_000);
        let created = harness
            .service
            .create_booking(&actor, create_request(&harness.mentor_id))
            .await
            .expect("booking created");
        harness
            .service
            .update_status(
                &harness.mentor_id,
                UpdateBookingStatusRequest {
                    booking_id: created.id,
                    status: BookingStatus::Confirmed,
                },
            )
            .await
            .expect("booking confirmed");

        let completed = harness
            .service
            .update_status(
                &harness.mentor_id,
                UpdateBookingStatusRequest {
                    booking_id: created.id,
                    status: BookingStatus::Completed,
                },
            )
            .await
            .expect("booking completed");
        assert_eq!(completed.status, BookingStatus::Completed);

        // 60 minutes at 9 000 cents/hour.
        assert_eq!(harness.wallets.balance_cents(), 1_000);
        let ledger = harness.wallets.ledger();
        let debit = ledger
            .iter()
            .find(|entry| entry.kind() == TransactionKind::Debit)
            .expect("settlement recorded");
        assert_eq!(debit.amount_cents(), 9_000);
        assert_eq!(debit.description(), Some("session with Grace Hopper"));
    }

    #[rstest]
    #[tokio::test]
    async fn completion_without_funds_is_a_conflict(harness: Harness) {
        let actor = UserId::random();
        let created = harness
            .service
            .create_booking(&actor, create_request(&harness.mentor_id))
            .await
            .expect("booking created");
        harness
            .service
            .update_status(
                &harness.mentor_id,
                UpdateBookingStatusRequest {
                    booking_id: created.id,
                    status: BookingStatus::Confirmed,
                },
            )
            .await
            .expect("booking confirmed");

        let err = harness
            .service
            .update_status(
                &harness.mentor_id,
                UpdateBookingStatusRequest {
                    booking_id: created.id,
                    status: BookingStatus::Completed,
                },
            )
            .await
            .expect_err("empty wallet blocks completion");
        assert_eq!(err.code, ErrorCode::Conflict);

        // The booking stayed confirmed; nothing was persisted.
        let current = harness
            .service
            .get_booking(&actor, created.id)
            .await
            .expect("booking reads");
        assert_eq!(current.status, BookingStatus::Confirmed);
    }

    #[rstest]
    #[tokio::test]
    async fn non_party_sees_not_found(harness: Harness) {
        let created = harness
            .service
            .create_booking(&UserId::random(), create_request(&harness.mentor_id))
            .await
            .expect("booking created");

        let err = harness
            .service
            .get_booking(&UserId::random(), created.id)
            .await
            .expect_err("stranger cannot read");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn terminal_states_reject_transitions(harness: Harness) {
        let actor = UserId::random();
        let created = harness
            .service
            .create_booking(&actor, create_request(&harness.mentor_id))
            .await
            .expect("booking created");
        harness
            .service
            .update_status(
                &actor,
                UpdateBookingStatusRequest {
                    booking_id: created.id,
                    status: BookingStatus::Cancelled,
                },
            )
            .await
            .expect("booking cancelled");

        let err = harness
            .service
            .update_status(
                &actor,
                UpdateBookingStatusRequest {
                    booking_id: created.id,
                    status: BookingStatus::Confirmed,
                },
            )
            .await
            .expect_err("cancelled is terminal");
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn responding_without_pending_reschedule_conflicts(harness: Harness) {
        let actor = UserId::random();
        let created = harness
            .service
            .create_booking(&actor, create_request(&harness.mentor_id))
            .await
            .expect("booking created");
        harness
            .service
            .update_status(
                &harness.mentor_id,
                UpdateBookingStatusRequest {
                    booking_id: created.id,
                    status: BookingStatus::Confirmed,
                },
            )
            .await
            .expect("booking confirmed");

        let err = harness
            .service
            .respond_reschedule(
                &harness.mentor_id,
                RespondRescheduleRequest {
                    booking_id: created.id,
                    decision: RescheduleDecision::Reject,
                },
            )
            .await
            .expect_err("nothing pending");
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn connection_failures_surface_as_service_unavailable() {
        struct DownBookings;

        #[async_trait]
        impl BookingRepository for DownBookings {
            async fn insert(&self, _booking: &Booking) -> Result<(), BookingRepositoryError> {
                Err(BookingRepositoryError::connection("refused"))
            }

            async fn update(&self, _booking: &Booking) -> Result<(), BookingRepositoryError> {
                Err(BookingRepositoryError::connection("refused"))
            }

            async fn find_by_id(
                &self,
                _booking_id: &Uuid,
            ) -> Result<Option<Booking>, BookingRepositoryError> {
                Err(BookingRepositoryError::connection("refused"))
            }

            async fn list_for_user(
                &self,
                _user_id: &UserId,
            ) -> Result<Vec<Booking>, BookingRepositoryError> {
                Err(BookingRepositoryError::connection("refused"))
            }
        }

        let service = BookingService::new(
            Arc::new(DownBookings),
            Arc::new(FixtureUserRepository),
            Arc::new(FixtureWalletRepository),
            Arc::new(RecordingNotifications::default()),
        );
        let err = service
            .list_bookings(&UserId::random())
            .await
            .expect_err("storage down");
        assert_eq!(err.code, ErrorCode::ServiceUnavailable);
    }
}
