//! Booking workflow: book, cancel, journal outcomes and slot deletion.
//!
//! Each step is an independent write against the ledger or the registry.
//! There is no transaction spanning steps, so when a later write fails the
//! workflow issues a compensating write for the earlier one. If that also
//! fails the caller gets `BookingError::CompensationFailed`, and the event is
//! logged with `reconcile = true`.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use super::error::BookingError;
use super::ledger::BalanceLedger;
use super::registry::SlotRegistry;
use super::types::{
    BookOutcome, CancelOutcome, DeleteOutcome, SlotId, SlotStatus, StatusOutcome, StudentId,
};
use crate::notify::{BookingNotice, Dispatcher};

/// Default minimum lead time for a refunded student cancellation.
pub const DEFAULT_CANCELLATION_WINDOW_HOURS: i64 = 24;

/// How far ahead of a lesson a student must cancel to get the lesson back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancellationPolicy {
    window: Duration,
}

impl CancellationPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn from_hours(hours: i64) -> Self {
        Self::new(Duration::hours(hours))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// True when `now` is at least the window ahead of `start`. The boundary
    /// itself qualifies.
    pub fn refunds(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        start - now >= self.window
    }
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self::from_hours(DEFAULT_CANCELLATION_WINDOW_HOURS)
    }
}

/// Coordinates the slot registry and the balance ledger.
pub struct BookingWorkflow<S> {
    store: S,
    dispatcher: Dispatcher,
    policy: CancellationPolicy,
}

impl<S> BookingWorkflow<S>
where
    S: BalanceLedger + SlotRegistry,
{
    pub fn new(store: S, dispatcher: Dispatcher, policy: CancellationPolicy) -> Self {
        Self {
            store,
            dispatcher,
            policy,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> CancellationPolicy {
        self.policy
    }

    pub fn notifications_enabled(&self) -> bool {
        self.dispatcher.is_enabled()
    }

    /// Books `slot` for `student`, taking one lesson from their balance.
    ///
    /// Order: check balance, check slot, reserve slot, decrement. A failed
    /// reservation leaves nothing to undo; a failed decrement releases the
    /// slot again.
    pub fn book(&self, student: &StudentId, slot: &SlotId) -> Result<BookOutcome, BookingError> {
        let profile = self
            .store
            .profile(student)?
            .ok_or(BookingError::ProfileNotFound)?;
        if profile.balance == 0 {
            debug!("Student {} has no lessons left", student);
            return Err(BookingError::InsufficientBalance);
        }

        self.store.get_available(slot)?;
        let booked = self.store.book(slot, student)?;

        let lessons_remaining = match self.store.decrement(student) {
            Ok(remaining) => remaining,
            Err(e) => {
                warn!("Decrement failed for {} after booking {}: {}", student, slot, e);
                return Err(self.compensate(e, student, slot, |store| {
                    store.unbook(slot, student)
                }));
            }
        };

        info!(
            "Student {} booked slot {} ({} lessons remaining)",
            student, slot, lessons_remaining
        );

        self.dispatcher.dispatch(BookingNotice {
            student_email: profile.email.clone(),
            student_name: profile.display_name.clone(),
            start_time: booked.start_time,
        });

        Ok(BookOutcome {
            slot: booked,
            lessons_remaining,
        })
    }

    /// Cancels a booking held by `student`, using the current time.
    pub fn cancel_by_student(
        &self,
        student: &StudentId,
        slot: &SlotId,
    ) -> Result<CancelOutcome, BookingError> {
        self.cancel_by_student_at(student, slot, Utc::now())
    }

    /// Cancels a booking held by `student` as of `now`.
    ///
    /// The slot is always released. The lesson comes back only when `now` is
    /// at least the cancellation window ahead of the lesson start.
    pub fn cancel_by_student_at(
        &self,
        student: &StudentId,
        slot: &SlotId,
        now: DateTime<Utc>,
    ) -> Result<CancelOutcome, BookingError> {
        let snapshot = self.store.get(slot)?.ok_or(BookingError::SlotNotFound)?;
        if snapshot.student_id.as_ref() != Some(student) {
            return Err(BookingError::NotOwner);
        }

        let refund = self.policy.refunds(snapshot.start_time, now);
        self.store.release(slot, student, SlotStatus::CanceledStudent)?;

        if refund {
            if let Err(e) = self.store.increment(student) {
                warn!("Refund failed for {} after cancelling {}: {}", student, slot, e);
                return Err(self.compensate(e, student, slot, |store| store.rebook(&snapshot)));
            }
        }

        info!(
            "Student {} cancelled slot {} (lesson returned: {})",
            student, slot, refund
        );
        Ok(CancelOutcome {
            lesson_returned: refund,
        })
    }

    /// Teacher-initiated cancellation. The assigned student, if any, always
    /// gets the lesson back and the slot becomes bookable again, whatever
    /// status the slot had before.
    pub fn cancel_by_teacher(&self, slot: &SlotId) -> Result<StatusOutcome, BookingError> {
        let previous = self.store.set_status(slot, SlotStatus::CanceledTeacher)?;
        let Some(student) = previous.student_id.clone() else {
            info!("Teacher cancelled unbooked slot {}", slot);
            return Ok(StatusOutcome {
                status: SlotStatus::CanceledTeacher,
                refunded: None,
            });
        };

        if let Err(e) = self.store.increment(&student) {
            warn!("Refund failed for {} after teacher cancelled {}: {}", student, slot, e);
            return Err(self.compensate(e, &student, slot, |store| store.rebook(&previous)));
        }

        info!("Teacher cancelled slot {}, lesson returned to {}", slot, student);
        Ok(StatusOutcome {
            status: SlotStatus::CanceledTeacher,
            refunded: Some(student),
        })
    }

    /// Records a journal outcome. Neither outcome returns a lesson.
    pub fn mark_outcome(
        &self,
        slot: &SlotId,
        status: SlotStatus,
    ) -> Result<StatusOutcome, BookingError> {
        if !status.is_outcome() {
            return Err(BookingError::InvalidStatus(status.to_string()));
        }
        self.store.set_status(slot, status)?;
        info!("Slot {} marked {}", slot, status);
        Ok(StatusOutcome {
            status,
            refunded: None,
        })
    }

    /// Admin status change: dispatches to `cancel_by_teacher` or `mark_outcome`.
    pub fn change_status(
        &self,
        slot: &SlotId,
        status: SlotStatus,
    ) -> Result<StatusOutcome, BookingError> {
        match status {
            SlotStatus::CanceledTeacher => self.cancel_by_teacher(slot),
            SlotStatus::Completed | SlotStatus::Missed => self.mark_outcome(slot, status),
            other => Err(BookingError::InvalidStatus(other.to_string())),
        }
    }

    /// Deletes a slot, returning the lesson first if it was booked.
    ///
    /// A failed refund stops the deletion, so the slot row survives.
    pub fn delete_slot(&self, slot: &SlotId) -> Result<DeleteOutcome, BookingError> {
        let current = self.store.get(slot)?.ok_or(BookingError::SlotNotFound)?;

        let refunded = match current.student_id.filter(|_| current.is_booked) {
            Some(student) => {
                self.store.increment(&student).map_err(|e| {
                    error!("Refund failed for {} before deleting {}: {}", student, slot, e);
                    BookingError::RefundFailed(Box::new(e))
                })?;
                Some(student)
            }
            None => None,
        };

        if let Err(e) = self.store.delete(slot) {
            warn!("Deleting slot {} failed: {}", slot, e);
            if let Some(student) = &refunded {
                return Err(self.compensate(e, student, slot, |store| {
                    store.decrement(student).map(|_| ())
                }));
            }
            return Err(e);
        }

        info!("Deleted slot {} (refunded: {:?})", slot, refunded);
        Ok(DeleteOutcome { refunded })
    }

    /// Runs `undo` after `original` failed mid-sequence. Returns the error to
    /// hand back to the caller.
    fn compensate<F>(
        &self,
        original: BookingError,
        student: &StudentId,
        slot: &SlotId,
        undo: F,
    ) -> BookingError
    where
        F: FnOnce(&S) -> Result<(), BookingError>,
    {
        match undo(&self.store) {
            Ok(()) => {
                info!("Rolled back partial change to slot {} for {}", slot, student);
                original
            }
            Err(compensation) => {
                error!(
                    reconcile = true,
                    slot = %slot,
                    student = %student,
                    "Compensation failed after `{}`: {}",
                    original,
                    compensation
                );
                BookingError::compensation_failed(original, compensation)
            }
        }
    }
}
