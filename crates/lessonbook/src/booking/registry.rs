//! Slot registry: authoritative booked state and lifecycle status of every slot.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::error::BookingError;
use super::types::{NewSlot, Slot, SlotId, SlotStatus, StudentId};

/// Holds the set of bookable slots.
///
/// Implementations must make `book` a compare-and-set on `is_booked = false`:
/// of two concurrent calls for the same slot exactly one succeeds.
pub trait SlotRegistry {
    fn get(&self, slot: &SlotId) -> Result<Option<Slot>, BookingError>;

    /// Reserves the slot for `student` and marks it scheduled.
    fn book(&self, slot: &SlotId, student: &StudentId) -> Result<Slot, BookingError>;

    /// Undoes a `book` that was not followed by a balance decrement. Only
    /// touches the slot while `student` still holds it; leaves status unset.
    fn unbook(&self, slot: &SlotId, student: &StudentId) -> Result<(), BookingError>;

    /// Puts a released booking back exactly as captured in `snapshot`, as long
    /// as nobody booked the slot in between.
    fn rebook(&self, snapshot: &Slot) -> Result<(), BookingError>;

    /// Clears `student`'s booking and records a cancellation status.
    ///
    /// Conditional on `student` still holding the slot, so of two overlapping
    /// releases only one takes effect; the other gets `NotOwner`.
    fn release(
        &self,
        slot: &SlotId,
        student: &StudentId,
        status: SlotStatus,
    ) -> Result<(), BookingError>;

    /// Sets the lifecycle status. `CanceledTeacher` also clears the booking.
    /// Returns the slot as it was before the change.
    fn set_status(&self, slot: &SlotId, status: SlotStatus) -> Result<Slot, BookingError>;

    /// Removes the slot. Any refund must already have happened.
    fn delete(&self, slot: &SlotId) -> Result<(), BookingError>;

    /// Slots held by `student`, earliest first.
    fn slots_for_student(&self, student: &StudentId) -> Result<Vec<Slot>, BookingError>;

    /// Slots starting in `[from, to]`, earliest first.
    fn slots_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        only_open: bool,
    ) -> Result<Vec<Slot>, BookingError>;

    /// Inserts new unbooked slots, skipping any whose start time already exists.
    /// Returns how many were inserted.
    fn insert_slots(&self, slots: &[NewSlot]) -> Result<usize, BookingError>;

    /// Returns the slot if it exists and nobody holds it.
    fn get_available(&self, slot: &SlotId) -> Result<Slot, BookingError> {
        match self.get(slot)? {
            None => Err(BookingError::SlotNotFound),
            Some(s) if s.is_booked => Err(BookingError::SlotAlreadyBooked),
            Some(s) => Ok(s),
        }
    }
}

impl<T: SlotRegistry + ?Sized> SlotRegistry for Arc<T> {
    fn get(&self, slot: &SlotId) -> Result<Option<Slot>, BookingError> {
        (**self).get(slot)
    }

    fn book(&self, slot: &SlotId, student: &StudentId) -> Result<Slot, BookingError> {
        (**self).book(slot, student)
    }

    fn unbook(&self, slot: &SlotId, student: &StudentId) -> Result<(), BookingError> {
        (**self).unbook(slot, student)
    }

    fn rebook(&self, snapshot: &Slot) -> Result<(), BookingError> {
        (**self).rebook(snapshot)
    }

    fn release(
        &self,
        slot: &SlotId,
        student: &StudentId,
        status: SlotStatus,
    ) -> Result<(), BookingError> {
        (**self).release(slot, student, status)
    }

    fn set_status(&self, slot: &SlotId, status: SlotStatus) -> Result<Slot, BookingError> {
        (**self).set_status(slot, status)
    }

    fn delete(&self, slot: &SlotId) -> Result<(), BookingError> {
        (**self).delete(slot)
    }

    fn slots_for_student(&self, student: &StudentId) -> Result<Vec<Slot>, BookingError> {
        (**self).slots_for_student(student)
    }

    fn slots_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        only_open: bool,
    ) -> Result<Vec<Slot>, BookingError> {
        (**self).slots_between(from, to, only_open)
    }

    fn insert_slots(&self, slots: &[NewSlot]) -> Result<usize, BookingError> {
        (**self).insert_slots(slots)
    }
}
