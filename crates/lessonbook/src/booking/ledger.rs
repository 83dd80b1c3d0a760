//! Balance ledger: each profile's count of unused lesson credits.

use std::sync::Arc;

use super::error::BookingError;
use super::types::{Profile, StudentId};

/// Holds and mutates lesson balances.
///
/// Every method is one independent write against the store; nothing here
/// spans more than one row.
pub trait BalanceLedger {
    /// Looks up the profile that owns the balance.
    fn profile(&self, student: &StudentId) -> Result<Option<Profile>, BookingError>;

    /// Takes one lesson. Fails with `InsufficientBalance` instead of going
    /// below zero. Returns the new balance.
    fn decrement(&self, student: &StudentId) -> Result<u32, BookingError>;

    /// Adds `lessons` to the balance. Returns the new balance.
    fn increment_by(&self, student: &StudentId, lessons: u32) -> Result<u32, BookingError>;

    /// Current balance.
    fn read(&self, student: &StudentId) -> Result<u32, BookingError> {
        self.profile(student)?
            .map(|p| p.balance)
            .ok_or(BookingError::ProfileNotFound)
    }

    /// Returns one lesson.
    fn increment(&self, student: &StudentId) -> Result<u32, BookingError> {
        self.increment_by(student, 1)
    }
}

impl<T: BalanceLedger + ?Sized> BalanceLedger for Arc<T> {
    fn profile(&self, student: &StudentId) -> Result<Option<Profile>, BookingError> {
        (**self).profile(student)
    }

    fn decrement(&self, student: &StudentId) -> Result<u32, BookingError> {
        (**self).decrement(student)
    }

    fn increment_by(&self, student: &StudentId, lessons: u32) -> Result<u32, BookingError> {
        (**self).increment_by(student, lessons)
    }
}
