//! Error types for the booking core.

use thiserror::Error;

/// Failures of the storage backend itself.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite returned an error
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A previous panic poisoned the connection lock
    #[error("database connection lock poisoned")]
    Poisoned,

    /// A stored row could not be turned into a domain value
    #[error("corrupt row: {message}")]
    Corrupt { message: String },

    /// Backend refused or could not complete the write
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

/// How an error should be treated by callers and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or wrong caller; nothing happened.
    Validation,
    /// Expected business refusal; nothing happened.
    Policy,
    /// Storage failure; any partial effect was rolled back.
    Infrastructure,
    /// Storage failure whose rollback also failed; needs manual reconciliation.
    Compensation,
}

/// Errors returned by the balance ledger, slot registry and booking workflow.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("profile not found")]
    ProfileNotFound,

    #[error("no lessons remaining")]
    InsufficientBalance,

    #[error("slot not found")]
    SlotNotFound,

    #[error("slot is already booked")]
    SlotAlreadyBooked,

    /// The caller does not hold the booking
    #[error("slot is not booked by this student")]
    NotOwner,

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("email {0} is already registered")]
    EmailTaken(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Returning a lesson failed, so the slot was left untouched
    #[error("failed to return lesson: {0}")]
    RefundFailed(#[source] Box<BookingError>),

    /// A write failed after an earlier write succeeded, and undoing the
    /// earlier write failed too.
    #[error("compensation failed after `{original}`: {compensation}")]
    CompensationFailed {
        original: Box<BookingError>,
        compensation: Box<BookingError>,
    },
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::ProfileNotFound
            | BookingError::SlotNotFound
            | BookingError::NotOwner
            | BookingError::InvalidStatus(_)
            | BookingError::EmailTaken(_) => ErrorKind::Validation,
            BookingError::InsufficientBalance | BookingError::SlotAlreadyBooked => {
                ErrorKind::Policy
            }
            BookingError::Store(_) | BookingError::RefundFailed(_) => ErrorKind::Infrastructure,
            BookingError::CompensationFailed { .. } => ErrorKind::Compensation,
        }
    }

    /// Returns true if the slot and balance may disagree and need a human.
    pub fn needs_reconciliation(&self) -> bool {
        self.kind() == ErrorKind::Compensation
    }

    pub(crate) fn compensation_failed(original: BookingError, compensation: BookingError) -> Self {
        BookingError::CompensationFailed {
            original: Box::new(original),
            compensation: Box::new(compensation),
        }
    }
}

impl From<std::sync::PoisonError<std::sync::MutexGuard<'_, rusqlite::Connection>>> for StoreError {
    fn from(_: std::sync::PoisonError<std::sync::MutexGuard<'_, rusqlite::Connection>>) -> Self {
        StoreError::Poisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(BookingError::InsufficientBalance.kind(), ErrorKind::Policy);
        assert_eq!(BookingError::NotOwner.kind(), ErrorKind::Validation);
        let store = BookingError::Store(StoreError::Poisoned);
        assert_eq!(store.kind(), ErrorKind::Infrastructure);
        assert!(!store.needs_reconciliation());

        let failed = BookingError::compensation_failed(
            BookingError::Store(StoreError::Poisoned),
            BookingError::SlotAlreadyBooked,
        );
        assert!(failed.needs_reconciliation());
        assert!(failed.to_string().contains("compensation failed"));
    }
}
