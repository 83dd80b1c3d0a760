use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, info};

use crate::booking::{BookingError, ErrorKind};

/// Error code attached to responses whose partial effect could not be undone.
pub const RECONCILIATION_REQUIRED: &str = "reconciliation_required";

/// The JSON error body: `{ "error": ... }`, plus an optional machine-readable code.
#[derive(Debug, Serialize)]
pub struct ApiErrorType {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ApiErrorType {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, error, code): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            error: error.to_string(),
            code,
        }
    }
}

impl From<(StatusCode, &str)> for ApiErrorType {
    fn from((status, error): (StatusCode, &str)) -> Self {
        Self::from((status, error, None))
    }
}

impl From<BookingError> for ApiErrorType {
    fn from(e: BookingError) -> Self {
        match e.kind() {
            ErrorKind::Validation | ErrorKind::Policy => info!("Request refused: {}", e),
            ErrorKind::Infrastructure => error!("Storage failure: {}", e),
            // Already logged with `reconcile = true` where it happened
            ErrorKind::Compensation => {}
        }

        let (status, message) = match &e {
            BookingError::InsufficientBalance => (
                StatusCode::BAD_REQUEST,
                "No lessons remaining. Please purchase more lessons.",
            ),
            BookingError::SlotAlreadyBooked => (StatusCode::BAD_REQUEST, "Slot is already booked"),
            BookingError::SlotNotFound => (StatusCode::NOT_FOUND, "Slot not found"),
            BookingError::ProfileNotFound => (StatusCode::NOT_FOUND, "Profile not found"),
            BookingError::NotOwner => (StatusCode::FORBIDDEN, "Not your booking"),
            BookingError::InvalidStatus(_) => (StatusCode::BAD_REQUEST, "Invalid status"),
            BookingError::EmailTaken(_) => (StatusCode::BAD_REQUEST, "Email is already registered"),
            BookingError::RefundFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to return lesson, slot was not deleted",
            ),
            BookingError::Store(_) | BookingError::CompensationFailed { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let code = e
            .needs_reconciliation()
            .then(|| RECONCILIATION_REQUIRED.to_string());
        Self::from((status, message, code))
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::StoreError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (BookingError::InsufficientBalance, StatusCode::BAD_REQUEST),
            (BookingError::SlotAlreadyBooked, StatusCode::BAD_REQUEST),
            (BookingError::SlotNotFound, StatusCode::NOT_FOUND),
            (BookingError::NotOwner, StatusCode::FORBIDDEN),
            (
                BookingError::Store(StoreError::Poisoned),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (e, status) in cases {
            assert_eq!(ApiErrorType::from(e).status(), status);
        }
    }

    #[test]
    fn test_compensation_failure_carries_code() {
        let e = BookingError::compensation_failed(
            BookingError::Store(StoreError::Poisoned),
            BookingError::Store(StoreError::Poisoned),
        );
        let body = serde_json::to_value(ApiErrorType::from(e)).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], RECONCILIATION_REQUIRED);

        let plain = serde_json::to_value(ApiErrorType::from(BookingError::SlotNotFound)).unwrap();
        assert_eq!(plain, serde_json::json!({ "error": "Slot not found" }));
    }
}
