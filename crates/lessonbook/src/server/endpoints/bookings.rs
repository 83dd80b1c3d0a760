//! Student booking endpoints: book, cancel and list own bookings.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::booking::{SlotId, SlotRegistry};
use crate::server::middleware::auth_validator::Caller;
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Body of `POST /bookings` and `DELETE /bookings`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    pub slot_id: Option<String>,
}

fn slot_id(payload: Option<Json<SlotRequest>>) -> Result<SlotId, ApiErrorType> {
    payload
        .and_then(|Json(body)| body.slot_id)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .map(SlotId::from)
        .ok_or_else(|| ApiErrorType::from((StatusCode::BAD_REQUEST, "slotId is required")))
}

/// POST /bookings
/// Books a slot for the caller, spending one lesson
pub async fn post_booking(
    State(s): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
    payload: Option<Json<SlotRequest>>,
) -> Response {
    info!("POST /bookings");

    let slot = match slot_id(payload) {
        Ok(slot) => slot,
        Err(e) => return e.into_response(),
    };

    match s.workflow.book(&caller.id, &slot) {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Lesson booked successfully",
                "lessonsRemaining": outcome.lessons_remaining,
            })),
        )
            .into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// DELETE /bookings
/// Cancels the caller's booking; the lesson comes back only outside the
/// cancellation window
pub async fn delete_booking(
    State(s): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
    payload: Option<Json<SlotRequest>>,
) -> Response {
    info!("DELETE /bookings");

    let slot = match slot_id(payload) {
        Ok(slot) => slot,
        Err(e) => return e.into_response(),
    };

    match s.workflow.cancel_by_student(&caller.id, &slot) {
        Ok(outcome) => {
            let message = if outcome.lesson_returned {
                "Booking cancelled, lesson returned to your balance".to_string()
            } else {
                format!(
                    "Booking cancelled less than {} hours before the lesson, lesson not returned",
                    s.workflow.policy().window().num_hours()
                )
            };
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": message,
                    "lessonReturned": outcome.lesson_returned,
                })),
            )
                .into_response()
        }
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// GET /bookings
/// Returns the caller's slots, earliest first
pub async fn get_bookings(
    State(s): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
) -> Response {
    info!("GET /bookings");

    match s.store.slots_for_student(&caller.id) {
        Ok(bookings) => (StatusCode::OK, Json(json!({ "bookings": bookings }))).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}
