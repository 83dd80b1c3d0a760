//! Slot management for staff: deletion, status changes, journal listing and
//! bulk generation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::booking::schedule::SlotTemplate;
use crate::booking::{SlotId, SlotRegistry, SlotStatus};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Days around now covered by `GET /slots` when no range is given.
const DEFAULT_JOURNAL_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlotRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// DELETE /slots/:id
/// Deletes a slot, returning the lesson to its student first if booked
pub async fn delete_slot(
    Path(slot_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("DELETE /slots/{}", slot_id);

    match s.workflow.delete_slot(&SlotId::from(slot_id)) {
        Ok(outcome) => {
            let message = if outcome.refunded.is_some() {
                "Slot deleted, lesson returned to student"
            } else {
                "Slot deleted"
            };
            (
                StatusCode::OK,
                Json(json!({ "success": true, "message": message })),
            )
                .into_response()
        }
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// PATCH /slots/:id/status
/// Records completed/missed, or cancels the lesson on the teacher's side
pub async fn patch_slot_status(
    Path(slot_id): Path<String>,
    State(s): State<Arc<AppState>>,
    payload: Option<Json<StatusRequest>>,
) -> Response {
    info!("PATCH /slots/{}/status", slot_id);

    let status = payload
        .and_then(|Json(body)| body.status)
        .and_then(|status| status.parse::<SlotStatus>().ok())
        .filter(|status| !matches!(status, SlotStatus::Scheduled | SlotStatus::CanceledStudent));
    let Some(status) = status else {
        return ApiErrorType::from((
            StatusCode::BAD_REQUEST,
            "status must be one of completed, missed, canceled_teacher",
        ))
        .into_response();
    };

    match s.workflow.change_status(&SlotId::from(slot_id), status) {
        Ok(outcome) => {
            let message = match (outcome.status, &outcome.refunded) {
                (SlotStatus::CanceledTeacher, Some(_)) => {
                    "Lesson cancelled, lesson returned to student"
                }
                (SlotStatus::CanceledTeacher, None) => "Lesson cancelled",
                _ => "Status updated",
            };
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": message,
                    "status": outcome.status,
                })),
            )
                .into_response()
        }
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// GET /slots?from=..&to=..
/// Lists every slot in the range, booked or not, earliest first
pub async fn get_slots(
    State(s): State<Arc<AppState>>,
    Query(range): Query<SlotRange>,
) -> Response {
    let now = Utc::now();
    let from = range
        .from
        .unwrap_or(now - Duration::days(DEFAULT_JOURNAL_DAYS));
    let to = range.to.unwrap_or(now + Duration::days(DEFAULT_JOURNAL_DAYS));
    info!("GET /slots (from={}, to={})", from, to);

    if to < from {
        return ApiErrorType::from((StatusCode::BAD_REQUEST, "`to` must not be before `from`"))
            .into_response();
    }

    match s.store.slots_between(from, to, false) {
        Ok(slots) => {
            let count = slots.len();
            (
                StatusCode::OK,
                Json(json!({ "slots": slots, "count": count })),
            )
                .into_response()
        }
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// POST /slots/generate
/// Creates slots from a weekly template; start times that already exist are skipped
pub async fn post_generate_slots(
    State(s): State<Arc<AppState>>,
    Json(template): Json<SlotTemplate>,
) -> Response {
    info!(
        "POST /slots/generate ({} to {})",
        template.start_date, template.end_date
    );

    let planned = match template.expand(s.config.utc_offset) {
        Ok(planned) => planned,
        Err(e) => {
            warn!("Rejected slot template: {}", e);
            return ApiErrorType::from((StatusCode::BAD_REQUEST, e.to_string().as_str()))
                .into_response();
        }
    };

    match s.store.insert_slots(&planned) {
        Ok(created) => {
            let skipped = planned.len().saturating_sub(created);
            info!("Generated {} slots ({} already existed)", created, skipped);
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "created": created,
                    "skipped": skipped,
                })),
            )
                .into_response()
        }
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}
