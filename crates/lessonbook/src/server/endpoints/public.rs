use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::booking::SlotRegistry;
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// GET /public/slots
/// Open slots starting within the public horizon, earliest first. No
/// student data is exposed.
pub async fn get_public_slots(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /public/slots");

    let now = Utc::now();
    let horizon = now + Duration::days(s.config.public_horizon_days);

    match s.store.slots_between(now, horizon, true) {
        Ok(slots) => {
            let slots: Vec<_> = slots
                .into_iter()
                .map(|slot| {
                    json!({
                        "id": slot.id,
                        "datetime": slot.start_time,
                        "endTime": slot.end_time,
                    })
                })
                .collect();
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
