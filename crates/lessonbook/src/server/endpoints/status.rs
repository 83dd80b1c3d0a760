use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::IdentityStore;
use crate::types::AppState;

/// GET /health
/// Reports whether the store answers; 503 when it does not
pub async fn get_health(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /health");

    let database = match s.store.ping() {
        Ok(()) => "connected",
        Err(e) => {
            warn!("Health check could not reach the store: {}", e);
            "disconnected"
        }
    };
    let healthy = database == "connected";

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "healthy" } else { "degraded" },
            "timestamp": Utc::now(),
            "services": {
                "database": database,
                "notifications": if s.workflow.notifications_enabled() { "enabled" } else { "disabled" },
            },
        })),
    )
        .into_response()
}
