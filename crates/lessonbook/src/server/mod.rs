use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::{middleware as mw, Router};

use crate::server::endpoints::{bookings, profiles, public, slots, status};
use crate::server::middleware::auth_validator::{require_admin, require_session, require_staff};
use crate::types::AppState;

mod endpoints;
mod middleware;
mod types;

pub use middleware::auth_validator::Caller;
pub use types::ApiErrorType;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Any signed-in profile
    let session_router = Router::new()
        .route("/profile", get(profiles::get_profile))
        .route(
            "/bookings",
            get(bookings::get_bookings)
                .post(bookings::post_booking)
                .delete(bookings::delete_booking),
        )
        .route_layer(mw::from_fn_with_state(app_state.clone(), require_session));

    // Admins and teachers
    let staff_router = Router::new()
        .route("/slots", get(slots::get_slots))
        .route("/slots/:id", delete(slots::delete_slot))
        .route_layer(mw::from_fn_with_state(app_state.clone(), require_staff));

    let admin_router = Router::new()
        .route("/slots/:id/status", patch(slots::patch_slot_status))
        .route("/slots/generate", post(slots::post_generate_slots))
        .route("/profiles", post(profiles::post_profile))
        .route("/profiles/:id/sessions", post(profiles::post_session))
        .route("/profiles/:id/credits", post(profiles::post_credits))
        .route_layer(mw::from_fn_with_state(app_state.clone(), require_admin));

    Router::new()
        .route("/health", get(status::get_health))
        .route("/public/slots", get(public::get_public_slots))
        .merge(session_router)
        .merge(staff_router)
        .merge(admin_router)
        .with_state(app_state)
}
