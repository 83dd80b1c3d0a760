//! Profile endpoints: the caller's own profile, and admin management of
//! profiles, sessions and lesson credits.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, LazyLock};
use tracing::info;

use crate::auth::IdentityStore;
use crate::booking::{BalanceLedger, Profile, Role, StudentId};
use crate::server::middleware::auth_validator::Caller;
use crate::server::types::ApiErrorType;
use crate::types::AppState;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfileRequest {
    pub email: String,
    pub display_name: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub balance: u32,
}

fn default_role() -> Role {
    Role::Student
}

#[derive(Debug, Deserialize)]
pub struct CreditRequest {
    pub lessons: u32,
}

/// GET /profile
/// Returns the caller's profile, including the lesson balance
pub async fn get_profile(Extension(Caller(caller)): Extension<Caller>) -> Response {
    info!("GET /profile");
    (StatusCode::OK, Json(caller)).into_response()
}

/// POST /profiles
/// Creates a profile and hands back its first session token
pub async fn post_profile(
    State(s): State<Arc<AppState>>,
    Json(request): Json<NewProfileRequest>,
) -> Response {
    info!("POST /profiles");

    let email = request.email.trim().to_lowercase();
    if !EMAIL_REGEX.is_match(&email) {
        return ApiErrorType::from((StatusCode::BAD_REQUEST, "Invalid email")).into_response();
    }

    let display_name = request
        .display_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    let mut profile = Profile::new(email, display_name, request.role);
    profile.balance = request.balance;

    let token = s
        .store
        .create_profile(&profile)
        .and_then(|()| s.store.issue_session(&profile.id));

    match token {
        Ok(token) => {
            info!("Created {} profile {}", profile.role.as_str(), profile.id);
            (
                StatusCode::CREATED,
                Json(json!({ "profile": profile, "token": token.as_str() })),
            )
                .into_response()
        }
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// POST /profiles/:id/sessions
/// Issues an additional session token for an existing profile
pub async fn post_session(
    Path(profile_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("POST /profiles/{}/sessions", profile_id);

    match s.store.issue_session(&StudentId::from(profile_id)) {
        Ok(token) => (
            StatusCode::CREATED,
            Json(json!({ "token": token.as_str() })),
        )
            .into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// POST /profiles/:id/credits
/// Adds purchased lessons to a balance
pub async fn post_credits(
    Path(profile_id): Path<String>,
    State(s): State<Arc<AppState>>,
    Json(request): Json<CreditRequest>,
) -> Response {
    info!("POST /profiles/{}/credits ({} lessons)", profile_id, request.lessons);

    if request.lessons == 0 {
        return ApiErrorType::from((StatusCode::BAD_REQUEST, "lessons must be positive"))
            .into_response();
    }

    let student = StudentId::from(profile_id);
    match s.store.increment_by(&student, request.lessons) {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({ "success": true, "balance": balance })),
        )
            .into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}
