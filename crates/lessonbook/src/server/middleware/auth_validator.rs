//! Access guard: resolves the bearer token to a profile and checks its role.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::auth::{IdentityStore, TokenHash};
use crate::booking::{Profile, Role};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// The authenticated caller, inserted into request extensions by the guards.
#[derive(Debug, Clone)]
pub struct Caller(pub Profile);

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the caller and checks `allowed`, inserting `Caller` on success.
async fn guard(
    s: &AppState,
    mut req: Request,
    next: Next,
    allowed: impl Fn(Role) -> bool,
    denied: &str,
) -> Response {
    let Some(token) = bearer_token(&req) else {
        debug!("Rejecting {} {}: no bearer token", req.method(), req.uri());
        return ApiErrorType::from((StatusCode::UNAUTHORIZED, "Unauthorized")).into_response();
    };

    let hash = TokenHash::of(token);
    let profile = match s.store.profile_for_session(&hash) {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            debug!("Rejecting unknown session {}", hash);
            return ApiErrorType::from((StatusCode::UNAUTHORIZED, "Unauthorized")).into_response();
        }
        Err(e) => return ApiErrorType::from(e).into_response(),
    };

    if !allowed(profile.role) {
        warn!(
            "Profile {} ({}) denied {} {}",
            profile.id,
            profile.role.as_str(),
            req.method(),
            req.uri()
        );
        return ApiErrorType::from((StatusCode::FORBIDDEN, denied)).into_response();
    }

    req.extensions_mut().insert(Caller(profile));
    next.run(req).await
}

/// Any authenticated profile.
pub async fn require_session(State(s): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    guard(&s, req, next, |_| true, "Forbidden").await
}

/// Admins and teachers.
pub async fn require_staff(State(s): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    guard(&s, req, next, |role| role.is_staff(), "Staff access required").await
}

pub async fn require_admin(State(s): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    guard(&s, req, next, |role| role == Role::Admin, "Admin access required").await
}
