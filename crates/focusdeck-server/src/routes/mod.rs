//! API route handlers for the focusdeck server.

pub mod analytics;
pub mod dashboard;
pub mod health;
pub mod sessions;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::Router;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the calling user's identity. Authn/authz is expected
/// to happen upstream; this service only scopes data by the given id.
const USER_ID_HEADER: &str = "x-user-id";

/// Extract the calling user from the request headers.
pub(crate) fn user_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| ApiError::BadRequest(format!("missing {USER_ID_HEADER} header")))
}

/// Create the combined API router with all routes under /api prefix.
///
/// Routes:
/// - GET    /api/health - Health check
/// - POST   /api/sessions - Start a session
/// - GET    /api/sessions/{id} - Fetch one session with live elapsed time
/// - PATCH  /api/sessions/{id}/pause - Pause a running session
/// - PATCH  /api/sessions/{id}/resume - Resume a paused session
/// - PATCH  /api/sessions/{id}/complete - Complete with an outcome
/// - PATCH  /api/sessions/{id}/cancel - Cancel with an optional reason
/// - PATCH  /api/sessions/{id}/ratings - Late ratings on a terminal session
/// - POST   /api/sessions/{id}/distractions - Record a distraction
/// - GET    /api/dashboard - Aggregate productivity dashboard
/// - GET    /api/analytics - Day-bucketed metric trends
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", sessions::router())
        .nest("/api", dashboard::router())
        .nest("/api", analytics::router())
        .with_state(state)
}
