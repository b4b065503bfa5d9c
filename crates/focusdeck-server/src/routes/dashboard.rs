//! Aggregate dashboard endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use focusdeck_core::{AnalyticsAggregator, Dashboard};

use super::user_id;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/dashboard - Point-in-time productivity overview.
///
/// A user with no history gets the all-zero default, never an error.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Dashboard>> {
    let user = user_id(&headers)?;
    let engine = state.engine.lock().await;
    let dashboard = AnalyticsAggregator::new(engine.db()).dashboard(&user, Utc::now())?;
    Ok(Json(dashboard))
}

/// Create the dashboard routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(get_dashboard))
}
