//! Metric trend endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use focusdeck_core::{AnalyticsAggregator, AnalyticsPeriod, MetricType, TrendPoint};

use super::user_id;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query parameters for GET /api/analytics.
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// Trailing window: `7d`, `30d`, or `90d`. Defaults to `30d`.
    #[serde(default)]
    pub period: Option<String>,
    /// Restrict to a single metric type (e.g. `focus_duration`).
    #[serde(default)]
    pub metric_type: Option<String>,
}

/// Response for the analytics endpoint.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub period: String,
    pub points: Vec<TrendPoint>,
}

/// GET /api/analytics - Per-day metric averages over a trailing window.
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<AnalyticsResponse>> {
    let user = user_id(&headers)?;

    let period_str = query.period.as_deref().unwrap_or("30d");
    let period = AnalyticsPeriod::parse(period_str).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "unknown period '{period_str}', expected 7d, 30d, or 90d"
        ))
    })?;
    let metric_type = query
        .metric_type
        .as_deref()
        .map(|s| {
            MetricType::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown metric type '{s}'")))
        })
        .transpose()?;

    let engine = state.engine.lock().await;
    let points =
        AnalyticsAggregator::new(engine.db()).metrics_over(&user, period, metric_type, Utc::now())?;
    Ok(Json(AnalyticsResponse {
        period: period_str.to_string(),
        points,
    }))
}

/// Create the analytics routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/analytics", get(get_analytics))
}
