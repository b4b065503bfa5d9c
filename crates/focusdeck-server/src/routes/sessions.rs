//! Session lifecycle endpoints.
//!
//! Every mutation delegates to the core engine under the state lock;
//! timestamps come from the server clock, never from the client.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use focusdeck_core::{
    CompletionOutcome, Distraction, DistractionDraft, RatingsUpdate, SessionPlan, SessionView,
};

use super::user_id;
use crate::error::ApiResult;
use crate::state::AppState;

/// Body for PATCH /api/sessions/{id}/cancel.
#[derive(Debug, Default, Deserialize)]
pub struct CancelBody {
    #[serde(default)]
    pub reason: Option<String>,
}

/// POST /api/sessions - Start a new session from a plan.
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(plan): Json<SessionPlan>,
) -> ApiResult<(StatusCode, Json<SessionView>)> {
    let user = user_id(&headers)?;
    let engine = state.engine.lock().await;
    let view = engine.start(&user, plan, Utc::now())?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/sessions/{id} - Fetch one session with recomputed elapsed time.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    let user = user_id(&headers)?;
    let engine = state.engine.lock().await;
    Ok(Json(engine.session(&id, &user, Utc::now())?))
}

/// PATCH /api/sessions/{id}/pause
pub async fn pause_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    let user = user_id(&headers)?;
    let engine = state.engine.lock().await;
    Ok(Json(engine.pause(&id, &user, Utc::now())?))
}

/// PATCH /api/sessions/{id}/resume
pub async fn resume_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    let user = user_id(&headers)?;
    let engine = state.engine.lock().await;
    Ok(Json(engine.resume(&id, &user, Utc::now())?))
}

/// PATCH /api/sessions/{id}/complete - Close the session successfully.
pub async fn complete_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(outcome): Json<CompletionOutcome>,
) -> ApiResult<Json<SessionView>> {
    let user = user_id(&headers)?;
    let engine = state.engine.lock().await;
    Ok(Json(engine.complete(&id, &user, outcome, Utc::now())?))
}

/// PATCH /api/sessions/{id}/cancel - Abandon the session.
pub async fn cancel_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<CancelBody>,
) -> ApiResult<Json<SessionView>> {
    let user = user_id(&headers)?;
    let engine = state.engine.lock().await;
    Ok(Json(engine.cancel(&id, &user, body.reason, Utc::now())?))
}

/// PATCH /api/sessions/{id}/ratings - Late subjective ratings.
pub async fn set_ratings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<RatingsUpdate>,
) -> ApiResult<Json<SessionView>> {
    let user = user_id(&headers)?;
    let engine = state.engine.lock().await;
    Ok(Json(engine.set_ratings(&id, &user, update, Utc::now())?))
}

/// POST /api/sessions/{id}/distractions - Append to the distraction ledger.
pub async fn record_distraction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(draft): Json<DistractionDraft>,
) -> ApiResult<(StatusCode, Json<Distraction>)> {
    let user = user_id(&headers)?;
    let engine = state.engine.lock().await;
    let distraction = engine.record_distraction(&id, &user, draft, Utc::now())?;
    Ok((StatusCode::CREATED, Json(distraction)))
}

/// Create the session routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/pause", patch(pause_session))
        .route("/sessions/{id}/resume", patch(resume_session))
        .route("/sessions/{id}/complete", patch(complete_session))
        .route("/sessions/{id}/cancel", patch(cancel_session))
        .route("/sessions/{id}/ratings", patch(set_ratings))
        .route("/sessions/{id}/distractions", post(record_distraction))
}
