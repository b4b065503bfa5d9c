//! Focusdeck server library.
//!
//! Axum-based HTTP surface over the focusdeck-core session engine. The
//! API exposes session lifecycle operations, the distraction ledger, and
//! productivity analytics under `/api`.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::api_routes;
pub use state::AppState;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use focusdeck_core::SessionEngine;

/// Create the Axum application with all routes and middleware.
///
/// Sets up the API routes, permissive CORS for local development, and
/// request tracing.
pub fn create_app(engine: SessionEngine) -> Router {
    let state = AppState::new(engine);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================
