//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use focusdeck_core::EngineError;

/// Structured JSON error response for API errors.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    /// Stable machine-readable code (e.g. `conflict`, `invalid_state`).
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// API error types that map to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Engine(err) => {
                let status = match err {
                    EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
                    EngineError::Conflict(_) | EngineError::InvalidState { .. } => {
                        StatusCode::CONFLICT
                    }
                    EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                    EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
                    EngineError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                match err {
                    // Storage details stay server-side; the client only
                    // learns the service is unhealthy.
                    EngineError::Storage(source) => {
                        tracing::error!(error = %source, "storage failure");
                        (
                            status,
                            ErrorResponse {
                                error: "storage unavailable".into(),
                                code: err.code().into(),
                                details: None,
                            },
                        )
                    }
                    _ => {
                        tracing::warn!(error = %err, code = err.code(), "request rejected");
                        (
                            status,
                            ErrorResponse {
                                error: err.to_string(),
                                code: err.code().into(),
                                details: None,
                            },
                        )
                    }
                }
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "bad request".into(),
                        code: "bad_request".into(),
                        details: Some(msg.clone()),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use focusdeck_core::SessionState;

    async fn extract(response: Response) -> (StatusCode, ErrorResponse) {
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let err = ApiError::Engine(EngineError::NotFound("abc".into()));
        let (status, body) = extract(err.into_response()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "not_found");
        assert!(body.error.contains("abc"));
    }

    #[tokio::test]
    async fn conflict_and_invalid_state_map_to_409() {
        let err = ApiError::Engine(EngineError::Conflict("busy".into()));
        let (status, body) = extract(err.into_response()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "conflict");

        let err = ApiError::Engine(EngineError::InvalidState {
            session_id: "s1".into(),
            state: SessionState::Completed,
        });
        let (status, body) = extract(err.into_response()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "invalid_state");
    }

    #[tokio::test]
    async fn forbidden_maps_to_403() {
        let err = ApiError::Engine(EngineError::Forbidden("s1".into()));
        let (status, body) = extract(err.into_response()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.code, "forbidden");
    }

    #[tokio::test]
    async fn validation_maps_to_400() {
        let err = ApiError::Engine(EngineError::Validation {
            field: "impact_level",
            message: "must be between 1 and 5, got 9".into(),
        });
        let (status, body) = extract(err.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "validation_error");
        assert!(body.error.contains("impact_level"));
    }

    #[tokio::test]
    async fn bad_request_carries_details() {
        let err = ApiError::BadRequest("missing x-user-id header".into());
        let (status, body) = extract(err.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.details.unwrap(), "missing x-user-id header");
    }
}
