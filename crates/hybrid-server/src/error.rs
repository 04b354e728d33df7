//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use hybrid_engine::{CatalogError, EngineError};

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "NOT_READY").
    pub code: String,
    pub message: String,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Script or catalog entry not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Engine not initialized or failed to initialize (503).
    #[error("engine unavailable: {0}")]
    NotReady(String),

    /// The marketplace could not be reached (502).
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    /// Script source was rejected by the runtime (500).
    #[error("script error: {0}")]
    ScriptError(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotReady(_) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_READY"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE"),
            ApiError::ScriptError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SCRIPT_ERROR"),
            ApiError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::NotReady(msg)
            | ApiError::Upstream(msg)
            | ApiError::ScriptError(msg)
            | ApiError::InternalError(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code, error = %self, "request failed");
        }

        let body = serde_json::json!({
            "success": false,
            "error": ApiErrorDetail {
                code: code.to_string(),
                message: self.message().to_string(),
            },
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::NotInitialized | EngineError::InitFailed(_) => {
                ApiError::NotReady(err.to_string())
            }
            EngineError::InvalidScript(_) => ApiError::BadRequest(err.to_string()),
            EngineError::ScriptNotFound(_) | EngineError::Catalog(CatalogError::NotFound(_)) => {
                ApiError::NotFound(err.to_string())
            }
            EngineError::Catalog(CatalogError::Unavailable(_)) => {
                ApiError::Upstream(err.to_string())
            }
            EngineError::Script(_) => ApiError::ScriptError(err.to_string()),
            EngineError::Storage(_) | EngineError::Runtime(_) | EngineError::MalformedResult(_) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybrid_core::ScriptId;

    #[test]
    fn engine_errors_map_to_statuses() {
        let cases = [
            (EngineError::NotInitialized, StatusCode::SERVICE_UNAVAILABLE),
            (EngineError::InitFailed("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (EngineError::InvalidScript("x".into()), StatusCode::BAD_REQUEST),
            (
                EngineError::ScriptNotFound(ScriptId::new("a").unwrap()),
                StatusCode::NOT_FOUND,
            ),
            (
                EngineError::Catalog(CatalogError::NotFound("a".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                EngineError::Catalog(CatalogError::Unavailable("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (EngineError::Script("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                EngineError::MalformedResult("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
