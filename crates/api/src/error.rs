//! HTTP error mapping for engine failures.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cpmm_domain::AmmError;
use serde::Serialize;
use thiserror::Error;

/// API-level error, carrying enough to build an HTTP response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body or parameters were malformed.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// An engine operation failed.
    #[error(transparent)]
    Engine(#[from] AmmError),
}

/// JSON body returned with every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable error code.
    pub error: &'static str,
    /// Human-readable detail.
    pub message: String,
    /// Whether retrying the same request may succeed.
    pub retryable: bool,
}

impl ApiError {
    /// Maps the error onto an HTTP status and stable code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::Engine(e) => match e {
                AmmError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
                AmmError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                AmmError::DuplicatePair => (StatusCode::CONFLICT, "duplicate_pair"),
                AmmError::SlippageExceeded { .. } => (StatusCode::CONFLICT, "slippage_exceeded"),
                AmmError::ConcurrencyConflict => {
                    (StatusCode::SERVICE_UNAVAILABLE, "concurrency_conflict")
                }
                AmmError::InsufficientLiquidity => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_liquidity")
                }
                AmmError::InsufficientShares { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_shares")
                }
                AmmError::Overflow(_) => (StatusCode::UNPROCESSABLE_ENTITY, "overflow"),
                AmmError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_code();
        let retryable = match &self {
            Self::BadRequest(_) => false,
            Self::Engine(e) => e.is_retryable(),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = ErrorBody {
            error,
            message: self.to_string(),
            retryable,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_stable_codes() {
        let (status, code) = ApiError::Engine(AmmError::DuplicatePair).status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "duplicate_pair");

        let (status, _) = ApiError::Engine(AmmError::ConcurrencyConflict).status_and_code();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = ApiError::BadRequest("nope".into()).status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
