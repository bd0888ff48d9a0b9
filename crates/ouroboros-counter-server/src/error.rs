//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ouroboros_counter::{CounterError, ErrorResponse};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Counter(#[from] CounterError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Counter(CounterError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
            ApiError::Counter(_) | ApiError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(status = status.as_u16(), "Request failed: {}", self);

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
