//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::types::SyncError;

/// Errors surfaced by the webhook endpoint
///
/// Anything mapped to 4xx/5xx makes the provider retry the delivery;
/// everything the reconciler handles (including drops and duplicates) is
/// acknowledged with 200 instead.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Signature rejected: {0}")]
    BadSignature(String),

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<SyncError> for ApiError {
    fn from(error: SyncError) -> Self {
        match error {
            SyncError::InvalidSignature { message } => ApiError::BadSignature(message),
            SyncError::MalformedEvent { message } => ApiError::Malformed(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadSignature(msg) => (StatusCode::BAD_REQUEST, "BAD_SIGNATURE", msg.clone()),
            ApiError::Malformed(msg) => (StatusCode::BAD_REQUEST, "MALFORMED_PAYLOAD", msg.clone()),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;
