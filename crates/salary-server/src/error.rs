//! Application error types and Axum response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    /// Caller sent an unusable request.
    BadRequest(String),
    /// A downstream call failed; the message is fixed and safe to expose.
    Internal(String),
    /// Failure with no constructed response body.
    Unhandled,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
            }
            AppError::Internal(error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error })).into_response()
            }
            AppError::Unhandled => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
