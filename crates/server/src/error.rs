//! HTTP error responses.
//!
//! Input errors become 400, unknown users 404. Everything else is a 500
//! whose body only summarizes the failure; the cause goes to the log.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contribs_core::Error;
use serde::{Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if !err.is_client_fault() {
            tracing::error!(error = %err, "contributions request failed");
            let summary = match err {
                Error::FetchFailed(_) | Error::FetchTimeout(_) | Error::FetchTooLarge(_) => {
                    "Failed to retrieve contributions from the source service"
                }
                Error::ParseFailed(_) => "Failed to parse the contribution calendar",
                _ => "Internal server error",
            };
            return ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, summary);
        }

        match err {
            Error::UserNotFound(username) => {
                ApiError::new(StatusCode::NOT_FOUND, format!("User \"{username}\" not found"))
            }
            Error::InvalidInput(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg),
            other => ApiError::new(StatusCode::BAD_REQUEST, other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
