//! API error boundary
//!
//! Everything that leaves the service as a non-2xx goes through [`ApiError`].
//! Bodies carry a short generic message only; detail goes to the log.

use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const INVALID_TOKEN: &str = "Invalid or expired token";
const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error")]
    Internal,
}

impl ApiError {
    /// Log an internal failure with full detail and return the opaque variant.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!("Internal error: {detail}");
        ApiError::Internal
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Like `From<AuthError>`, but with a caller-chosen 401 message.
    pub fn from_auth(err: AuthError, unauthorized_message: &str) -> Self {
        if err.is_client_error() {
            warn!(reason = %err, "Authentication rejected");
            ApiError::Unauthorized(unauthorized_message.to_string())
        } else {
            ApiError::internal(err)
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = match &err {
            AuthError::InvalidCredentials => INVALID_CREDENTIALS,
            _ => INVALID_TOKEN,
        };
        ApiError::from_auth(err, message)
    }
}

/// Error response JSON
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m) => m,
            ApiError::Internal => INTERNAL_ERROR.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}
