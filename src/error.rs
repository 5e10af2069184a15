use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// AppError
///
/// The single error type returned by every handler. Each variant maps to one HTTP
/// status code and carries the human-readable message sent back to the client as
/// `{ "message": "..." }`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input (400).
    #[error("bad request: {0}")]
    BadRequest(String),
    /// No valid session could be resolved from the request (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The caller is known but lacks the role or ownership required (403).
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// The addressed resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),
    /// A uniqueness rule (email, title, role name) would be violated (409).
    #[error("conflict: {0}")]
    Conflict(String),
    /// Anything unexpected. The cause is logged, never returned to the client (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-facing message for this error.
    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg,
            AppError::Internal(_) => "An internal server error occurred",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Internal(cause) => {
                // The id ties the opaque client response to the detailed log line.
                let error_id = uuid::Uuid::new_v4();
                tracing::error!(%error_id, "internal error: {}", cause);
                json!({
                    "message": self.message(),
                    "errorId": error_id.to_string(),
                })
            }
            _ => {
                tracing::debug!(status = status.as_u16(), "request rejected: {}", self.message());
                json!({ "message": self.message() })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
