//! HTTP handlers, grouped by resource.
//!
//! Handlers validate input, apply the rules from [`crate::policy`], and make one or two
//! repository calls. Every failure is an [`AppError`].

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
};

use crate::{error::AppError, models::MessageResponse};

pub mod documents;
pub mod roles;
pub mod search;
pub mod users;

/// AppJson
///
/// `axum::Json` with its rejection mapped to `AppError`, so malformed bodies get the
/// same `{ "message": ... }` shape as every other error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// AppQuery
///
/// `axum::extract::Query` with the same rejection mapping as [`AppJson`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Parses a path id, e.g. `parse_id("12", "Document")`.
pub(crate) fn parse_id(raw: &str, kind: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::BadRequest(format!("{} Id must be an integer", kind)))
}

/// A deliberately small email check: one `@`, a non-empty local part, and a dotted
/// domain without whitespace.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// A trimmed, non-empty required field, or `BadRequest(message)`.
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(message.to_string()))
}

/// welcome
///
/// [Public Route] Greeting for the API root.
#[utoipa::path(
    get,
    path = "/api",
    responses((status = 200, description = "Welcome", body = MessageResponse))
)]
pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse::new(
        "Welcome to the Document Management System API",
    ))
}

/// route_not_found
///
/// Fallback for every unmatched path.
pub async fn route_not_found() -> AppError {
    AppError::NotFound("Invalid route".to_string())
}
