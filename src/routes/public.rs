use crate::{AppState, handlers::users};
use axum::{Router, routing::post};

/// Public Router Module
///
/// Endpoints reachable without a session: account creation and login. Everything
/// else under `/api/v1` requires a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // POST /users
        // Sign-up. New accounts always start with the `User` role.
        .route("/users", post(users::signup))
        // POST /users/login
        // Verifies credentials and returns `{ message, user, token }`.
        .route("/users/login", post(users::login))
}
