use crate::{
    AppState,
    handlers::{roles, search, users},
};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Account and role management. These routes are not behind `auth_middleware`;
/// each handler extracts `AuthUser` (rejecting anonymous callers with 401) and then
/// checks the role itself: the admin tier for reads, Super Admin for role creation
/// and account deletion.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /users
        .route("/users", get(users::list_users))
        // GET/DELETE /users/{id}
        // DELETE is Super Admin only, and never on one's own account.
        .route("/users/{id}", get(users::get_user).delete(users::delete_user))
        // GET /users/{id}/documents
        // All of one user's documents regardless of access class.
        .route("/users/{id}/documents", get(users::user_documents))
        // GET/POST /roles
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        // GET /search/users?q=
        .route("/search/users", get(search::search_users))
}
