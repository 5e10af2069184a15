use crate::{
    AppState,
    handlers::{documents, search, users},
};
use axum::{
    Router,
    routing::{get, put},
};

/// Authenticated Router Module
///
/// Routes open to any signed-in user. The whole router is wrapped by
/// `auth_middleware`, so handlers only run with a resolved `AuthUser`; ownership and
/// visibility checks then happen inside the handlers.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /users/logout
        .route("/users/logout", get(users::logout))
        // PUT /users/{id}
        // Own email/password, or another user's role for a Super Admin.
        .route("/users/{id}", put(users::update_user))
        // --- Documents ---
        // GET/POST /documents
        // The listing only contains documents the caller may read.
        .route(
            "/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        // GET/PUT/DELETE /documents/{id}
        // Reads follow the access class; writes are Owner-or-Super-Admin.
        .route(
            "/documents/{id}",
            get(documents::get_document)
                .put(documents::update_document)
                .delete(documents::delete_document),
        )
        // GET /search/documents?q=
        .route("/search/documents", get(search::search_documents))
}
