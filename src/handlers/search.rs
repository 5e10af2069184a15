use axum::{Json, extract::State};
use serde::Deserialize;
use utoipa::IntoParams;

use super::AppQuery;
use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    models::{Document, User},
    pagination::{Paginated, Pagination},
    policy,
};

/// SearchQuery
///
/// `?q=` plus the usual paging parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring to look for.
    pub q: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl SearchQuery {
    fn term(&self) -> Result<&str, AppError> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::BadRequest("Search query is required".to_string()))
    }

    fn pagination(&self) -> Result<Pagination, AppError> {
        Pagination::parse(self.limit.as_deref(), self.offset.as_deref())
    }
}

/// search_users
///
/// [Admin Route] Users whose email contains `q`.
#[utoipa::path(
    get,
    path = "/api/v1/search/users",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching users", body = Paginated<User>),
        (status = 400, description = "Missing query or bad paging"),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_users(
    actor: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<Paginated<User>>, AppError> {
    policy::require_admin(actor.viewer())?;
    let term = query.term()?;
    let page = query.pagination()?;

    let (rows, total) = state.repo.list_users(Some(term), page).await?;
    Ok(Json(page.paginate(rows, total)))
}

/// search_documents
///
/// [Authenticated Route] Visible documents whose title contains `q`.
#[utoipa::path(
    get,
    path = "/api/v1/search/documents",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching documents", body = Paginated<Document>),
        (status = 400, description = "Missing query or bad paging")
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_documents(
    actor: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<Paginated<Document>>, AppError> {
    let term = query.term()?;
    let page = query.pagination()?;

    let (rows, total) = state
        .repo
        .list_documents(actor.viewer(), Some(term), page)
        .await?;
    tracing::debug!(viewer_id = actor.id, term, total, "document search");
    Ok(Json(page.paginate(rows, total)))
}
