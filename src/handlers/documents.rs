use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::{AppJson, AppQuery, parse_id, required};
use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    models::{
        Access, CreateDocumentRequest, Document, DocumentChanges, DocumentCreated,
        DocumentUpdated, MessageResponse, NewDocument, OwnedDocument, UpdateDocumentRequest,
    },
    pagination::{PageQuery, Paginated},
    policy,
    repository::{RepoError, RepositoryState},
};

fn title_conflict(err: RepoError) -> AppError {
    match err {
        RepoError::UniqueViolation(_) => AppError::Conflict("Title already exists".to_string()),
        other => other.into(),
    }
}

fn validate_content(content: String) -> Result<String, AppError> {
    if content.trim().is_empty() {
        return Err(AppError::BadRequest("Content is Required".to_string()));
    }
    Ok(content)
}

fn validate_access(access: String) -> Result<Access, AppError> {
    let access = access.trim();
    if access.is_empty() {
        return Err(AppError::BadRequest("Access is Required".to_string()));
    }
    access
        .parse::<Access>()
        .map_err(|_| AppError::BadRequest("Invalid Access Type".to_string()))
}

async fn find_document(repo: &RepositoryState, raw_id: &str) -> Result<OwnedDocument, AppError> {
    let id = parse_id(raw_id, "Document")?;
    repo.get_document(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document Not Found".to_string()))
}

/// create_document
///
/// [Authenticated Route] Creates a document owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Document created", body = DocumentCreated),
        (status = 400, description = "Missing or invalid field"),
        (status = 409, description = "Title already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_document(
    actor: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentCreated>), AppError> {
    let title = required(payload.title, "Title is Required")?;
    let content = validate_content(payload.content.unwrap_or_default())?;
    let access = validate_access(payload.access.unwrap_or_default())?;

    let created_document = state
        .repo
        .create_document(NewDocument {
            title,
            content,
            access,
            user_id: actor.id,
        })
        .await
        .map_err(title_conflict)?;

    tracing::info!(document_id = created_document.id, owner_id = actor.id, %access, "document created");
    Ok((
        StatusCode::CREATED,
        Json(DocumentCreated {
            message: "Document successfully created".to_string(),
            created_document,
        }),
    ))
}

/// list_documents
///
/// [Authenticated Route] Documents the caller may read, newest first.
///
/// *Security*: visibility is applied by the repository query, so a page never contains
/// a document that `get_document` would refuse.
#[utoipa::path(
    get,
    path = "/api/v1/documents",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of visible documents", body = Paginated<Document>),
        (status = 400, description = "Invalid Limit/Offset")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_documents(
    actor: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<Paginated<Document>>, AppError> {
    let page = query.pagination()?;
    let (rows, total) = state
        .repo
        .list_documents(actor.viewer(), None, page)
        .await?;
    Ok(Json(page.paginate(rows, total)))
}

/// get_document
///
/// [Authenticated Route] A single document, subject to its access class.
#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Found", body = Document),
        (status = 403, description = "Not authorized to view"),
        (status = 404, description = "Document Not Found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_document(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let OwnedDocument {
        document,
        owner_role_id,
    } = find_document(&state.repo, &id).await?;

    policy::authorize_view(
        actor.viewer(),
        document.access,
        document.user_id,
        owner_role_id,
    )?;
    Ok(Json(document))
}

/// update_document
///
/// [Authenticated Route] Partial update by the owner or a Super Admin.
#[utoipa::path(
    put,
    path = "/api/v1/documents/{id}",
    params(("id" = i32, Path, description = "Document ID")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Updated", body = DocumentUpdated),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Document Not Found"),
        (status = 409, description = "Title already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_document(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateDocumentRequest>,
) -> Result<Json<DocumentUpdated>, AppError> {
    let OwnedDocument { document, .. } = find_document(&state.repo, &id).await?;
    policy::authorize_modification(
        actor.viewer(),
        document.user_id,
        "You cannot update someone else's document",
    )?;

    let changes = DocumentChanges {
        title: payload
            .title
            .map(|t| required(Some(t), "Title is Required"))
            .transpose()?,
        content: payload.content.map(validate_content).transpose()?,
        access: payload.access.map(validate_access).transpose()?,
    };

    let updated_details = state
        .repo
        .update_document(document.id, changes)
        .await
        .map_err(title_conflict)?
        .ok_or_else(|| AppError::NotFound("Document Not Found".to_string()))?;

    tracing::info!(document_id = document.id, actor_id = actor.id, "document updated");
    Ok(Json(DocumentUpdated {
        message: "Update Successful".to_string(),
        updated_details,
    }))
}

/// delete_document
///
/// [Authenticated Route] Removal by the owner or a Super Admin.
#[utoipa::path(
    delete,
    path = "/api/v1/documents/{id}",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Document Not Found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_document(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let OwnedDocument { document, .. } = find_document(&state.repo, &id).await?;
    policy::authorize_modification(
        actor.viewer(),
        document.user_id,
        "You cannot delete someone else's document",
    )?;

    if !state.repo.delete_document(document.id).await? {
        return Err(AppError::NotFound("Document Not Found".to_string()));
    }

    tracing::info!(document_id = document.id, actor_id = actor.id, "document deleted");
    Ok(Json(MessageResponse::new("Document successfully deleted")))
}
