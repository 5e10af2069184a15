use axum::{Json, extract::State, http::StatusCode};

use super::AppJson;
use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    models::{CreateRoleRequest, Role, RoleCreated},
    policy,
    repository::RepoError,
};

// "inf" and "NaN" parse as floats but are words.
fn is_numeric(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit()) && value.parse::<f64>().is_ok()
}

/// A role name must be present and must not be a bare number.
fn validate_role_name(name: Option<String>) -> Result<String, AppError> {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && !is_numeric(n))
        .ok_or_else(|| AppError::BadRequest("Invalid Role".to_string()))
}

/// create_role
///
/// [Super Admin Route] Adds a new role. Custom roles never join the admin tier.
#[utoipa::path(
    post,
    path = "/api/v1/roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = RoleCreated),
        (status = 400, description = "Invalid Role"),
        (status = 403, description = "Not a Super Admin"),
        (status = 409, description = "Role already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    actor: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleCreated>), AppError> {
    policy::require_super_admin(actor.viewer())?;
    let name = validate_role_name(payload.name)?;

    let created_role = state.repo.create_role(&name).await.map_err(|e| match e {
        RepoError::UniqueViolation(_) => AppError::Conflict("Role already exists".to_string()),
        other => other.into(),
    })?;

    tracing::info!(role_id = created_role.id, name = %created_role.name, "role created");
    Ok((
        StatusCode::CREATED,
        Json(RoleCreated {
            message: "Role successfully created".to_string(),
            created_role,
        }),
    ))
}

/// list_roles
///
/// [Admin Route] All roles, ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    responses(
        (status = 200, description = "Roles", body = [Role]),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_roles(
    actor: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Role>>, AppError> {
    policy::require_admin(actor.viewer())?;
    Ok(Json(state.repo.list_roles().await?))
}
