use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::{AppJson, AppQuery, is_valid_email, parse_id, required};
use crate::{
    AppState,
    auth::{AuthUser, issue_token},
    error::AppError,
    models::{
        CredentialsRequest, Document, LoginResponse, MessageResponse, NewUser, UpdateUserRequest,
        User, UserChanges, UserRecord, UserUpdated,
    },
    pagination::{PageQuery, Paginated},
    password::{hash_password, verify_password},
    policy::{self, RequestedUserChanges},
    repository::{RepoError, RepositoryState},
};

const EMAIL_EXISTS: &str = "Email already exists";

/// Validated sign-up / login input.
struct Credentials {
    email: String,
    password: String,
}

fn validate_credentials(payload: CredentialsRequest) -> Result<Credentials, AppError> {
    let email = required(payload.email, "Email is Required")?;
    let password = payload
        .password
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Password is Required".to_string()))?;
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid Email".to_string()));
    }
    Ok(Credentials { email, password })
}

async fn find_user(repo: &RepositoryState, id: i32) -> Result<UserRecord, AppError> {
    repo.get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User Not Found".to_string()))
}

fn email_conflict(err: RepoError) -> AppError {
    match err {
        RepoError::UniqueViolation(_) => AppError::Conflict(EMAIL_EXISTS.to_string()),
        other => other.into(),
    }
}

// --- Public ---

/// signup
///
/// [Public Route] Creates an account with the default `User` role.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Missing or invalid email/password"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Credentials { email, password } = validate_credentials(payload)?;

    if state.repo.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(EMAIL_EXISTS.to_string()));
    }

    let password_hash = hash_password(password).await?;
    let user = state
        .repo
        .create_user(NewUser {
            email,
            password_hash,
            role_id: policy::USER,
        })
        .await
        .map_err(email_conflict)?;

    tracing::info!(user_id = user.id, "user signed up");
    Ok((StatusCode::CREATED, Json(user)))
}

/// login
///
/// [Public Route] Exchanges credentials for a session token.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Unknown email or wrong password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let Credentials { email, password } = validate_credentials(payload)?;

    let record = state
        .repo
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Kindly sign up first".to_string()))?;

    if !verify_password(password, record.password_hash.clone()).await? {
        tracing::warn!(user_id = record.id, "login with wrong password");
        return Err(AppError::Unauthorized("Wrong Password".to_string()));
    }

    let user = User::from(record);
    let token = issue_token(&user, &state.config)?;

    Ok(Json(LoginResponse {
        message: "login successful".to_string(),
        user,
        token,
    }))
}

// --- Authenticated ---

/// logout
///
/// [Authenticated Route] Sessions are stateless; the client discards its token.
#[utoipa::path(
    get,
    path = "/api/v1/users/logout",
    responses((status = 200, description = "Logged out", body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn logout(AuthUser { id, .. }: AuthUser) -> Json<MessageResponse> {
    tracing::debug!(user_id = id, "user logged out");
    Json(MessageResponse::new("User successfully logged out"))
}

/// update_user
///
/// [Authenticated Route] Partial account update.
///
/// *Authorization*: users change their own email/password; a Super Admin changes other
/// users' roles (see `policy::authorize_user_update`). The response message reports
/// the outcome per supplied field.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserUpdated),
        (status = 400, description = "Invalid field"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "User Not Found"),
        (status = 409, description = "Email already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserUpdated>, AppError> {
    let target_id = parse_id(&id, "User")?;

    policy::authorize_user_update(
        actor.viewer(),
        target_id,
        RequestedUserChanges {
            email: payload.email.is_some(),
            password: payload.password.is_some(),
            role: payload.role_id.is_some(),
        },
    )?;
    let target = find_user(&state.repo, target_id).await?;

    // Field validation, before anything is written.
    let email = payload
        .email
        .map(|e| required(Some(e), "Email is Required"))
        .transpose()?;
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(AppError::BadRequest("Invalid Email".to_string()));
        }
    }
    let password = match payload.password {
        Some(p) if p.trim().is_empty() => {
            return Err(AppError::BadRequest("Password is Required".to_string()));
        }
        other => other,
    };
    let role_id = match payload.role_id {
        Some(input) => {
            let role_id = input
                .as_role_id()
                .ok_or_else(|| AppError::BadRequest("Invalid RoleId".to_string()))?;
            if state.repo.get_role(role_id).await?.is_none() {
                return Err(AppError::BadRequest(
                    "There is no role with that RoleId".to_string(),
                ));
            }
            Some(role_id)
        }
        None => None,
    };

    if email.is_none() && password.is_none() && role_id.is_none() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }

    let mut changes = UserChanges::default();
    let mut outcome: Vec<&str> = Vec::new();

    if let Some(email) = email {
        if email == target.email {
            outcome.push("Email up to date.");
        } else {
            if state
                .repo
                .find_user_by_email(&email)
                .await?
                .is_some_and(|other| other.id != target_id)
            {
                return Err(AppError::Conflict(EMAIL_EXISTS.to_string()));
            }
            outcome.push("Email successfully updated.");
            changes.email = Some(email);
        }
    }

    if let Some(password) = password {
        if verify_password(password.clone(), target.password_hash.clone()).await? {
            outcome.push("Password up to date.");
        } else {
            outcome.push("Password successfully updated.");
            changes.password_hash = Some(hash_password(password).await?);
        }
    }

    if let Some(role_id) = role_id {
        if role_id == target.role_id {
            outcome.push("Role up to date.");
        } else {
            outcome.push("Role successfully updated.");
            changes.role_id = Some(role_id);
        }
    }

    let updated = state
        .repo
        .update_user(target_id, changes)
        .await
        .map_err(email_conflict)?
        .ok_or_else(|| AppError::NotFound("User Not Found".to_string()))?;

    tracing::info!(actor_id = actor.id, user_id = target_id, "user updated");
    Ok(Json(UserUpdated {
        message: outcome.join(" "),
        updated_details: updated,
    }))
}

// --- Admin ---

/// list_users
///
/// [Admin Route] All accounts, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of users", body = Paginated<User>),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    actor: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<Paginated<User>>, AppError> {
    policy::require_admin(actor.viewer())?;
    let page = query.pagination()?;
    let (rows, total) = state.repo.list_users(None, page).await?;
    Ok(Json(page.paginate(rows, total)))
}

/// get_user
///
/// [Admin Route] A single account by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 404, description = "User Not Found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    policy::require_admin(actor.viewer())?;
    let id = parse_id(&id, "User")?;
    let user = find_user(&state.repo, id).await?;
    Ok(Json(user.into()))
}

/// user_documents
///
/// [Admin Route] Every document owned by one user regardless of access class.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/documents",
    params(("id" = i32, Path, description = "User ID"), PageQuery),
    responses(
        (status = 200, description = "Page of the user's documents", body = Paginated<Document>),
        (status = 404, description = "User Not Found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn user_documents(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<Paginated<Document>>, AppError> {
    policy::require_admin(actor.viewer())?;
    let id = parse_id(&id, "User")?;
    let page = query.pagination()?;
    find_user(&state.repo, id).await?;

    let (rows, total) = state.repo.list_user_documents(id, page).await?;
    Ok(Json(page.paginate(rows, total)))
}

/// delete_user
///
/// [Super Admin Route] Removes an account and, by cascade, its documents.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not a Super Admin, or deleting yourself"),
        (status = 404, description = "User Not Found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    policy::require_super_admin(actor.viewer())?;
    let id = parse_id(&id, "User")?;
    find_user(&state.repo, id).await?;
    policy::authorize_user_delete(actor.viewer(), id)?;

    if !state.repo.delete_user(id).await? {
        return Err(AppError::NotFound("User Not Found".to_string()));
    }

    tracing::info!(actor_id = actor.id, user_id = id, "user deleted");
    Ok(Json(MessageResponse::new("User successfully deleted")))
}
