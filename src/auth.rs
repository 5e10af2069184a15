use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::AppError,
    models::User,
    policy::Viewer,
    repository::RepositoryState,
};

/// Claims
///
/// Payload of a session token: who the user was at login time plus the standard
/// issued-at / expiry timestamps. Serialized as `{id, email, roleId, iat, exp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: i32,
    pub email: String,
    pub role_id: i32,
    /// Issued At (seconds since the epoch).
    pub iat: usize,
    /// Expiration Time (seconds since the epoch). Always validated on decode.
    pub exp: usize,
}

impl Claims {
    pub fn for_user(user: &User, ttl_secs: u64) -> Self {
        let now = Utc::now().timestamp().max(0) as usize;
        Self {
            id: user.id,
            email: user.email.clone(),
            role_id: user.role_id,
            iat: now,
            exp: now.saturating_add(usize::try_from(ttl_secs).unwrap_or(usize::MAX)),
        }
    }
}

/// Signs an HS256 session token for `user`.
pub fn issue_token(user: &User, config: &AppConfig) -> Result<String, AppError> {
    let claims = Claims::for_user(user, config.token_ttl_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
}

/// Verifies signature and expiry of `token`.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Your session has expired, please log in again".to_string())
            }
            _ => AppError::Unauthorized("Invalid token".to_string()),
        })
}

/// The token part of an `Authorization` header. Accepts `Bearer <token>` as well as
/// a bare token.
fn token_from_header(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// AuthUser
///
/// The resolved identity of an authenticated request. The role is the user's
/// *current* role from the repository, not the one frozen into the token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub role_id: i32,
}

impl AuthUser {
    pub fn viewer(&self) -> Viewer {
        Viewer::new(self.id, self.role_id)
    }
}

/// AuthUser Extractor Implementation
///
/// 1. Reads the `Authorization` header.
/// 2. Verifies the token signature and expiry.
/// 3. Looks the user up, so deleted accounts lose access immediately.
///
/// A user already placed in the request extensions (by `auth_middleware`) is reused.
///
/// Rejection: `AppError::Unauthorized` (401) on any authentication failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by `auth_middleware` on this request.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(token_from_header)
            .ok_or_else(|| AppError::Unauthorized("You are not signed in".to_string()))?;

        let claims = decode_token(token, &config.jwt_secret)?;

        let user = repo.get_user(claims.id).await?.ok_or_else(|| {
            tracing::warn!(user_id = claims.id, "token presented for a deleted user");
            AppError::Unauthorized("User no longer exists".to_string())
        })?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            role_id: user.role_id,
        })
    }
}
