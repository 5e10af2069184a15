use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Access
///
/// The visibility class of a document. Stored as the Postgres enum `document_access`
/// and sent over the wire with the exact variant names ("Public", "Private", "Role").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "document_access")]
#[ts(export)]
pub enum Access {
    /// Readable by every authenticated user.
    #[default]
    Public,
    /// Readable by the owner and the admin tier.
    Private,
    /// Readable by users sharing the owner's role and the admin tier.
    Role,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "Public",
            Access::Private => "Private",
            Access::Role => "Role",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Access {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Public" => Ok(Access::Public),
            "Private" => Ok(Access::Private),
            "Role" => Ok(Access::Role),
            _ => Err(()),
        }
    }
}

/// Role
///
/// A named permission tier from the `roles` table. Ids 1-3 are seeded by the
/// initial migration (Super Admin, Admin, User).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

/// User
///
/// The public view of an account. This is what every endpoint returns; the password
/// hash only exists on [`UserRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: i32,
    pub email: String,
    // FK to roles.id.
    pub role_id: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// UserRecord
///
/// Raw row of the `users` table, including the Argon2 password hash. Internal only:
/// it is deliberately not `Serialize`.
#[derive(Clone, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub role_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            email: record.email,
            role_id: record.role_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Document
///
/// A text document from the `documents` table. `user_id` is the owner; deleting the
/// owner cascades to their documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Document {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub access: Access,
    pub user_id: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// OwnedDocument
///
/// A document joined with its owner's current role. The visibility policy for
/// `Role`-scoped documents needs both.
#[derive(Debug, Clone, FromRow)]
pub struct OwnedDocument {
    #[sqlx(flatten)]
    pub document: Document,
    pub owner_role_id: i32,
}

// --- Repository Inputs ---

/// Fields for inserting a user. The password is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role_id: i32,
}

/// Partial user update. `None` keeps the stored value.
#[derive(Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub access: Access,
    pub user_id: i32,
}

/// Partial document update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct DocumentChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub access: Option<Access>,
}

// --- Request Payloads (Input Schemas) ---
//
// Every field is optional at the serde level so that handlers can answer missing
// fields with a specific message ("Email is Required") instead of a generic
// deserialization error.

/// CredentialsRequest
///
/// Body of both sign-up (POST /users) and login (POST /users/login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CredentialsRequest {
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// RoleIdInput
///
/// Older clients send `roleId` as a string, newer ones as a number. Both are accepted
/// and validated by the update handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum RoleIdInput {
    Number(i64),
    Text(String),
}

impl RoleIdInput {
    /// Returns the numeric role id, or `None` when the value is not a valid integer.
    pub fn as_role_id(&self) -> Option<i32> {
        match self {
            RoleIdInput::Number(n) => i32::try_from(*n).ok(),
            RoleIdInput::Text(s) => s.trim().parse::<i32>().ok(),
        }
    }
}

/// UpdateUserRequest
///
/// Partial update payload for PUT /users/{id}. Which fields may be combined depends on
/// who is asking; see `policy::authorize_user_update`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleIdInput>,
}

/// CreateRoleRequest
///
/// Payload for POST /roles. The legacy field name `role` is accepted as well.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateRoleRequest {
    #[serde(alias = "role")]
    #[schema(example = "Editor")]
    pub name: Option<String>,
}

/// CreateDocumentRequest
///
/// Payload for POST /documents. `access` must be one of "Public", "Private", "Role".
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateDocumentRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[schema(example = "Private")]
    pub access: Option<String>,
}

/// UpdateDocumentRequest
///
/// Partial update payload for PUT /documents/{id}. Supplied fields follow the same
/// validation as on creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateDocumentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
}

// --- Response Payloads (Output Schemas) ---

/// MessageResponse
///
/// Plain acknowledgement body, e.g. after a delete or logout.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// LoginResponse
///
/// Returned by POST /users/login. `token` goes into the `Authorization: Bearer` header.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub message: String,
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoleCreated {
    pub message: String,
    pub created_role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DocumentCreated {
    pub message: String,
    pub created_document: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DocumentUpdated {
    pub message: String,
    pub updated_details: Document,
}

/// UserUpdated
///
/// `message` lists the outcome per supplied field, e.g.
/// "Email successfully updated. Role up to date."
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserUpdated {
    pub message: String,
    pub updated_details: User,
}
