use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    error::AppError,
    models::{
        Document, DocumentChanges, NewDocument, NewUser, OwnedDocument, Role, User, UserChanges,
        UserRecord,
    },
    pagination::Pagination,
    policy::Viewer,
};

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// One page of rows plus the total number of rows matching the query.
pub type Listing<T> = (Vec<T>, i64);

/// RepoError
///
/// Storage failures, classified so handlers can turn constraint violations into
/// domain messages ("Title already exists") instead of a 500.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A UNIQUE constraint rejected the write. Carries the constraint name.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    /// A FOREIGN KEY constraint rejected the write. Carries the constraint name.
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            if db_err.is_unique_violation() {
                return RepoError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return RepoError::ForeignKeyViolation(constraint);
            }
        }
        RepoError::Database(err)
    }
}

/// Fallback mapping for errors a handler did not translate itself.
impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation(_) => {
                AppError::Conflict("Resource already exists".to_string())
            }
            RepoError::ForeignKeyViolation(_) => {
                AppError::BadRequest("Referenced resource does not exist".to_string())
            }
            RepoError::Database(e) => AppError::Internal(format!("database error: {}", e)),
        }
    }
}

/// Repository Trait
///
/// The persistence contract used by handlers and the `AuthUser` extractor. Shared as
/// `Arc<dyn Repository>` so the Postgres implementation and the in-memory one are
/// interchangeable.
///
/// Listing methods return one page of rows and the total match count. Document
/// listings only include rows the given [`Viewer`] is allowed to read.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Roles ---
    /// All roles, ordered by id ascending.
    async fn list_roles(&self) -> Result<Vec<Role>, RepoError>;
    async fn get_role(&self, id: i32) -> Result<Option<Role>, RepoError>;
    async fn create_role(&self, name: &str) -> Result<Role, RepoError>;

    // --- Users ---
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;
    async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, RepoError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;
    /// Users ordered by id descending, optionally filtered by a case-insensitive
    /// substring of the email.
    async fn list_users(
        &self,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<Listing<User>, RepoError>;
    /// Returns `None` if the user does not exist.
    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, RepoError>;
    /// Deletes the user and, by cascade, their documents. `false` if nothing matched.
    async fn delete_user(&self, id: i32) -> Result<bool, RepoError>;

    // --- Documents ---
    async fn create_document(&self, document: NewDocument) -> Result<Document, RepoError>;
    async fn get_document(&self, id: i32) -> Result<Option<OwnedDocument>, RepoError>;
    /// Documents visible to `viewer`, ordered by id descending, optionally filtered by
    /// a case-insensitive substring of the title.
    async fn list_documents(
        &self,
        viewer: Viewer,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<Listing<Document>, RepoError>;
    /// Every document owned by `owner_id`, ordered by id descending. Admin view: no
    /// visibility filter.
    async fn list_user_documents(
        &self,
        owner_id: i32,
        page: Pagination,
    ) -> Result<Listing<Document>, RepoError>;
    async fn update_document(
        &self,
        id: i32,
        changes: DocumentChanges,
    ) -> Result<Option<Document>, RepoError>;
    async fn delete_document(&self, id: i32) -> Result<bool, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
