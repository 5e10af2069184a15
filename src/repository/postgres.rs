use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};

use super::{Listing, RepoError, Repository};
use crate::{
    models::{
        Document, DocumentChanges, NewDocument, NewUser, OwnedDocument, Role, User, UserChanges,
        UserRecord,
    },
    pagination::Pagination,
    policy::{self, Viewer},
};

const USER_COLUMNS: &str = "id, email, role_id, created_at, updated_at";
const USER_RECORD_COLUMNS: &str = "id, email, password_hash, role_id, created_at, updated_at";
const DOCUMENT_COLUMNS: &str =
    "d.id, d.title, d.content, d.access, d.user_id, d.created_at, d.updated_at";

/// PostgresRepository
///
/// The production implementation of [`Repository`]. All queries are checked at
/// runtime (`query_as::<_, T>` / `QueryBuilder`) so the crate builds without a live
/// database; the schema lives in `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards so a search term always matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Appends the visibility predicate for `viewer` (documents alias `d`, owners `u`).
///
/// SQL rendering of `policy::can_view`: the admin tier sees everything; everyone else
/// sees Public documents, their own, and Role documents whose owner shares their role.
fn push_visibility(builder: &mut QueryBuilder<'static, Postgres>, viewer: Viewer) {
    if policy::is_admin_tier(viewer.role_id) {
        return;
    }
    builder.push(" AND (d.access = 'Public' OR d.user_id = ");
    builder.push_bind(viewer.id);
    builder.push(" OR (d.access = 'Role' AND u.role_id = ");
    builder.push_bind(viewer.role_id);
    builder.push("))");
}

/// Builds `SELECT <select> FROM documents d JOIN users u ... WHERE <filters>`.
fn document_query(
    select: &str,
    viewer: Option<Viewer>,
    owner_id: Option<i32>,
    search: Option<&str>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM documents d JOIN users u ON u.id = d.user_id WHERE TRUE",
        select
    ));
    if let Some(viewer) = viewer {
        push_visibility(&mut builder, viewer);
    }
    if let Some(owner_id) = owner_id {
        builder.push(" AND d.user_id = ");
        builder.push_bind(owner_id);
    }
    if let Some(term) = search {
        builder.push(" AND d.title ILIKE ");
        builder.push_bind(like_pattern(term));
    }
    builder
}

fn user_query(select: &str, search: Option<&str>) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM users WHERE TRUE", select));
    if let Some(term) = search {
        builder.push(" AND email ILIKE ");
        builder.push_bind(like_pattern(term));
    }
    builder
}

fn push_page(builder: &mut QueryBuilder<'static, Postgres>, order_by: &str, page: Pagination) {
    builder.push(" ORDER BY ");
    builder.push(order_by);
    builder.push(" LIMIT ");
    builder.push_bind(page.limit);
    builder.push(" OFFSET ");
    builder.push_bind(page.offset);
}

impl PostgresRepository {
    async fn fetch_documents(
        &self,
        viewer: Option<Viewer>,
        owner_id: Option<i32>,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<Listing<Document>, RepoError> {
        let total: i64 = document_query("COUNT(*)", viewer, owner_id, search)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut rows_query = document_query(DOCUMENT_COLUMNS, viewer, owner_id, search);
        push_page(&mut rows_query, "d.id DESC", page);
        let rows = rows_query
            .build_query_as::<Document>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- ROLES ---

    async fn list_roles(&self) -> Result<Vec<Role>, RepoError> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    async fn get_role(&self, id: i32) -> Result<Option<Role>, RepoError> {
        let role = sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn create_role(&self, name: &str) -> Result<Role, RepoError> {
        let role =
            sqlx::query_as::<_, Role>("INSERT INTO roles (name) VALUES ($1) RETURNING id, name")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(role)
    }

    // --- USERS ---

    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let query = format!(
            "INSERT INTO users (email, password_hash, role_id) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&query)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.role_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, RepoError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_RECORD_COLUMNS);
        let user = sqlx::query_as::<_, UserRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_RECORD_COLUMNS);
        let user = sqlx::query_as::<_, UserRecord>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(
        &self,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<Listing<User>, RepoError> {
        let total: i64 = user_query("COUNT(*)", search)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut rows_query = user_query(USER_COLUMNS, search);
        push_page(&mut rows_query, "id DESC", page);
        let rows = rows_query
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Uses `COALESCE` so that `None` fields keep their stored value.
    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, RepoError> {
        let query = format!(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                role_id = COALESCE($4, role_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.role_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i32) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- DOCUMENTS ---

    async fn create_document(&self, document: NewDocument) -> Result<Document, RepoError> {
        let created = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (title, content, access, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, access, user_id, created_at, updated_at
            "#,
        )
        .bind(document.title)
        .bind(document.content)
        .bind(document.access)
        .bind(document.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Joins the owner so the caller can evaluate Role-scoped visibility.
    async fn get_document(&self, id: i32) -> Result<Option<OwnedDocument>, RepoError> {
        let mut builder = document_query(
            &format!("{}, u.role_id AS owner_role_id", DOCUMENT_COLUMNS),
            None,
            None,
            None,
        );
        builder.push(" AND d.id = ");
        builder.push_bind(id);
        let document = builder
            .build_query_as::<OwnedDocument>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(document)
    }

    async fn list_documents(
        &self,
        viewer: Viewer,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<Listing<Document>, RepoError> {
        self.fetch_documents(Some(viewer), None, search, page).await
    }

    async fn list_user_documents(
        &self,
        owner_id: i32,
        page: Pagination,
    ) -> Result<Listing<Document>, RepoError> {
        self.fetch_documents(None, Some(owner_id), None, page).await
    }

    async fn update_document(
        &self,
        id: i32,
        changes: DocumentChanges,
    ) -> Result<Option<Document>, RepoError> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                access = COALESCE($4, access),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, content, access, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.content)
        .bind(changes.access)
        .fetch_optional(&self.pool)
        .await?;
        Ok(document)
    }

    async fn delete_document(&self, id: i32) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
