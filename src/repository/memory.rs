use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{Listing, RepoError, Repository};
use crate::{
    models::{
        Document, DocumentChanges, NewDocument, NewUser, OwnedDocument, Role, User, UserChanges,
        UserRecord,
    },
    pagination::Pagination,
    policy::{self, Viewer},
};

#[derive(Default)]
struct Tables {
    roles: BTreeMap<i32, Role>,
    users: BTreeMap<i32, UserRecord>,
    documents: BTreeMap<i32, Document>,
    next_role_id: i32,
    next_user_id: i32,
    next_document_id: i32,
}

impl Tables {
    fn owner_role(&self, user_id: i32) -> Option<i32> {
        self.users.get(&user_id).map(|u| u.role_id)
    }
}

/// InMemoryRepository
///
/// A [`Repository`] backed by ordered maps. Mirrors the Postgres schema's rules:
/// the three seeded roles, UNIQUE email/title/role name, foreign keys, and the cascade
/// from users to their documents. Used by the test suite and for running the API
/// without a database.
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        let mut tables = Tables {
            next_role_id: 1,
            next_user_id: 1,
            next_document_id: 1,
            ..Tables::default()
        };
        for name in ["Super Admin", "Admin", "User"] {
            let id = tables.next_role_id;
            tables.roles.insert(
                id,
                Role {
                    id,
                    name: name.to_string(),
                },
            );
            tables.next_role_id += 1;
        }
        Self {
            tables: RwLock::new(tables),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Newest first, then the requested window.
fn page_of<T: Clone>(mut rows: Vec<T>, page: Pagination) -> Listing<T> {
    let total = rows.len() as i64;
    rows.reverse();
    let rows = rows
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect();
    (rows, total)
}

#[async_trait]
impl Repository for InMemoryRepository {
    // --- ROLES ---

    async fn list_roles(&self) -> Result<Vec<Role>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.roles.values().cloned().collect())
    }

    async fn get_role(&self, id: i32) -> Result<Option<Role>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.roles.get(&id).cloned())
    }

    async fn create_role(&self, name: &str) -> Result<Role, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.roles.values().any(|r| r.name == name) {
            return Err(RepoError::UniqueViolation("roles_name_key".to_string()));
        }
        let id = tables.next_role_id;
        tables.next_role_id += 1;
        let role = Role {
            id,
            name: name.to_string(),
        };
        tables.roles.insert(id, role.clone());
        Ok(role)
    }

    // --- USERS ---

    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepoError::UniqueViolation("users_email_key".to_string()));
        }
        if !tables.roles.contains_key(&user.role_id) {
            return Err(RepoError::ForeignKeyViolation(
                "users_role_id_fkey".to_string(),
            ));
        }

        let id = tables.next_user_id;
        tables.next_user_id += 1;
        let now = Utc::now();
        let record = UserRecord {
            id,
            email: user.email,
            password_hash: user.password_hash,
            role_id: user.role_id,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, record.clone());
        Ok(record.into())
    }

    async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(
        &self,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<Listing<User>, RepoError> {
        let tables = self.tables.read().await;
        let matching: Vec<User> = tables
            .users
            .values()
            .filter(|u| search.is_none_or(|term| contains_ignore_case(&u.email, term)))
            .cloned()
            .map(User::from)
            .collect();
        Ok(page_of(matching, page))
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &changes.email {
            if tables.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(RepoError::UniqueViolation("users_email_key".to_string()));
            }
        }
        if let Some(role_id) = changes.role_id {
            if !tables.roles.contains_key(&role_id) {
                return Err(RepoError::ForeignKeyViolation(
                    "users_role_id_fkey".to_string(),
                ));
            }
        }

        let Some(record) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email {
            record.email = email;
        }
        if let Some(hash) = changes.password_hash {
            record.password_hash = hash;
        }
        if let Some(role_id) = changes.role_id {
            record.role_id = role_id;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone().into()))
    }

    async fn delete_user(&self, id: i32) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.documents.retain(|_, d| d.user_id != id);
        Ok(true)
    }

    // --- DOCUMENTS ---

    async fn create_document(&self, document: NewDocument) -> Result<Document, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.documents.values().any(|d| d.title == document.title) {
            return Err(RepoError::UniqueViolation("documents_title_key".to_string()));
        }
        if !tables.users.contains_key(&document.user_id) {
            return Err(RepoError::ForeignKeyViolation(
                "documents_user_id_fkey".to_string(),
            ));
        }

        let id = tables.next_document_id;
        tables.next_document_id += 1;
        let now = Utc::now();
        let created = Document {
            id,
            title: document.title,
            content: document.content,
            access: document.access,
            user_id: document.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.documents.insert(id, created.clone());
        Ok(created)
    }

    async fn get_document(&self, id: i32) -> Result<Option<OwnedDocument>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.documents.get(&id).and_then(|document| {
            tables
                .owner_role(document.user_id)
                .map(|owner_role_id| OwnedDocument {
                    document: document.clone(),
                    owner_role_id,
                })
        }))
    }

    async fn list_documents(
        &self,
        viewer: Viewer,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<Listing<Document>, RepoError> {
        let tables = self.tables.read().await;
        let visible: Vec<Document> = tables
            .documents
            .values()
            .filter(|d| {
                tables.owner_role(d.user_id).is_some_and(|owner_role| {
                    policy::can_view(viewer, d.access, d.user_id, owner_role)
                })
            })
            .filter(|d| search.is_none_or(|term| contains_ignore_case(&d.title, term)))
            .cloned()
            .collect();
        Ok(page_of(visible, page))
    }

    async fn list_user_documents(
        &self,
        owner_id: i32,
        page: Pagination,
    ) -> Result<Listing<Document>, RepoError> {
        let tables = self.tables.read().await;
        let owned: Vec<Document> = tables
            .documents
            .values()
            .filter(|d| d.user_id == owner_id)
            .cloned()
            .collect();
        Ok(page_of(owned, page))
    }

    async fn update_document(
        &self,
        id: i32,
        changes: DocumentChanges,
    ) -> Result<Option<Document>, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(title) = &changes.title {
            if tables
                .documents
                .values()
                .any(|d| d.id != id && &d.title == title)
            {
                return Err(RepoError::UniqueViolation("documents_title_key".to_string()));
            }
        }

        let Some(document) = tables.documents.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            document.title = title;
        }
        if let Some(content) = changes.content {
            document.content = content;
        }
        if let Some(access) = changes.access {
            document.access = access;
        }
        document.updated_at = Utc::now();
        Ok(Some(document.clone()))
    }

    async fn delete_document(&self, id: i32) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        Ok(tables.documents.remove(&id).is_some())
    }
}
