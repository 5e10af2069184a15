#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use docvault::{
    AppConfig, AppState, InMemoryRepository, RepositoryState,
    auth::issue_token,
    create_router,
    models::{Access, Document, NewDocument, NewUser, User},
    password::hash_password,
    repository::Repository,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

/// Router plus direct handles on its repository and configuration.
pub struct TestContext {
    pub repo: RepositoryState,
    pub config: AppConfig,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;
        let config = AppConfig::default();
        let router = create_router(AppState {
            repo: repo.clone(),
            config: config.clone(),
        });
        Self {
            repo,
            config,
            router,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }

    /// Inserts a user with a placeholder hash. Use [`Self::user_with_password`] when
    /// the test needs to log in.
    pub async fn user(&self, email: &str, role_id: i32) -> User {
        self.repo
            .create_user(NewUser {
                email: email.to_string(),
                password_hash: "not-a-real-hash".to_string(),
                role_id,
            })
            .await
            .expect("failed to insert test user")
    }

    pub async fn user_with_password(&self, email: &str, role_id: i32) -> User {
        let password_hash = hash_password(PASSWORD.to_string()).await.unwrap();
        self.repo
            .create_user(NewUser {
                email: email.to_string(),
                password_hash,
                role_id,
            })
            .await
            .expect("failed to insert test user")
    }

    pub fn token(&self, user: &User) -> String {
        issue_token(user, &self.config).expect("failed to sign test token")
    }

    pub async fn document(&self, owner: &User, title: &str, access: Access) -> Document {
        self.repo
            .create_document(NewDocument {
                title: title.to_string(),
                content: format!("content of {}", title),
                access,
                user_id: owner.id,
            })
            .await
            .expect("failed to insert test document")
    }

    /// Sends one request through the full router and returns the status and the JSON
    /// body (`Value::Null` for an empty body, a string for non-JSON bodies).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }
}

/// Titles of the `rows` of a paginated response, in order.
pub fn titles(page: &Value) -> Vec<String> {
    page["rows"]
        .as_array()
        .expect("response has no rows")
        .iter()
        .map(|row| row["title"].as_str().unwrap().to_string())
        .collect()
}
