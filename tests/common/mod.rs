//! Shared fixtures for the HTTP tests: in-memory repositories and a router
//! wired the same way `serve` wires it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use object_store::memory::InMemory;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use blog_api::api::{create_router, AppState};
use blog_api::domain::{
    Account, AccountUpdate, NewAccount, NewPost, Post, PostFilter, ProfileUpdate,
};
use blog_api::errors::{AppError, AppResult};
use blog_api::infra::{AccountRepository, PostRepository};
use blog_api::services::Services;
use blog_api::types::PaginationParams;
use blog_api::Config;

/// Account store keyed by id, enforcing unique email and username.
#[derive(Default)]
pub struct MemoryAccounts {
    rows: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryAccounts {
    fn conflict(rows: &HashMap<Uuid, Account>, account: &Account) -> Option<AppError> {
        for other in rows.values().filter(|a| a.id != account.id) {
            if other.email == account.email {
                return Some(AppError::already_exists("User already exists"));
            }
            if other.username == account.username {
                return Some(AppError::already_exists("Username already exists"));
            }
        }
        None
    }
}

#[async_trait]
impl AccountRepository for MemoryAccounts {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|a| a.username == username).cloned())
    }

    async fn insert(&self, new: NewAccount) -> AppResult<Account> {
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            is_active: new.is_active,
            is_superuser: new.is_superuser,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        let mut rows = self.rows.lock().unwrap();
        if let Some(err) = Self::conflict(&rows, &account) {
            return Err(err);
        }
        rows.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Account> {
        let mut rows = self.rows.lock().unwrap();
        let mut account = rows
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        account.apply_profile(update);
        if let Some(err) = Self::conflict(&rows, &account) {
            return Err(err);
        }
        rows.insert(id, account.clone());
        Ok(account)
    }

    async fn update_flags(&self, id: Uuid, update: AccountUpdate) -> AppResult<Account> {
        let mut rows = self.rows.lock().unwrap();
        let account = rows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        account.apply_admin(update);
        Ok(account.clone())
    }

    async fn list(&self, offset: u64, limit: u64) -> AppResult<(Vec<Account>, u64)> {
        let rows = self.rows.lock().unwrap();
        let mut all: Vec<Account> = rows.values().cloned().collect();
        all.sort_by_key(|a| a.created_at);
        let total = all.len() as u64;
        let page = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }
}

/// Post store keyed by id.
#[derive(Default)]
pub struct MemoryPosts {
    rows: Mutex<HashMap<Uuid, Post>>,
}

#[async_trait]
impl PostRepository for MemoryPosts {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Post>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, new: NewPost) -> AppResult<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            is_published: new.is_published(),
            title: new.title,
            content: new.content,
            status: new.status,
            author_id: new.author_id,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> AppResult<Post> {
        let mut rows = self.rows.lock().unwrap();
        if !rows.contains_key(&post.id) {
            return Err(AppError::NotFound("Post not found".into()));
        }
        rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }

    async fn list(
        &self,
        filter: PostFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Post>, u64)> {
        let rows = self.rows.lock().unwrap();
        let mut matching: Vec<Post> = rows
            .values()
            .filter(|p| filter.author_id.map_or(true, |id| p.author_id == id))
            .filter(|p| !filter.published_only || p.is_visible())
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();
        Ok((page, total))
    }
}

/// A router over fresh in-memory stores, plus the account store so tests
/// can flip flags directly.
pub struct TestApp {
    pub router: Router,
    pub accounts: Arc<MemoryAccounts>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config::default();
        let accounts = Arc::new(MemoryAccounts::default());
        let services = Services::from_parts(
            accounts.clone(),
            Arc::new(MemoryPosts::default()),
            Arc::new(InMemory::new()),
            &config,
        );
        let state = AppState::from_services(&services, &config);
        Self {
            router: create_router(state, &config.cors_origins),
            accounts,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, body)
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, _, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn register(&self, email: &str, username: &str, password: &str) -> (StatusCode, Value) {
        self.json(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({ "email": email, "username": username, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.json(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Register and log in, returning the access token.
    pub async fn signup(&self, email: &str, username: &str) -> String {
        let (status, _) = self.register(email, username, "pw12345678").await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self.login(email, "pw12345678").await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Grant superuser directly in the store.
    pub async fn promote(&self, email: &str) {
        self.set_flags(
            email,
            AccountUpdate {
                is_superuser: Some(true),
                ..Default::default()
            },
        )
        .await;
    }

    pub async fn deactivate(&self, email: &str) {
        self.set_flags(
            email,
            AccountUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await;
    }

    async fn set_flags(&self, email: &str, update: AccountUpdate) {
        let account = self.accounts.find_by_email(email).await.unwrap().unwrap();
        self.accounts.update_flags(account.id, update).await.unwrap();
    }
}
