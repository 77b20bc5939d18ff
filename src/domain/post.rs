//! Post domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{POST_STATUS_ARCHIVED, POST_STATUS_DRAFT, POST_STATUS_PUBLISHED};
use crate::errors::AppError;

/// Post lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => POST_STATUS_DRAFT,
            PostStatus::Published => POST_STATUS_PUBLISHED,
            PostStatus::Archived => POST_STATUS_ARCHIVED,
        }
    }
}

impl FromStr for PostStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            POST_STATUS_DRAFT => Ok(PostStatus::Draft),
            POST_STATUS_PUBLISHED => Ok(PostStatus::Published),
            POST_STATUS_ARCHIVED => Ok(PostStatus::Archived),
            other => Err(AppError::validation(format!("Unknown post status: {}", other))),
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post domain entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: Uuid,
    #[schema(example = "Hello world")]
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    /// Mirrors `status == published`
    pub is_published: bool,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_visible(&self) -> bool {
        self.is_published && self.status == PostStatus::Published
    }

    pub fn apply(&mut self, update: PostUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(status) = update.status {
            self.status = status;
            self.is_published = status == PostStatus::Published;
        }
        self.updated_at = Utc::now();
    }
}

/// Data needed to insert a post. The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub author_id: Uuid,
}

impl NewPost {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

/// Partial post change
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
}

/// Listing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub author_id: Option<Uuid>,
    pub published_only: bool,
}
