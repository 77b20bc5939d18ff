//! Post service - ownership-scoped post management.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::guard::owner_or_elevated;
use crate::config::{ERROR_POST_NOT_FOUND, ERROR_UNAUTHORIZED_POST_ACCESS};
use crate::domain::{Account, NewPost, Post, PostFilter, PostStatus, PostUpdate};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::PostRepository;
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PostService: Send + Sync {
    async fn list_posts(
        &self,
        params: PaginationParams,
        filter: PostFilter,
    ) -> AppResult<Paginated<Post>>;

    async fn create_post(
        &self,
        author: Account,
        title: String,
        content: String,
        status: PostStatus,
    ) -> AppResult<Post>;

    async fn get_post(&self, id: Uuid) -> AppResult<Post>;

    async fn update_post(&self, actor: Account, id: Uuid, update: PostUpdate) -> AppResult<Post>;

    async fn delete_post(&self, actor: Account, id: Uuid) -> AppResult<()>;
}

pub struct PostManager {
    posts: Arc<dyn PostRepository>,
}

impl PostManager {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Load a post the actor may modify.
    async fn owned_post(&self, actor: &Account, id: Uuid) -> AppResult<Post> {
        let post = self.get_post(id).await?;
        if !owner_or_elevated(post.author_id, actor) {
            tracing::warn!(post_id = %id, account_id = %actor.id, "Post access denied");
            return Err(AppError::forbidden(ERROR_UNAUTHORIZED_POST_ACCESS));
        }
        Ok(post)
    }
}

#[async_trait]
impl PostService for PostManager {
    async fn list_posts(
        &self,
        params: PaginationParams,
        filter: PostFilter,
    ) -> AppResult<Paginated<Post>> {
        let (items, total) = self.posts.list(filter, params).await?;
        Ok(Paginated::new(items, &params, total))
    }

    async fn create_post(
        &self,
        author: Account,
        title: String,
        content: String,
        status: PostStatus,
    ) -> AppResult<Post> {
        let post = self
            .posts
            .insert(NewPost {
                title,
                content,
                status,
                author_id: author.id,
            })
            .await?;

        tracing::info!(post_id = %post.id, author_id = %author.id, "Post created");
        Ok(post)
    }

    async fn get_post(&self, id: Uuid) -> AppResult<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_not_found(ERROR_POST_NOT_FOUND)
    }

    async fn update_post(&self, actor: Account, id: Uuid, update: PostUpdate) -> AppResult<Post> {
        let mut post = self.owned_post(&actor, id).await?;
        post.apply(update);
        let post = self.posts.update(post).await?;
        tracing::info!(post_id = %post.id, "Post updated");
        Ok(post)
    }

    async fn delete_post(&self, actor: Account, id: Uuid) -> AppResult<()> {
        self.owned_post(&actor, id).await?;
        if !self.posts.delete(id).await? {
            return Err(AppError::NotFound(ERROR_POST_NOT_FOUND.to_string()));
        }
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }
}
