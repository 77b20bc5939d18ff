//! Post repository backed by SeaORM.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::post::{self, ActiveModel, Entity as PostEntity};
use crate::config::{ERROR_POST_NOT_FOUND, POST_STATUS_PUBLISHED};
use crate::domain::{NewPost, Post, PostFilter};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Post persistence boundary.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Post>>;

    async fn insert(&self, post: NewPost) -> AppResult<Post>;

    async fn update(&self, post: Post) -> AppResult<Post>;

    /// Returns false when no row was deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Newest first, with the total count matching the filter.
    async fn list(
        &self,
        filter: PostFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Post>, u64)>;
}

/// SeaORM implementation of [`PostRepository`]
pub struct PostStore {
    db: DatabaseConnection,
}

impl PostStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn filter_condition(filter: PostFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(author_id) = filter.author_id {
        condition = condition.add(post::Column::AuthorId.eq(author_id));
    }
    if filter.published_only {
        condition = condition
            .add(post::Column::IsPublished.eq(true))
            .add(post::Column::Status.eq(POST_STATUS_PUBLISHED));
    }
    condition
}

#[async_trait]
impl PostRepository for PostStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Post>> {
        PostEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Post::try_from)
            .transpose()
    }

    async fn insert(&self, post: NewPost) -> AppResult<Post> {
        let now = chrono::Utc::now();
        let is_published = post.is_published();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(post.title),
            content: Set(post.content),
            status: Set(post.status.to_string()),
            is_published: Set(is_published),
            author_id: Set(post.author_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Post::try_from(model)
    }

    async fn update(&self, post: Post) -> AppResult<Post> {
        let existing = PostEntity::find_by_id(post.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_POST_NOT_FOUND.to_string()))?;

        let mut active: ActiveModel = existing.into();
        active.title = Set(post.title);
        active.content = Set(post.content);
        active.status = Set(post.status.to_string());
        active.is_published = Set(post.is_published);
        active.updated_at = Set(post.updated_at);

        let model = active.update(&self.db).await?;
        Post::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = PostEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list(
        &self,
        filter: PostFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Post>, u64)> {
        let condition = filter_condition(filter);
        let total = PostEntity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await?;

        let models = PostEntity::find()
            .filter(condition)
            .order_by_desc(post::Column::CreatedAt)
            .offset(params.offset())
            .limit(params.limit())
            .all(&self.db)
            .await?;

        let posts = models
            .into_iter()
            .map(Post::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((posts, total))
    }
}
