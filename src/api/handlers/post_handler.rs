//! Post handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{ActiveAccount, ValidatedJson, ValidatedQuery};
use crate::api::AppState;
use crate::config::MAX_TITLE_LENGTH;
use crate::domain::{Post, PostFilter, PostStatus, PostUpdate};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Paginated, PaginationParams};

/// Post creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "Title must be between 1 and 200 characters"))]
    #[schema(example = "My first post", min_length = 1, max_length = 200)]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    #[schema(example = "Hello, world.")]
    pub content: String,
    #[serde(default)]
    pub status: PostStatus,
}

/// Partial post update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,
    pub status: Option<PostStatus>,
}

/// Listing options for the public post feed
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostListQuery {
    /// Only published posts (default true)
    #[serde(default = "default_published_only")]
    pub published_only: bool,
    /// Restrict to one author
    pub author_id: Option<Uuid>,
}

fn default_published_only() -> bool {
    true
}

/// Create post routes
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/me", get(list_my_posts))
        .route("/:id", get(get_post).put(update_post).delete(delete_post))
}

/// List posts, newest first
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "Posts",
    params(PaginationParams, PostListQuery),
    responses(
        (status = 200, description = "Page of posts", body = crate::types::PaginatedPosts),
        (status = 422, description = "Invalid pagination parameters")
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    Query(query): Query<PostListQuery>,
) -> AppResult<Json<Paginated<Post>>> {
    let filter = PostFilter {
        author_id: query.author_id,
        published_only: query.published_only,
    };
    let page = state.posts.list_posts(params, filter).await?;
    Ok(Json(page))
}

/// List the caller's posts in every status
#[utoipa::path(
    get,
    path = "/api/v1/posts/me",
    tag = "Posts",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of the caller's posts", body = crate::types::PaginatedPosts),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_my_posts(
    State(state): State<AppState>,
    ActiveAccount(account): ActiveAccount,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Post>>> {
    let filter = PostFilter {
        author_id: Some(account.id),
        published_only: false,
    };
    let page = state.posts.list_posts(params, filter).await?;
    Ok(Json(page))
}

/// Create a post owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "Posts",
    security(("bearer_auth" = [])),
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    ActiveAccount(account): ActiveAccount,
    ValidatedJson(payload): ValidatedJson<CreatePostRequest>,
) -> AppResult<Created<Post>> {
    let post = state
        .posts
        .create_post(account, payload.title, payload.content, payload.status)
        .await?;
    Ok(Created(post))
}

/// Get a post by id
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Post>> {
    Ok(Json(state.posts.get_post(id).await?))
}

/// Update a post (owner or superuser)
#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    tag = "Posts",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Post id")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 403, description = "Not the post owner"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    ActiveAccount(account): ActiveAccount,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePostRequest>,
) -> AppResult<Json<Post>> {
    let update = PostUpdate {
        title: payload.title,
        content: payload.content,
        status: payload.status,
    };
    Ok(Json(state.posts.update_post(account, id, update).await?))
}

/// Delete a post (owner or superuser)
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    tag = "Posts",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Not the post owner"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    ActiveAccount(account): ActiveAccount,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.posts.delete_post(account, id).await?;
    Ok(NoContent)
}
