//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{account_handler, auth_handler, post_handler, upload_handler};
use crate::api::routes;
use crate::domain::{AccountResponse, AccountUpdate, Post, PostStatus, Role};
use crate::services::{TokenResponse, UploadResponse};
use crate::types::{HealthResponse, PaginatedAccounts, PaginatedPosts, WelcomeResponse};

/// OpenAPI documentation for the Blog API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blog API",
        description = "Blog backend with token-based session auth, ownership-scoped posts and file uploads",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        routes::root,
        routes::health,
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::get_me,
        auth_handler::update_me,
        // Account administration
        account_handler::list_accounts,
        account_handler::get_account,
        account_handler::update_account,
        // Posts
        post_handler::list_posts,
        post_handler::list_my_posts,
        post_handler::create_post,
        post_handler::get_post,
        post_handler::update_post,
        post_handler::delete_post,
        // Uploads
        upload_handler::upload_file,
        upload_handler::download_file,
        upload_handler::delete_file,
    ),
    components(
        schemas(
            Role,
            AccountResponse,
            AccountUpdate,
            PostStatus,
            Post,
            PaginatedAccounts,
            PaginatedPosts,
            TokenResponse,
            UploadResponse,
            WelcomeResponse,
            HealthResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::UpdateProfileRequest,
            post_handler::CreatePostRequest,
            post_handler::UpdatePostRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service banner and liveness"),
        (name = "Authentication", description = "Registration, login and the current account"),
        (name = "Users", description = "Account administration"),
        (name = "Posts", description = "Blog posts"),
        (name = "Uploads", description = "File storage")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for bearer token authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token obtained from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}
