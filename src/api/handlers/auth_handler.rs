//! Authentication handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{ActiveAccount, ValidatedJson};
use crate::api::AppState;
use crate::config::{MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH};
use crate::domain::{AccountResponse, ProfileUpdate};
use crate::errors::AppResult;
use crate::services::TokenResponse;
use crate::types::Created;

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Public handle
    #[validate(length(min = MIN_USERNAME_LENGTH, max = MAX_USERNAME_LENGTH, message = "Username must be between 3 and 50 characters"))]
    #[schema(example = "alice", min_length = 3, max_length = 50)]
    pub username: String,
    /// Password (minimum 8 characters)
    #[validate(length(min = MIN_PASSWORD_LENGTH, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "new@example.com")]
    pub email: Option<String>,
    #[validate(length(min = MIN_USERNAME_LENGTH, max = MAX_USERNAME_LENGTH, message = "Username must be between 3 and 50 characters"))]
    #[schema(example = "alice_b")]
    pub username: Option<String>,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(get_me).patch(update_me))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account registered", body = AccountResponse),
        (status = 409, description = "Email or username already taken"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<AccountResponse>> {
    let account = state
        .credentials
        .register(payload.email, payload.username, payload.password)
        .await?;

    Ok(Created(AccountResponse::from(account)))
}

/// Login and get an access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials or inactive account"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .credentials
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(token))
}

/// Get the authenticated account
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 400, description = "Inactive account"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_me(ActiveAccount(account): ActiveAccount) -> Json<AccountResponse> {
    Json(AccountResponse::from(account))
}

/// Update the authenticated account's email or username
#[utoipa::path(
    patch,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = AccountResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Email or username already taken"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    ActiveAccount(account): ActiveAccount,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<AccountResponse>> {
    let update = ProfileUpdate {
        email: payload.email,
        username: payload.username,
    };
    let account = state.accounts.update_profile(account, update).await?;

    Ok(Json(AccountResponse::from(account)))
}
