//! Account administration handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::api::extractors::{AdminAccount, ValidatedQuery};
use crate::api::AppState;
use crate::domain::{AccountResponse, AccountUpdate};
use crate::errors::AppResult;
use crate::types::{Paginated, PaginationParams};

/// Create account administration routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts))
        .route("/:id", get(get_account).patch(update_account))
}

/// List all accounts (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of accounts", body = crate::types::PaginatedAccounts),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    AdminAccount(_admin): AdminAccount,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<Paginated<AccountResponse>>> {
    let page = state.accounts.list_accounts(params).await?;
    Ok(Json(page.map(AccountResponse::from)))
}

/// Get an account by id (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    AdminAccount(_admin): AdminAccount,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AccountResponse>> {
    let account = state.accounts.get_account(id).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// Change an account's flags or role (admin only)
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = AccountUpdate,
    responses(
        (status = 200, description = "Account updated", body = AccountResponse),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_account(
    State(state): State<AppState>,
    AdminAccount(admin): AdminAccount,
    Path(id): Path<Uuid>,
    Json(update): Json<AccountUpdate>,
) -> AppResult<Json<AccountResponse>> {
    tracing::debug!(admin_id = %admin.id, target_id = %id, "Administrative account update");
    let account = state.accounts.update_account(id, update).await?;
    Ok(Json(AccountResponse::from(account)))
}
