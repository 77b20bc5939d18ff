//! Account extractors backed by the authorization guard.
//!
//! Each reads `Authorization: Bearer <token>`. A missing or non-bearer
//! header is `Unauthenticated`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::api::AppState;
use crate::domain::Account;
use crate::errors::AppError;
use crate::services::AuthGuard;

async fn bearer_token(parts: &mut Parts, state: &AppState) -> Result<String, AppError> {
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthenticated)?;
    Ok(bearer.token().to_string())
}

/// Any account holding a valid token, active or not.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// An active account.
#[derive(Debug, Clone)]
pub struct ActiveAccount(pub Account);

/// An active, elevated account.
#[derive(Debug, Clone)]
pub struct AdminAccount(pub Account);

#[async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state).await?;
        state.guard.resolve_identity(&token).await.map(Self)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ActiveAccount {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentAccount(account) = CurrentAccount::from_request_parts(parts, state).await?;
        AuthGuard::require_active(account).map(Self)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminAccount {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ActiveAccount(account) = ActiveAccount::from_request_parts(parts, state).await?;
        AuthGuard::require_elevated(account).map(Self)
    }
}
