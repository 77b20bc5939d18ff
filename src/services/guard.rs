//! Authorization guard - bearer token to authenticated account.

use std::sync::Arc;

use uuid::Uuid;

use super::token::TokenCodec;
use crate::domain::Account;
use crate::errors::{AppError, AppResult};
use crate::infra::AccountRepository;

/// Resolves session tokens into accounts and applies access checks.
pub struct AuthGuard {
    tokens: Arc<TokenCodec>,
    accounts: Arc<dyn AccountRepository>,
}

impl AuthGuard {
    pub fn new(tokens: Arc<TokenCodec>, accounts: Arc<dyn AccountRepository>) -> Self {
        Self { tokens, accounts }
    }

    /// Decode the token and load its subject. Every failure is `Unauthenticated`.
    pub async fn resolve_identity(&self, token: &str) -> AppResult<Account> {
        let claims = self.tokens.decode(token).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            AppError::Unauthenticated
        })?;

        let email = claims.sub.ok_or(AppError::Unauthenticated)?;

        self.accounts
            .find_by_email(&email)
            .await?
            .ok_or(AppError::Unauthenticated)
    }

    pub fn require_active(account: Account) -> AppResult<Account> {
        if account.is_active {
            Ok(account)
        } else {
            Err(AppError::InactiveAccount)
        }
    }

    pub fn require_elevated(account: Account) -> AppResult<Account> {
        if account.is_elevated() {
            Ok(account)
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }

    /// Active account for a bearer token.
    pub async fn active(&self, token: &str) -> AppResult<Account> {
        Self::require_active(self.resolve_identity(token).await?)
    }

    /// Active, elevated account for a bearer token.
    pub async fn elevated(&self, token: &str) -> AppResult<Account> {
        Self::require_elevated(self.active(token).await?)
    }
}

/// Elevated accounts bypass ownership.
pub fn owner_or_elevated(owner_id: Uuid, account: &Account) -> bool {
    account.is_elevated() || owner_id == account.id
}
