//! Account service - profile changes and administration.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::identity::{ensure_available, IdentityPolicy};
use crate::config::ERROR_USER_NOT_FOUND;
use crate::domain::{Account, AccountUpdate, ProfileUpdate};
use crate::errors::{AppResult, OptionExt};
use crate::infra::AccountRepository;
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn get_account(&self, id: Uuid) -> AppResult<Account>;

    async fn list_accounts(&self, params: PaginationParams) -> AppResult<Paginated<Account>>;

    /// Self-service email/username change with the registration uniqueness rules.
    async fn update_profile(&self, account: Account, update: ProfileUpdate) -> AppResult<Account>;

    /// Administrative change of flags and role.
    async fn update_account(&self, id: Uuid, update: AccountUpdate) -> AppResult<Account>;
}

pub struct AccountManager {
    accounts: Arc<dyn AccountRepository>,
    identity: IdentityPolicy,
}

impl AccountManager {
    pub fn new(accounts: Arc<dyn AccountRepository>, identity: IdentityPolicy) -> Self {
        Self { accounts, identity }
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn get_account(&self, id: Uuid) -> AppResult<Account> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_not_found(ERROR_USER_NOT_FOUND)
    }

    async fn list_accounts(&self, params: PaginationParams) -> AppResult<Paginated<Account>> {
        let (items, total) = self.accounts.list(params.offset(), params.limit()).await?;
        Ok(Paginated::new(items, &params, total))
    }

    async fn update_profile(&self, account: Account, update: ProfileUpdate) -> AppResult<Account> {
        let update = ProfileUpdate {
            email: update.email.map(|e| self.identity.normalize(&e)),
            username: update.username.map(|u| self.identity.normalize(&u)),
        };

        ensure_available(
            self.accounts.as_ref(),
            update.email.as_deref(),
            update.username.as_deref(),
            Some(account.id),
        )
        .await?;

        // `account` may be stale; only the changed columns are written.
        if update.is_empty() {
            return self.get_account(account.id).await;
        }
        let updated = self.accounts.update_profile(account.id, update).await?;
        tracing::info!(account_id = %updated.id, "Profile updated");
        Ok(updated)
    }

    async fn update_account(&self, id: Uuid, update: AccountUpdate) -> AppResult<Account> {
        if update.is_empty() {
            return self.get_account(id).await;
        }
        let updated = self.accounts.update_flags(id, update).await?;
        tracing::info!(
            account_id = %updated.id,
            is_active = updated.is_active,
            is_superuser = updated.is_superuser,
            role = %updated.role,
            "Account updated by administrator"
        );
        Ok(updated)
    }
}
