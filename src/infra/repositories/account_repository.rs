//! Account repository backed by SeaORM.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, Unchanged,
};
use uuid::Uuid;

use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use crate::config::{ERROR_USERNAME_ALREADY_EXISTS, ERROR_USER_ALREADY_EXISTS, ERROR_USER_NOT_FOUND};
use crate::domain::{Account, AccountUpdate, NewAccount, ProfileUpdate};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account persistence boundary.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    /// Insert a new account; the store assigns id and timestamps.
    /// A unique-index violation surfaces as `AlreadyExists`.
    async fn insert(&self, account: NewAccount) -> AppResult<Account>;

    /// Write only email and username (those given) plus `updated_at`.
    /// Flags, role and password hash are left as stored.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Account>;

    /// Write only the given flags and role plus `updated_at`.
    async fn update_flags(&self, id: Uuid, update: AccountUpdate) -> AppResult<Account>;

    /// Oldest first, with the total row count.
    async fn list(&self, offset: u64, limit: u64) -> AppResult<(Vec<Account>, u64)>;
}

/// SeaORM implementation of [`AccountRepository`]
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Update the `Set` columns of `active`; `NotSet` columns keep their stored value.
    async fn write_columns(&self, active: ActiveModel) -> AppResult<Account> {
        match active.update(&self.db).await {
            Ok(model) => Account::try_from(model),
            Err(DbErr::RecordNotUpdated) => {
                Err(AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()))
            }
            Err(err) => Err(map_unique_violation(err)),
        }
    }
}

/// Map a unique-index violation to the matching conflict message.
pub(crate) fn map_unique_violation(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            if detail.contains("username") {
                AppError::already_exists(ERROR_USERNAME_ALREADY_EXISTS)
            } else {
                AppError::already_exists(ERROR_USER_ALREADY_EXISTS)
            }
        }
        _ => AppError::from(err),
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        AccountEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        AccountEntity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        AccountEntity::find()
            .filter(account::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn insert(&self, account: NewAccount) -> AppResult<Account> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(account.email),
            username: Set(account.username),
            password_hash: Set(account.password_hash),
            is_active: Set(account.is_active),
            is_superuser: Set(account.is_superuser),
            role: Set(account.role.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(map_unique_violation)?;
        Account::try_from(model)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Account> {
        let mut active = ActiveModel {
            id: Unchanged(id),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        if let Some(email) = update.email {
            active.email = Set(email);
        }
        if let Some(username) = update.username {
            active.username = Set(username);
        }
        self.write_columns(active).await
    }

    async fn update_flags(&self, id: Uuid, update: AccountUpdate) -> AppResult<Account> {
        let mut active = ActiveModel {
            id: Unchanged(id),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        if let Some(is_active) = update.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(is_superuser) = update.is_superuser {
            active.is_superuser = Set(is_superuser);
        }
        if let Some(role) = update.role {
            active.role = Set(role.to_string());
        }
        self.write_columns(active).await
    }

    async fn list(&self, offset: u64, limit: u64) -> AppResult<(Vec<Account>, u64)> {
        let total = AccountEntity::find().count(&self.db).await?;
        let models = AccountEntity::find()
            .order_by_asc(account::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        let accounts = models
            .into_iter()
            .map(Account::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((accounts, total))
    }
}
