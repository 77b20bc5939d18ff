//! Account domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_MODERATOR, ROLE_USER};
use crate::errors::AppError;

/// Account roles. Carried on every account but only advisory:
/// elevated access is decided by `is_superuser`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Moderator => ROLE_MODERATOR,
            Role::Admin => ROLE_ADMIN,
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(Role::User),
            ROLE_MODERATOR => Ok(Role::Moderator),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(AppError::validation(format!("Unknown role: {}", other))),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    /// Elevated access flag; bypasses ownership checks
    pub is_superuser: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_elevated(&self) -> bool {
        self.is_superuser
    }

    /// Apply a profile change, touching `updated_at` only when something changed.
    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        let mut changed = false;
        if let Some(email) = update.email {
            self.email = email;
            changed = true;
        }
        if let Some(username) = update.username {
            self.username = username;
            changed = true;
        }
        if changed {
            self.updated_at = Utc::now();
        }
    }

    /// Apply an administrative change.
    pub fn apply_admin(&mut self, update: AccountUpdate) {
        let mut changed = false;
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
            changed = true;
        }
        if let Some(is_superuser) = update.is_superuser {
            self.is_superuser = is_superuser;
            changed = true;
        }
        if let Some(role) = update.role {
            self.role = role;
            changed = true;
        }
        if changed {
            self.updated_at = Utc::now();
        }
    }
}

/// Data needed to insert a new account. The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub role: Role,
}

impl NewAccount {
    /// A regular, active, non-elevated account.
    pub fn regular(email: String, username: String, password_hash: String) -> Self {
        Self {
            email,
            username,
            password_hash,
            is_active: true,
            is_superuser: false,
            role: Role::User,
        }
    }
}

/// Self-service profile change
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileUpdate {
    #[schema(example = "new@example.com")]
    pub email: Option<String>,
    #[schema(example = "new_name")]
    pub username: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.username.is_none()
    }
}

/// Administrative account change
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AccountUpdate {
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub role: Option<Role>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.is_superuser.is_none() && self.role.is_none()
    }
}

/// Account response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "alice")]
    pub username: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            username: account.username,
            is_active: account.is_active,
            is_superuser: account.is_superuser,
            role: account.role,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
