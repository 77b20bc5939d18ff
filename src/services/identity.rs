//! Identity normalization and uniqueness checks shared by registration
//! and profile updates.

use uuid::Uuid;

use crate::config::{ERROR_USERNAME_ALREADY_EXISTS, ERROR_USER_ALREADY_EXISTS};
use crate::errors::{AppError, AppResult};
use crate::infra::AccountRepository;

/// How emails and usernames are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityPolicy {
    case_insensitive: bool,
}

impl IdentityPolicy {
    pub fn new(case_insensitive: bool) -> Self {
        Self { case_insensitive }
    }

    /// Canonical form used for every lookup and insert.
    pub fn normalize(&self, value: &str) -> String {
        if self.case_insensitive {
            value.to_lowercase()
        } else {
            value.to_string()
        }
    }
}

/// Fail with `AlreadyExists` when another account holds the email or username.
///
/// Email is checked first. `owner` is the account allowed to keep its own
/// values. The unique indexes remain the final arbiter under concurrency.
pub(crate) async fn ensure_available(
    repo: &dyn AccountRepository,
    email: Option<&str>,
    username: Option<&str>,
    owner: Option<Uuid>,
) -> AppResult<()> {
    let taken_by_other = |id: Uuid| owner != Some(id);

    if let Some(email) = email {
        if let Some(existing) = repo.find_by_email(email).await? {
            if taken_by_other(existing.id) {
                return Err(AppError::already_exists(ERROR_USER_ALREADY_EXISTS));
            }
        }
    }

    if let Some(username) = username {
        if let Some(existing) = repo.find_by_username(username).await? {
            if taken_by_other(existing.id) {
                return Err(AppError::already_exists(ERROR_USERNAME_ALREADY_EXISTS));
            }
        }
    }

    Ok(())
}
