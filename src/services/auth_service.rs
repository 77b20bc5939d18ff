//! Credential service - registration, credential checks and login.
//!
//! Password handling lives in the domain `Password` value object; token
//! signing in `TokenCodec`. This service only orchestrates them.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::identity::{ensure_available, IdentityPolicy};
use super::token::{SubjectClaims, TokenCodec, TokenError};
use crate::config::{ERROR_INACTIVE_ACCOUNT_LOGIN, TOKEN_TYPE_BEARER};
use crate::domain::{Account, NewAccount, Password};
use crate::errors::{AppError, AppResult};
use crate::infra::AccountRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Verified against when the email is unknown, so both paths cost one hash.
static DUMMY_HASH: Lazy<Password> = Lazy::new(|| {
    Password::hash("timing-equalizer-not-a-real-password").unwrap_or_else(|e| {
        tracing::error!("Failed to prepare dummy password hash: {}", e);
        Password::from_hash(String::new())
    })
});

/// Token response returned after successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 1800)]
    pub expires_in: i64,
}

/// Credential service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Create a regular, active account.
    async fn register(&self, email: String, username: String, password: String)
        -> AppResult<Account>;

    /// `None` for an unknown email or a wrong password, indistinguishably.
    async fn authenticate(&self, email: String, password: String) -> AppResult<Option<Account>>;

    /// Authenticate an active account and issue a session token.
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;
}

/// Concrete implementation of [`CredentialService`]
pub struct Authenticator {
    accounts: Arc<dyn AccountRepository>,
    tokens: Arc<TokenCodec>,
    identity: IdentityPolicy,
}

impl Authenticator {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        tokens: Arc<TokenCodec>,
        identity: IdentityPolicy,
    ) -> Self {
        Self {
            accounts,
            tokens,
            identity,
        }
    }
}

#[async_trait]
impl CredentialService for Authenticator {
    async fn register(
        &self,
        email: String,
        username: String,
        password: String,
    ) -> AppResult<Account> {
        let email = self.identity.normalize(&email);
        let username = self.identity.normalize(&username);

        ensure_available(self.accounts.as_ref(), Some(&email), Some(&username), None).await?;

        let password_hash = Password::hash(&password)?.into_string();
        let account = self
            .accounts
            .insert(NewAccount::regular(email, username, password_hash))
            .await?;

        tracing::info!(account_id = %account.id, "Account registered");
        Ok(account)
    }

    async fn authenticate(&self, email: String, password: String) -> AppResult<Option<Account>> {
        let email = self.identity.normalize(&email);

        let Some(account) = self.accounts.find_by_email(&email).await? else {
            DUMMY_HASH.verify(&password);
            return Ok(None);
        };

        if Password::from_hash(account.password_hash.as_str()).verify(&password) {
            Ok(Some(account))
        } else {
            Ok(None)
        }
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let Some(account) = self.authenticate(email, password).await? else {
            tracing::warn!("Login rejected: invalid credentials");
            return Err(AppError::invalid_credentials());
        };

        if !account.is_active {
            tracing::warn!(account_id = %account.id, "Login rejected: inactive account");
            return Err(AppError::InvalidCredentials(
                ERROR_INACTIVE_ACCOUNT_LOGIN.to_string(),
            ));
        }

        let issued = self
            .tokens
            .issue(&SubjectClaims::for_account(&account.email, account.id), None)
            .map_err(|e: TokenError| AppError::internal(e.to_string()))?;

        tracing::info!(account_id = %account.id, "Login succeeded");
        Ok(TokenResponse {
            access_token: issued.token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: issued.expires_in,
        })
    }
}
