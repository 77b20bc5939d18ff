//! Service container - wires repositories, token codec and storage into
//! the application services.

use std::sync::Arc;

use object_store::ObjectStore;
use sea_orm::DatabaseConnection;

use super::{
    AccountManager, AccountService, AuthGuard, Authenticator, CredentialService, IdentityPolicy,
    ObjectUploads, PostManager, PostService, TokenCodec, UploadService,
};
use crate::config::Config;
use crate::infra::{AccountRepository, AccountStore, PostRepository, PostStore};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn credentials(&self) -> Arc<dyn CredentialService>;

    fn accounts(&self) -> Arc<dyn AccountService>;

    fn posts(&self) -> Arc<dyn PostService>;

    fn uploads(&self) -> Arc<dyn UploadService>;

    fn guard(&self) -> Arc<AuthGuard>;
}

/// Concrete implementation of [`ServiceContainer`]
#[derive(Clone)]
pub struct Services {
    credentials: Arc<dyn CredentialService>,
    accounts: Arc<dyn AccountService>,
    posts: Arc<dyn PostService>,
    uploads: Arc<dyn UploadService>,
    guard: Arc<AuthGuard>,
}

impl Services {
    /// Build every service over the given stores.
    pub fn from_parts(
        account_repo: Arc<dyn AccountRepository>,
        post_repo: Arc<dyn PostRepository>,
        storage: Arc<dyn ObjectStore>,
        config: &Config,
    ) -> Self {
        let tokens = Arc::new(TokenCodec::new(&config.auth));
        let identity = IdentityPolicy::new(config.case_insensitive_identities);

        Self {
            credentials: Arc::new(Authenticator::new(
                account_repo.clone(),
                tokens.clone(),
                identity,
            )),
            accounts: Arc::new(AccountManager::new(account_repo.clone(), identity)),
            posts: Arc::new(PostManager::new(post_repo)),
            uploads: Arc::new(ObjectUploads::new(storage, &config.storage)),
            guard: Arc::new(AuthGuard::new(tokens, account_repo)),
        }
    }

    /// Build services over SeaORM stores on `db`.
    pub fn from_connection(
        db: DatabaseConnection,
        storage: Arc<dyn ObjectStore>,
        config: &Config,
    ) -> Self {
        Self::from_parts(
            Arc::new(AccountStore::new(db.clone())),
            Arc::new(PostStore::new(db)),
            storage,
            config,
        )
    }
}

impl ServiceContainer for Services {
    fn credentials(&self) -> Arc<dyn CredentialService> {
        self.credentials.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountService> {
        self.accounts.clone()
    }

    fn posts(&self) -> Arc<dyn PostService> {
        self.posts.clone()
    }

    fn uploads(&self) -> Arc<dyn UploadService> {
        self.uploads.clone()
    }

    fn guard(&self) -> Arc<AuthGuard> {
        self.guard.clone()
    }
}
