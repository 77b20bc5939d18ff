//! Application state - Dependency injection container.
//!
//! Provides handlers with the application services.

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    AccountService, AuthGuard, CredentialService, PostService, ServiceContainer, UploadService,
};

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialService>,
    pub accounts: Arc<dyn AccountService>,
    pub posts: Arc<dyn PostService>,
    pub uploads: Arc<dyn UploadService>,
    /// Bearer token resolution for the account extractors
    pub guard: Arc<AuthGuard>,
    pub app_name: String,
    pub app_version: String,
}

impl AppState {
    /// Create application state from a service container.
    pub fn from_services(services: &impl ServiceContainer, config: &Config) -> Self {
        Self {
            credentials: services.credentials(),
            accounts: services.accounts(),
            posts: services.posts(),
            uploads: services.uploads(),
            guard: services.guard(),
            app_name: config.app_name.clone(),
            app_version: config.app_version.clone(),
        }
    }
}
