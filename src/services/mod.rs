//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on repository traits, never on
//! concrete stores.

mod account_service;
mod auth_service;
pub mod container;
mod guard;
mod identity;
mod post_service;
pub mod token;
mod upload_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use account_service::{AccountManager, AccountService};
pub use auth_service::{Authenticator, CredentialService, TokenResponse};
pub use guard::{owner_or_elevated, AuthGuard};
pub use identity::IdentityPolicy;
pub use post_service::{PostManager, PostService};
pub use token::{Claims, IssuedToken, SubjectClaims, TokenCodec, TokenError};
pub use upload_service::{
    generate_file_key, sanitize_filename, validate_file_size, validate_file_type, Download,
    ObjectUploads, UploadFile, UploadResponse, UploadService,
};

#[cfg(any(test, feature = "test-utils"))]
pub use account_service::MockAccountService;
#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockCredentialService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use post_service::MockPostService;
#[cfg(any(test, feature = "test-utils"))]
pub use upload_service::MockUploadService;
