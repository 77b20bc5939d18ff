//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Object storage backends

pub mod db;
pub mod repositories;
pub mod storage;

pub use db::{Database, Migrator};
pub use repositories::{AccountRepository, AccountStore, PostRepository, PostStore};
pub use storage::build_object_store;

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockAccountRepository, MockPostRepository};
