//! Custom axum extractors.

mod auth;
mod validated;

pub use auth::{ActiveAccount, AdminAccount, CurrentAccount};
pub use validated::{ValidatedJson, ValidatedQuery};
