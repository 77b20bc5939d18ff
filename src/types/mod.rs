//! Shared request and response types.

mod pagination;
mod response;

pub use pagination::{Paginated, PaginatedAccounts, PaginatedPosts, PaginationParams};
pub use response::{Created, HealthResponse, NoContent, WelcomeResponse};
