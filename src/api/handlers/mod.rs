//! HTTP request handlers.

pub mod account_handler;
pub mod auth_handler;
pub mod post_handler;
pub mod upload_handler;

pub use account_handler::account_routes;
pub use auth_handler::auth_routes;
pub use post_handler::post_routes;
pub use upload_handler::upload_routes;
