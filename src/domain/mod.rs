//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod account;
pub mod password;
pub mod post;

pub use account::{Account, AccountResponse, AccountUpdate, NewAccount, ProfileUpdate, Role};
pub use password::Password;
pub use post::{NewPost, Post, PostFilter, PostStatus, PostUpdate};
