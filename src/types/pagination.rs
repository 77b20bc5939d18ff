//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_NUMBER, MAX_PAGE_SIZE};
use crate::domain::{AccountResponse, Post};

/// Pagination query parameters, reusable across all list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    #[validate(range(min = 1, max = MAX_PAGE_NUMBER, message = "page is out of range"))]
    #[param(minimum = 1, maximum = 92233720368547758, default = 1)]
    pub page: u64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, default = 10)]
    pub page_size: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }

    /// Calculate offset for database query
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit())
    }

    /// Get limit capped at maximum
    pub fn limit(&self) -> u64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(PaginatedPosts = Paginated<Post>, PaginatedAccounts = Paginated<AccountResponse>)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let page_size = params.limit();
        Self {
            items,
            total,
            page: params.page,
            page_size,
            total_pages: total.div_ceil(page_size),
        }
    }

    /// Convert items while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PaginationParams::new(1, 10).offset(), 0);
        assert_eq!(PaginationParams::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_offset_saturates_for_huge_pages() {
        assert_eq!(PaginationParams::new(u64::MAX, 100).offset(), u64::MAX);
    }

    #[test]
    fn test_page_upper_bound_keeps_offset_in_sql_range() {
        let last = PaginationParams::new(MAX_PAGE_NUMBER, MAX_PAGE_SIZE);
        assert!(last.validate().is_ok());
        assert!(last.offset() <= i64::MAX as u64);
        assert!(PaginationParams::new(MAX_PAGE_NUMBER + 1, 10).validate().is_err());
        assert!(PaginationParams::new(u64::MAX, 100).validate().is_err());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let params = PaginationParams::new(1, 10);
        assert_eq!(Paginated::<u8>::new(vec![], &params, 0).total_pages, 0);
        assert_eq!(Paginated::<u8>::new(vec![], &params, 10).total_pages, 1);
        assert_eq!(Paginated::<u8>::new(vec![], &params, 11).total_pages, 2);
    }

    #[test]
    fn test_validation_bounds() {
        assert!(PaginationParams::new(1, 100).validate().is_ok());
        assert!(PaginationParams::new(0, 10).validate().is_err());
        assert!(PaginationParams::new(1, 0).validate().is_err());
        assert!(PaginationParams::new(1, 101).validate().is_err());
    }

    #[test]
    fn test_defaults_from_empty_query() {
        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, PaginationParams::default());
        assert_eq!(params.page_size, 10);
    }
}
