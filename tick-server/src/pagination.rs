//! Pagination utilities for the sightings listing
//!
//! Out-of-range requests are rejected rather than clamped, and a page past
//! the end is valid and simply empty.

use crate::error::ApiError;

pub const DEFAULT_PER_PAGE: i64 = 50;
pub const MAX_PER_PAGE: i64 = 200;

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number (1-indexed)
    pub page: i64,
    /// Rows per page, 1..=MAX_PER_PAGE
    pub per_page: i64,
}

impl PageRequest {
    /// Validate raw `page` / `per_page` values
    pub fn new(page: i64, per_page: i64) -> Result<Self, ApiError> {
        if page < 1 {
            return Err(ApiError::BadRequest(format!(
                "page must be at least 1, got {}",
                page
            )));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(ApiError::BadRequest(format!(
                "per_page must be between 1 and {}, got {}",
                MAX_PER_PAGE, per_page
            )));
        }
        Ok(Self { page, per_page })
    }

    /// Offset for SQL LIMIT/OFFSET query
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Total page count, never less than one
///
/// # Examples
/// ```
/// use tick_server::pagination::total_pages;
///
/// assert_eq!(total_pages(250, 100), 3);
/// assert_eq!(total_pages(200, 100), 2);
/// assert_eq!(total_pages(0, 50), 1);
/// ```
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    let pages = (total + per_page - 1) / per_page;
    pages.max(1)
}
