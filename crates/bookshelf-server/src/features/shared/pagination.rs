//! Shared pagination utilities
//!
//! Catalog listings use 1-indexed pages with a default of 12 books per page.
//!
//! ```rust,ignore
//! let params = PageParams::new(Some(2), Some(12));
//! params.validate()?;
//! let (books, total) = catalog.list(&filter, params.limit(), params.offset()).await?;
//! let summary = PageSummary::new(params.page(), params.limit(), total);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of books per page
pub const DEFAULT_PAGE_LIMIT: i64 = 12;

/// Largest page a client may request
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be 1 or greater")]
    InvalidPage,

    #[error("limit must be between 1 and {max}")]
    InvalidLimit { max: i64 },
}

/// Page request parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// Page number (1-indexed), defaulting to 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, defaulting to 12 and clamped to 1-100
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
    }

    /// Offset for the SQL OFFSET clause
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Out-of-range values are rejected rather than clamped
    pub fn validate(&self) -> Result<(), PaginationError> {
        if matches!(self.page, Some(page) if page < 1) {
            return Err(PaginationError::InvalidPage);
        }
        if matches!(self.limit, Some(limit) if !(1..=MAX_PAGE_LIMIT).contains(&limit)) {
            return Err(PaginationError::InvalidLimit {
                max: MAX_PAGE_LIMIT,
            });
        }
        Ok(())
    }
}

/// Totals reported alongside a page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub total_count: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

impl PageSummary {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            (total + limit - 1) / limit
        };

        Self {
            total_count: total,
            current_page: page,
            total_pages,
        }
    }
}
