//! Page/page-size conversion to limit/offset, and result metadata.

use serde::{Deserialize, Serialize};

/// Page used when the requested page is not a positive number.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the requested page size is not a positive number.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationParams {
    /// Creates normalized parameters.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }.normalize()
    }

    /// Replaces non-positive values with their defaults.
    pub fn normalize(self) -> Self {
        Self {
            page: if self.page == 0 { DEFAULT_PAGE } else { self.page },
            page_size: if self.page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                self.page_size
            },
        }
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip. Saturates instead of overflowing on absurd pages.
    pub fn offset(&self) -> u32 {
        self.page_size.saturating_mul(self.page.saturating_sub(1))
    }
}

/// Metadata describing a page of results.
///
/// Serializes as `{"page", "page_count", "page_size", "size"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResult {
    pub page: u32,
    pub page_count: u32,
    pub page_size: u32,
    pub size: u32,
}

impl PaginationResult {
    /// Builds the result for `size` matching rows under `params`.
    pub fn new(params: PaginationParams, size: u32) -> Self {
        let params = params.normalize();
        Self {
            page: params.page,
            page_count: size.div_ceil(params.page_size),
            page_size: params.page_size,
            size,
        }
    }
}
