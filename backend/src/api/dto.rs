//! Shared Data Transfer Objects (DTOs) for API handlers.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::services::access_point_query::Page;

/// Largest page a client may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination metadata for list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
    /// Total number of items across all pages
    pub total: i64,
    /// Total number of pages
    pub total_pages: u32,
}

impl Pagination {
    /// Create pagination metadata from the page served and the total count.
    pub fn from_page_and_total(page: Page, total: i64) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            ((total as f64) / (page.per_page as f64)).ceil() as u32
        };

        Self {
            page: page.page,
            per_page: page.per_page,
            total,
            total_pages,
        }
    }
}

/// Query parameters for paginated list requests.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Requested page number (default: 1)
    pub page: Option<u32>,
    /// Requested items per page (default: configured page size)
    pub per_page: Option<u32>,
}

impl PaginationQuery {
    /// Resolve to a page, falling back to `default_per_page`.
    pub fn to_page(&self, default_per_page: u32) -> Page {
        let per_page = self
            .per_page
            .unwrap_or(default_per_page)
            .clamp(1, MAX_PER_PAGE);
        Page::new(self.page.unwrap_or(1), per_page)
    }
}
