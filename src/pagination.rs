use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A validated page request (`page >= 1`, `page_size >= 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Result<Self, AppError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(AppError::ValidationError(
                "Page must be at least 1".to_string(),
            ));
        }
        if page_size < 1 {
            return Err(AppError::ValidationError(
                "Page size must be at least 1".to_string(),
            ));
        }

        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Rows to skip; never negative.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size).max(0)
    }
}

/// Pagination block of a listing response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Expenses matching the filter across all pages
    #[schema(example = 42)]
    pub total_count: i64,
    /// `ceil(totalCount / pageSize)`, 0 for an empty result
    #[schema(example = 5)]
    pub total_pages: i64,
    /// Requested page, passed through even when past the end
    #[schema(example = 1)]
    pub current_page: i64,
    #[schema(example = 10)]
    pub page_size: i64,
    #[schema(example = 2)]
    pub next_page: Option<i64>,
    pub prev_page: Option<i64>,
}

impl Pagination {
    pub fn calculate(total_count: i64, request: PageRequest) -> Self {
        let total_count = total_count.max(0);
        let page_size = request.limit();
        let total_pages = total_count / page_size + i64::from(total_count % page_size != 0);
        let current_page = request.page();

        let in_range = |page: i64| (1..=total_pages).contains(&page);
        let next = current_page.checked_add(1).filter(|p| in_range(*p));
        let prev = current_page.checked_sub(1).filter(|p| in_range(*p));

        Self {
            total_count,
            total_pages,
            current_page,
            page_size,
            next_page: next,
            prev_page: prev,
        }
    }
}
