//! Pagination arithmetic for listing pages.
//!
//! Query strings arrive untyped; [`PageRequest::from_query`] parses them and
//! falls back to [`DEFAULT_PAGE`] / [`DEFAULT_LIMIT`] for anything missing,
//! malformed, zero or negative. Offsets are therefore never negative.

use serde::Serialize;

/// Restaurants per listing page when the caller gives no usable limit.
pub const DEFAULT_LIMIT: i64 = 9;

/// First page (pages are 1-indexed).
pub const DEFAULT_PAGE: i64 = 1;

/// Maximum number of page links shown in the navigation bar.
pub const PAGE_WINDOW: i64 = 10;

/// A sanitized page/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-indexed page number, always positive.
    pub page: i64,
    /// Page size, always positive.
    pub limit: i64,
}

impl PageRequest {
    /// Build a request, replacing non-positive values with the defaults.
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: if page > 0 { page } else { DEFAULT_PAGE },
            limit: if limit > 0 { limit } else { DEFAULT_LIMIT },
        }
    }

    /// Parse raw `page` and `limit` query values.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Number of rows to skip for this page.
    pub fn offset(&self) -> i64 {
        offset(self.limit, self.page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Parse a strictly positive integer, `None` for anything else.
pub fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
}

/// `limit * (page - 1)`, clamped at zero.
pub fn offset(limit: i64, page: i64) -> i64 {
    limit.max(0).saturating_mul((page - 1).max(0))
}

/// Pagination descriptor handed to templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Page numbers to link, ascending, at most [`PAGE_WINDOW`] entries.
    pub pages: Vec<i64>,
    /// `ceil(total_count / limit)`.
    pub total_pages: i64,
    /// The requested page, echoed back.
    pub current_page: i64,
    /// Target of the "previous" link.
    pub prev: i64,
    /// Target of the "next" link.
    pub next: i64,
    /// Whether a page before the current one exists.
    pub has_prev: bool,
    /// Whether a page after the current one exists.
    pub has_next: bool,
    /// Matching rows before paging.
    pub total_count: i64,
    /// Page size used.
    pub limit: i64,
}

impl Pagination {
    /// Compute the descriptor for `total_count` rows split in pages of `limit`.
    pub fn new(limit: i64, page: i64, total_count: i64) -> Self {
        let request = PageRequest::new(page, limit);
        let total_count = total_count.max(0);
        let total_pages = page_count(total_count, request.limit);
        let current_page = request.page;

        Self {
            pages: page_window(current_page, total_pages),
            total_pages,
            current_page,
            prev: (current_page - 1).max(1),
            next: current_page.saturating_add(1).min(total_pages.max(1)),
            has_prev: current_page > 1,
            has_next: current_page < total_pages,
            total_count,
            limit: request.limit,
        }
    }
}

/// `ceil(total_count / limit)` for a positive limit.
pub fn page_count(total_count: i64, limit: i64) -> i64 {
    if limit <= 0 || total_count <= 0 {
        return 0;
    }
    total_count / limit + i64::from(total_count % limit != 0)
}

/// Page numbers around `current`, clamped to `1..=total_pages`.
fn page_window(current: i64, total_pages: i64) -> Vec<i64> {
    if total_pages <= 0 {
        return Vec::new();
    }
    if total_pages <= PAGE_WINDOW {
        return (1..=total_pages).collect();
    }

    let start = (current - PAGE_WINDOW / 2).clamp(1, total_pages - PAGE_WINDOW + 1);
    (start..start + PAGE_WINDOW).collect()
}
