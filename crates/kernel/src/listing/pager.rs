//! Pagination state for listings.
//!
//! Each listing page reads its page number from its own query parameter
//! (`page<ID>`), so several listings can share one response.

use serde::{Deserialize, Serialize};

/// Pagination context handed to the item template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Query parameter carrying this listing's page number.
    pub param_name: String,

    /// Current page number (0-indexed).
    pub page: u32,

    /// Items per page (0 = unlimited).
    pub per_page: u32,

    /// Matching items before visibility filtering.
    pub total: u64,

    /// Total number of pages.
    pub total_pages: u32,

    /// Whether there's a next page.
    pub has_next: bool,

    /// Whether there's a previous page.
    pub has_prev: bool,
}

impl Pagination {
    /// Build the pagination state for a page of `total` matches.
    pub fn new(param_name: String, page: u32, per_page: u32, total: u64) -> Self {
        if per_page == 0 {
            return Self {
                param_name,
                page: 0,
                per_page,
                total,
                total_pages: 1,
                has_next: false,
                has_prev: false,
            };
        }

        let total_pages = u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX);

        Self {
            param_name,
            page,
            per_page,
            total,
            total_pages,
            has_next: page.saturating_add(1) < total_pages,
            has_prev: page > 0,
        }
    }

    /// Parameter name for a listing page id.
    pub fn param_name_for(prefix: &str, page_id: i64) -> String {
        format!("{prefix}{page_id}")
    }

    /// Link to `page` relative to `base_path`, keeping any existing query string.
    pub fn link(&self, base_path: &str, page: u32) -> String {
        let separator = if base_path.contains('?') { '&' } else { '?' };
        format!(
            "{base_path}{separator}{}={page}",
            urlencoding::encode(&self.param_name)
        )
    }

    pub fn next_link(&self, base_path: &str) -> Option<String> {
        self.has_next.then(|| self.link(base_path, self.page + 1))
    }

    pub fn prev_link(&self, base_path: &str) -> Option<String> {
        self.has_prev.then(|| self.link(base_path, self.page - 1))
    }
}

/// Read a page number from a raw query string.
///
/// Missing, negative, or non-numeric values read as page 0.
pub fn page_number_from_query(query: &str, param_name: &str) -> u32 {
    let query = query.strip_prefix('?').unwrap_or(query);

    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let Ok(key) = urlencoding::decode(key) else {
            continue;
        };
        if key != param_name {
            continue;
        }
        return urlencoding::decode(value)
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(0);
    }

    0
}
