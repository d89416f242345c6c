//! Listing query types.
//!
//! - ListingQuery: parent filter, type filter, sort, and page window
//! - SortClause: validated field plus direction
//! - ListingItems: the visible page of results and its pagination state

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pager::Pagination;
use crate::models::{ContentNode, SortDirection};

/// Store-agnostic description of one listing fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Items must have one of these parents (descendants plus the source).
    pub parent_ids: Vec<i64>,

    /// Type the listing was configured for.
    pub list_type: String,

    /// Accepted type names: just `list_type` when strict, else it and its subtypes.
    pub type_names: Vec<String>,

    /// Exact type match requested.
    pub strict: bool,

    /// Sort order.
    pub sort: SortClause,

    /// Page window; None returns every match.
    pub window: Option<PageWindow>,
}

impl ListingQuery {
    /// Whether a node passes the parent and type filters.
    pub fn matches(&self, node: &ContentNode) -> bool {
        self.parent_ids.contains(&node.parent_id)
            && self.type_names.iter().any(|t| t == &node.node_type)
    }

    /// Same query with the window removed (used for counting).
    pub fn unpaged(&self) -> Self {
        Self {
            window: None,
            ..self.clone()
        }
    }
}

/// Sort field and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub field: String,
    pub direction: SortDirection,
}

impl SortClause {
    pub fn new(field: &str, direction: SortDirection) -> Self {
        Self {
            field: field.to_string(),
            direction,
        }
    }
}

impl fmt::Display for SortClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction.keyword())
    }
}

/// Offset/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Window for a zero-based page number; None when `per_page` is 0.
    pub fn for_page(page: u32, per_page: u32) -> Option<Self> {
        if per_page == 0 {
            return None;
        }
        Some(Self {
            offset: u64::from(page) * u64::from(per_page),
            limit: u64::from(per_page),
        })
    }

    /// Slice bounds `[start, end)` clamped to `len`.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(len);
        let end = start
            .saturating_add(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .min(len);
        (start, end)
    }
}

/// Result of a listing: visible items of the requested page.
#[derive(Debug, Clone, Serialize)]
pub struct ListingItems {
    /// Items the viewer may see, in sort order.
    pub items: Vec<ContentNode>,

    /// Pagination state for the renderer.
    pub pagination: Pagination,

    /// Node the listing was drawn from.
    pub source_id: i64,

    /// The query that produced the items.
    pub query: ListingQuery,
}
