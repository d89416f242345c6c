//! Listing engine.
//!
//! Turns a listing page's settings into the fragment that replaces its
//! `$Listing` placeholder. Building blocks:
//! - `source`: which node the listing is rooted at
//! - `walker`: bounded descendant walk below that node
//! - `query_builder`: the typed query and its SQL rendering
//! - `visibility` and `pager`: what the viewer gets to see, one page at a time
//! - `render`: item templates and placeholder substitution

mod listing_service;
mod pager;
mod query_builder;
mod render;
mod source;
mod types;
mod visibility;
mod walker;

pub use listing_service::ListingService;
pub use pager::{Pagination, page_number_from_query};
pub use query_builder::{ListingQueryBuilder, build_query};
pub use render::{
    LISTING_PLACEHOLDER, TemplateRenderer, TeraRenderer, listing_context, substitute_listing,
};
pub use source::{resolve_source, source_or_page};
pub use types::{ListingItems, ListingQuery, PageWindow, SortClause};
pub use visibility::{AccessCheck, StatusAccess, VIEW_UNPUBLISHED, Viewer, filter_visible};
pub use walker::collect_descendant_ids;
