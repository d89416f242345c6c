//! Data models for the listing kernel.

pub mod listing_page;
pub mod listing_template;
pub mod node;

pub use listing_page::{ListingConfig, ListingPage, ListingStyle, SortDirection};
pub use listing_template::{DEFAULT_ITEM_TEMPLATE, ListingTemplate};
pub use node::{ContentNode, NodeColumn};
