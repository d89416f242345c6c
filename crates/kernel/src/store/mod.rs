//! Content store interfaces.
//!
//! The listing kernel reads nodes and listing settings through these traits.
//! Two backends ship with it:
//! - MemoryStore: in-process store, loaded from YAML site fixtures
//! - PgContentStore: PostgreSQL, executing SQL from `ListingQueryBuilder`

mod fixture;
mod memory;
mod pg;

use anyhow::Result;
use async_trait::async_trait;

use crate::listing::ListingQuery;
use crate::models::{ContentNode, ListingPage, ListingTemplate};

pub use fixture::SiteFixture;
pub use memory::MemoryStore;
pub use pg::PgContentStore;

/// Read access to the content tree.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a node by ID.
    async fn fetch_by_id(&self, id: i64) -> Result<Option<ContentNode>>;

    /// Direct children of a node, in tree order.
    async fn children_of(&self, parent_id: i64) -> Result<Vec<ContentNode>>;

    /// Run a listing query: filter, sort, then apply the page window.
    async fn query(&self, query: &ListingQuery) -> Result<Vec<ContentNode>>;

    /// Count every match of a listing query, ignoring its window.
    async fn count(&self, query: &ListingQuery) -> Result<u64>;
}

/// Listing page settings and templates.
#[async_trait]
pub trait ListingPageStore: Send + Sync {
    /// Fetch a listing page by ID.
    async fn fetch_page(&self, id: i64) -> Result<Option<ListingPage>>;

    /// Every listing page, ordered by ID.
    async fn list_pages(&self) -> Result<Vec<ListingPage>>;

    /// Persist a listing page's body and settings.
    async fn save_page(&self, page: &ListingPage) -> Result<()>;

    /// Fetch a listing template by ID.
    async fn fetch_template(&self, id: i64) -> Result<Option<ListingTemplate>>;

    /// All listing templates, ordered by title.
    async fn list_templates(&self) -> Result<Vec<ListingTemplate>>;
}
