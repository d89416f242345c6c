//! Listing source resolution.

use anyhow::Result;
use tracing::{debug, warn};

use crate::content::TypeRegistry;
use crate::models::{ContentNode, ListingPage};
use crate::store::ContentStore;

/// Resolve the explicitly configured listing source.
///
/// Returns None when no source is configured, the node is gone, or the node
/// is not of the list type or one of its subtypes.
pub async fn resolve_source(
    store: &dyn ContentStore,
    registry: &TypeRegistry,
    page: &ListingPage,
) -> Result<Option<ContentNode>> {
    let config = &page.config;
    if !config.has_source() {
        return Ok(None);
    }

    let Some(node) = store.fetch_by_id(config.listing_source_id).await? else {
        warn!(
            page_id = page.id(),
            source_id = config.listing_source_id,
            "listing source not found"
        );
        return Ok(None);
    };

    if !registry
        .subtypes_of(&config.list_type)
        .iter()
        .any(|t| t == &node.node_type)
    {
        warn!(
            page_id = page.id(),
            source_id = node.id,
            source_type = %node.node_type,
            list_type = %config.list_type,
            "listing source is not of the list type"
        );
        return Ok(None);
    }

    Ok(Some(node))
}

/// Resolve the listing source, falling back to the page's own node.
pub async fn source_or_page(
    store: &dyn ContentStore,
    registry: &TypeRegistry,
    page: &ListingPage,
) -> Result<ContentNode> {
    match resolve_source(store, registry, page).await? {
        Some(node) => Ok(node),
        None => {
            debug!(page_id = page.id(), "listing from the page itself");
            Ok(page.node.clone())
        }
    }
}
