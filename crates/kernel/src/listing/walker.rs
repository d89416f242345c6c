//! Bounded tree walk collecting descendant ids.

use std::collections::HashSet;

use anyhow::Result;
use tracing::warn;

use crate::store::ContentStore;

/// Collect descendant ids of `root_id`, depth-first pre-order.
///
/// The root sits at depth 1. A child is collected and then explored only
/// while its own depth is below `max_depth`, so `max_depth <= 1` collects
/// nothing and `max_depth = 2` collects direct children only. The root id
/// itself is never part of the result.
///
/// A node reached twice (a cycle in the parent links) is skipped.
pub async fn collect_descendant_ids(
    store: &dyn ContentStore,
    root_id: i64,
    max_depth: u32,
) -> Result<Vec<i64>> {
    let mut ids = Vec::new();
    if max_depth <= 1 {
        return Ok(ids);
    }

    let mut visited = HashSet::from([root_id]);
    let mut stack: Vec<(i64, u32)> = Vec::new();

    let children = store.children_of(root_id).await?;
    stack.extend(children.iter().rev().map(|c| (c.id, 2)));

    while let Some((id, depth)) = stack.pop() {
        if !visited.insert(id) {
            warn!(node_id = id, root_id, "node reached twice during tree walk, skipping");
            continue;
        }
        ids.push(id);

        if depth < max_depth {
            let children = store.children_of(id).await?;
            stack.extend(children.iter().rev().map(|c| (c.id, depth + 1)));
        }
    }

    Ok(ids)
}
