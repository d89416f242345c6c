//! Per-viewer visibility filtering.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::ContentNode;

/// Permission that lets a viewer see unpublished nodes.
pub const VIEW_UNPUBLISHED: &str = "view unpublished content";

/// The person a listing is rendered for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    /// User ID (0 = anonymous).
    pub id: i64,

    /// Administrators see everything.
    #[serde(default)]
    pub is_admin: bool,

    /// Granted permission names.
    #[serde(default)]
    pub permissions: HashSet<String>,
}

impl Viewer {
    /// An anonymous visitor.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An administrator.
    pub fn admin(id: i64) -> Self {
        Self {
            id,
            is_admin: true,
            permissions: HashSet::new(),
        }
    }

    /// An authenticated user with the given permissions.
    pub fn with_permissions(id: i64, permissions: &[&str]) -> Self {
        Self {
            id,
            is_admin: false,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.id == 0
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_admin || self.permissions.contains(permission)
    }
}

/// Viewer authorization capability.
#[async_trait]
pub trait AccessCheck: Send + Sync {
    /// Whether `viewer` may see `node`.
    async fn can_view(&self, node: &ContentNode, viewer: &Viewer) -> Result<bool>;
}

/// Default access rule: published nodes are public; unpublished nodes need
/// `view unpublished content` (or an admin).
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusAccess;

#[async_trait]
impl AccessCheck for StatusAccess {
    async fn can_view(&self, node: &ContentNode, viewer: &Viewer) -> Result<bool> {
        Ok(node.is_published() || viewer.has_permission(VIEW_UNPUBLISHED))
    }
}

/// Drop items the viewer may not see, keeping order.
///
/// Runs on an already windowed page, so the result can hold fewer than
/// `per_page` items.
pub async fn filter_visible(
    access: &dyn AccessCheck,
    items: Vec<ContentNode>,
    viewer: &Viewer,
) -> Result<Vec<ContentNode>> {
    let before = items.len();
    let mut visible = Vec::with_capacity(before);

    for item in items {
        if access.can_view(&item, viewer).await? {
            visible.push(item);
        }
    }

    if visible.len() < before {
        debug!(
            viewer_id = viewer.id,
            hidden = before - visible.len(),
            "items hidden from viewer"
        );
    }

    Ok(visible)
}
