//! YAML site fixtures.
//!
//! A fixture describes a whole site: content types, listing templates,
//! plain nodes and listing pages. The type section alone is enough to build
//! the registry when content is served from PostgreSQL.
//!
//! ```yaml
//! types:
//!   - name: Page
//!     fields: [Title, Content]
//!     hierarchy: true
//!   - name: Article
//!     parent: Page
//!     fields: [Author]
//! templates:
//!   - id: 1
//!     title: Titles
//! nodes:
//!   - { id: 2, parent_id: 10, type: Article, title: First }
//! pages:
//!   - id: 10
//!     type: ListingPage
//!     title: News
//!     content: "<p>$Listing</p>"
//!     config: { per_page: 5, listing_template_id: 1 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::MemoryStore;
use crate::content::{TypeDescriptor, TypeRegistry};
use crate::models::{ContentNode, ListingPage, ListingTemplate};

/// Parsed site fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteFixture {
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,

    /// Extra list type -> source tree type mappings.
    #[serde(default)]
    pub source_map: BTreeMap<String, String>,

    #[serde(default)]
    pub templates: Vec<ListingTemplate>,

    #[serde(default)]
    pub nodes: Vec<ContentNode>,

    #[serde(default)]
    pub pages: Vec<ListingPage>,
}

impl SiteFixture {
    /// Parse a fixture from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yml::from_str(yaml).context("failed to parse site fixture")
    }

    /// Load a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read site fixture {}", path.display()))?;
        Self::from_yaml_str(&yaml)
    }

    /// Build the type registry described by the fixture.
    pub fn registry(&self) -> Result<TypeRegistry> {
        let registry = TypeRegistry::from_descriptors(self.types.iter().cloned())?;
        for (list_type, source_type) in &self.source_map {
            registry.map_source_type(list_type, source_type);
        }
        Ok(registry)
    }

    /// Load templates, nodes and pages into a fresh memory store.
    pub fn to_store(&self) -> MemoryStore {
        let store = MemoryStore::new();
        for template in &self.templates {
            store.insert_template(template.clone());
        }
        for node in &self.nodes {
            store.insert_node(node.clone());
        }
        for page in &self.pages {
            store.insert_page(page.clone());
        }
        info!(
            nodes = store.node_count(),
            pages = self.pages.len(),
            templates = self.templates.len(),
            "site fixture loaded"
        );
        store
    }
}
