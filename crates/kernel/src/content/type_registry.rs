//! Content type registry.
//!
//! Maps type names to descriptors (declared fields, parent type, whether the
//! type lives in the content hierarchy). Built once at startup from the site
//! definition and read-only afterwards.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Metadata fields every type can be sorted by.
pub const METADATA_FIELDS: [&str; 3] = ["LastEdited", "Created", "ID"];

/// Description of one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type name (e.g. "Page", "Article").
    pub name: String,

    /// Parent type; fields and hierarchy support are inherited from it.
    #[serde(default)]
    pub parent: Option<String>,

    /// Declared persisted field names.
    #[serde(default)]
    pub fields: Vec<String>,

    /// Whether nodes of this type form a tree (have children).
    #[serde(default)]
    pub hierarchy: bool,
}

impl TypeDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            fields: Vec::new(),
            hierarchy: false,
        }
    }

    pub fn parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn hierarchical(mut self) -> Self {
        self.hierarchy = true;
        self
    }
}

/// Registry of content types.
#[derive(Clone)]
pub struct TypeRegistry {
    inner: Arc<TypeRegistryInner>,
}

struct TypeRegistryInner {
    types: DashMap<String, TypeDescriptor>,
    /// list type -> type whose tree the listing source is picked from
    source_map: DashMap<String, String>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create an empty registry with the stock source map (`Folder -> Folder`).
    pub fn new() -> Self {
        let source_map = DashMap::new();
        source_map.insert("Folder".to_string(), "Folder".to_string());
        Self {
            inner: Arc::new(TypeRegistryInner {
                types: DashMap::new(),
                source_map,
            }),
        }
    }

    /// Build a registry from a list of descriptors.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = TypeDescriptor>) -> Result<Self> {
        let registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        info!(count = registry.len(), "content types registered");
        Ok(registry)
    }

    /// Register a content type.
    ///
    /// Rejects a descriptor whose parent chain leads back to itself.
    pub fn register(&self, descriptor: TypeDescriptor) -> Result<()> {
        if let Some(parent) = &descriptor.parent
            && self.parent_chain_reaches(parent, &descriptor.name)
        {
            anyhow::bail!(
                "type '{}' cannot inherit from '{}': inheritance cycle",
                descriptor.name,
                parent
            );
        }

        debug!(type_name = %descriptor.name, "registered content type");
        self.inner
            .types
            .insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Follow declared parents from `start`, including unregistered ones.
    fn parent_chain_reaches(&self, start: &str, target: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(start.to_string());
        while let Some(name) = current {
            if name == target {
                return true;
            }
            if !seen.insert(name.clone()) {
                return false;
            }
            current = self.inner.types.get(&name).and_then(|d| d.parent.clone());
        }
        false
    }

    /// Override which tree a list type draws its source from.
    pub fn map_source_type(&self, list_type: &str, source_type: &str) {
        self.inner
            .source_map
            .insert(list_type.to_string(), source_type.to_string());
    }

    /// Get a descriptor by type name.
    pub fn get(&self, type_name: &str) -> Option<TypeDescriptor> {
        self.inner.types.get(type_name).map(|r| r.clone())
    }

    /// Check if a content type exists.
    pub fn exists(&self, type_name: &str) -> bool {
        self.inner.types.contains_key(type_name)
    }

    /// All type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.types.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Get the number of registered content types.
    pub fn len(&self) -> usize {
        self.inner.types.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.types.is_empty()
    }

    /// The type itself followed by its registered ancestors, nearest first.
    ///
    /// Stops at the first unregistered parent.
    pub fn ancestors(&self, type_name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(type_name.to_string());

        while let Some(name) = current {
            if !seen.insert(name.clone()) {
                break;
            }
            let parent = self.inner.types.get(&name).and_then(|d| d.parent.clone());
            chain.push(name);
            current = parent.filter(|p| self.exists(p));
        }

        chain
    }

    /// Root ancestor of a type.
    pub fn base_type(&self, type_name: &str) -> String {
        self.ancestors(type_name)
            .pop()
            .unwrap_or_else(|| type_name.to_string())
    }

    /// Declared fields of the type and all its ancestors.
    pub fn inherited_fields(&self, type_name: &str) -> Vec<String> {
        let mut fields = Vec::new();
        for name in self.ancestors(type_name).iter().rev() {
            if let Some(descriptor) = self.inner.types.get(name) {
                fields.extend(descriptor.fields.iter().cloned());
            }
        }
        fields
    }

    /// Field names a listing of this type may be sorted by.
    ///
    /// Inherited declared fields plus the metadata fields, deduplicated and
    /// sorted.
    pub fn selectable_fields(&self, type_name: &str) -> Vec<String> {
        if !self.exists(type_name) {
            warn!(type_name = %type_name, "selectable fields requested for unknown type");
        }

        let mut fields: BTreeSet<String> = self.inherited_fields(type_name).into_iter().collect();
        fields.extend(METADATA_FIELDS.iter().map(|f| f.to_string()));
        fields.into_iter().collect()
    }

    /// Whether `field` is a valid sort field for `type_name`.
    pub fn is_selectable(&self, type_name: &str, field: &str) -> bool {
        METADATA_FIELDS.contains(&field)
            || self.inherited_fields(type_name).iter().any(|f| f == field)
    }

    /// The type and every registered type descending from it, sorted.
    ///
    /// An unknown type yields just itself.
    pub fn subtypes_of(&self, type_name: &str) -> Vec<String> {
        if !self.exists(type_name) {
            return vec![type_name.to_string()];
        }

        // type_names() is already sorted; collect first so no shard lock is
        // held while walking ancestors.
        self.type_names()
            .into_iter()
            .filter(|name| self.ancestors(name).iter().any(|a| a == type_name))
            .collect()
    }

    /// Whether nodes of this type (or an ancestor type) form a tree.
    pub fn has_hierarchy(&self, type_name: &str) -> bool {
        self.ancestors(type_name)
            .iter()
            .any(|name| self.inner.types.get(name).is_some_and(|d| d.hierarchy))
    }

    /// Type whose tree a listing of `list_type` picks its source from.
    pub fn source_type_for(&self, list_type: &str) -> String {
        if let Some(mapped) = self.inner.source_map.get(list_type) {
            return mapped.clone();
        }
        self.base_type(list_type)
    }
}
