//! Content node model.
//!
//! Nodes are the hierarchical, typed records a listing enumerates. The
//! listing kernel never writes them; stores hand them out read-only.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content node record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentNode {
    /// Unique identifier.
    pub id: i64,

    /// Parent node ID (0 = top level).
    #[serde(default)]
    pub parent_id: i64,

    /// Content type name.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub node_type: String,

    /// Node title.
    pub title: String,

    /// Publication status (0 = unpublished, 1 = published).
    #[serde(default = "default_status")]
    pub status: i16,

    /// Unix timestamp when created.
    #[serde(default)]
    pub created: i64,

    /// Unix timestamp when last changed.
    #[serde(default)]
    pub changed: i64,

    /// Dynamic field storage (JSON object).
    #[serde(default = "empty_fields")]
    pub fields: Value,
}

fn default_status() -> i16 {
    1
}

fn empty_fields() -> Value {
    Value::Object(Map::new())
}

impl ContentNode {
    /// Create a published node with no dynamic fields.
    pub fn new(id: i64, parent_id: i64, node_type: &str, title: &str) -> Self {
        Self {
            id,
            parent_id,
            node_type: node_type.to_string(),
            title: title.to_string(),
            status: 1,
            created: 0,
            changed: 0,
            fields: empty_fields(),
        }
    }

    /// Set a dynamic field.
    pub fn with_field(mut self, name: &str, value: Value) -> Self {
        if !self.fields.is_object() {
            self.fields = empty_fields();
        }
        if let Some(obj) = self.fields.as_object_mut() {
            obj.insert(name.to_string(), value);
        }
        self
    }

    /// Set the created/changed timestamps.
    pub fn with_timestamps(mut self, created: i64, changed: i64) -> Self {
        self.created = created;
        self.changed = changed;
        self
    }

    /// Mark as unpublished.
    pub fn unpublished(mut self) -> Self {
        self.status = 0;
        self
    }

    /// Check if this node is published.
    pub fn is_published(&self) -> bool {
        self.status == 1
    }

    /// Get a dynamic field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Value of a schema field name, resolving metadata names to columns.
    ///
    /// Missing dynamic fields read as `Null`.
    pub fn value_of(&self, field_name: &str) -> Value {
        match NodeColumn::for_field(field_name) {
            NodeColumn::Id => Value::from(self.id),
            NodeColumn::ParentId => Value::from(self.parent_id),
            NodeColumn::Type => Value::from(self.node_type.as_str()),
            NodeColumn::Title => Value::from(self.title.as_str()),
            NodeColumn::Created => Value::from(self.created),
            NodeColumn::Changed => Value::from(self.changed),
            NodeColumn::Field(name) => self.field(&name).cloned().unwrap_or(Value::Null),
        }
    }

    /// Flat map handed to item templates: metadata under schema names,
    /// followed by every dynamic field.
    pub fn to_template_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(fields) = self.fields.as_object() {
            for (k, v) in fields {
                map.insert(k.clone(), v.clone());
            }
        }
        map.insert("ID".to_string(), Value::from(self.id));
        map.insert("ParentID".to_string(), Value::from(self.parent_id));
        map.insert("ClassName".to_string(), Value::from(self.node_type.as_str()));
        map.insert("Title".to_string(), Value::from(self.title.as_str()));
        map.insert("Created".to_string(), Value::from(self.created));
        map.insert("LastEdited".to_string(), Value::from(self.changed));
        Value::Object(map)
    }
}

/// Storage location of a schema field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeColumn {
    Id,
    ParentId,
    Type,
    Title,
    Created,
    Changed,
    /// Dynamic field stored in the `fields` JSON object.
    Field(String),
}

impl NodeColumn {
    /// Map a schema field name to where it is stored.
    pub fn for_field(field_name: &str) -> Self {
        match field_name {
            "ID" => NodeColumn::Id,
            "ParentID" => NodeColumn::ParentId,
            "ClassName" => NodeColumn::Type,
            "Title" => NodeColumn::Title,
            "Created" => NodeColumn::Created,
            "LastEdited" => NodeColumn::Changed,
            other => NodeColumn::Field(other.to_string()),
        }
    }

    /// Column name in the `node` table (None for dynamic fields).
    pub fn column_name(&self) -> Option<&'static str> {
        match self {
            NodeColumn::Id => Some("id"),
            NodeColumn::ParentId => Some("parent_id"),
            NodeColumn::Type => Some("type"),
            NodeColumn::Title => Some("title"),
            NodeColumn::Created => Some("created"),
            NodeColumn::Changed => Some("changed"),
            NodeColumn::Field(_) => None,
        }
    }
}
