//! Listing template model.

use serde::{Deserialize, Serialize};

/// Item template body used when a template is created without one.
pub const DEFAULT_ITEM_TEMPLATE: &str =
    "\t{% for item in Items %}\n\t\t<p>{{ item.Title }}</p>\n\t{% endfor %}";

/// Reusable item template, referenced by listing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListingTemplate {
    /// Unique identifier.
    pub id: i64,

    /// Human-readable title.
    pub title: String,

    /// Template body rendered once per listing with `Items` in scope.
    #[serde(default = "default_item_template")]
    pub item_template: String,
}

fn default_item_template() -> String {
    DEFAULT_ITEM_TEMPLATE.to_string()
}

impl ListingTemplate {
    /// Create a template with the default item body.
    pub fn new(id: i64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            item_template: default_item_template(),
        }
    }

    /// Replace the item body.
    pub fn with_body(mut self, body: &str) -> Self {
        self.item_template = body.to_string();
        self
    }
}
