//! Listing page model.
//!
//! A listing page is a content node whose body contains a `$Listing`
//! placeholder and whose configuration drives the listing query.

use serde::{Deserialize, Serialize};

use super::node::ContentNode;

/// Listing page: node metadata, body, and listing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    /// The page as a node in the content tree.
    #[serde(flatten)]
    pub node: ContentNode,

    /// Page body; `$Listing` marks where the rendered listing goes.
    #[serde(default)]
    pub content: String,

    /// Listing settings.
    #[serde(default)]
    pub config: ListingConfig,
}

impl ListingPage {
    /// Create a listing page with default settings.
    pub fn new(node: ContentNode, content: &str) -> Self {
        Self {
            node,
            content: content.to_string(),
            config: ListingConfig::default(),
        }
    }

    /// Replace the listing settings.
    pub fn with_config(mut self, config: ListingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn id(&self) -> i64 {
        self.node.id
    }
}

/// Persisted listing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Items per page (0 = unlimited).
    pub per_page: u32,

    /// Presentation style, passed through to the item template.
    pub style: ListingStyle,

    /// Schema field to sort by.
    pub sort_by: String,

    /// Sort direction.
    pub sort_dir: SortDirection,

    /// Content type to list (empty = default type).
    pub list_type: String,

    /// List exactly `list_type`, not its subtypes.
    pub strict_type: bool,

    /// Node whose descendants are listed (0 = the page itself).
    pub listing_source_id: i64,

    /// Recursion depth bound.
    pub depth: u32,

    /// One-shot request to clear `listing_source_id` on the next save.
    pub clear_source: bool,

    /// Item template reference.
    pub listing_template_id: Option<i64>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            per_page: 0,
            style: ListingStyle::default(),
            sort_by: String::new(),
            sort_dir: SortDirection::default(),
            list_type: String::new(),
            strict_type: false,
            listing_source_id: 0,
            depth: 1,
            clear_source: false,
            listing_template_id: None,
        }
    }
}

impl ListingConfig {
    /// Consume a pending clear-source request.
    ///
    /// Called once by the save pipeline. The flag is never persisted as set.
    pub fn apply_pending_reset(mut self) -> Self {
        if self.clear_source {
            self.clear_source = false;
            self.listing_source_id = 0;
        }
        self
    }

    /// Whether an explicit listing source is configured.
    pub fn has_source(&self) -> bool {
        !self.list_type.is_empty() && self.listing_source_id != 0
    }

    /// Configured list type, or `default` when empty.
    pub fn list_type_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.list_type.is_empty() {
            default
        } else {
            &self.list_type
        }
    }
}

/// Sort direction as stored. Anything other than "Descending" reads as ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl From<String> for SortDirection {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl SortDirection {
    pub fn parse(value: &str) -> Self {
        if value == "Descending" {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    /// SQL keyword for this direction.
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Listing presentation style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ListingStyle {
    #[default]
    Standard,
    #[serde(rename = "A to Z")]
    AToZ,
}

impl From<String> for ListingStyle {
    fn from(value: String) -> Self {
        match value.as_str() {
            "A to Z" => ListingStyle::AToZ,
            _ => ListingStyle::Standard,
        }
    }
}

impl ListingStyle {
    pub fn label(self) -> &'static str {
        match self {
            ListingStyle::Standard => "Standard",
            ListingStyle::AToZ => "A to Z",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn pending_reset_clears_source_once() {
        let config = ListingConfig {
            listing_source_id: 42,
            list_type: "Page".to_string(),
            clear_source: true,
            ..Default::default()
        };

        let config = config.apply_pending_reset();
        assert_eq!(config.listing_source_id, 0);
        assert!(!config.clear_source);
        assert!(!config.has_source());
    }

    #[test]
    fn pending_reset_without_flag_keeps_source() {
        let config = ListingConfig {
            listing_source_id: 42,
            ..Default::default()
        };

        let config = config.apply_pending_reset();
        assert_eq!(config.listing_source_id, 42);
    }

    #[test]
    fn sort_direction_parsing() {
        assert_eq!(SortDirection::parse("Descending"), SortDirection::Descending);
        assert_eq!(SortDirection::parse("Ascending"), SortDirection::Ascending);
        assert_eq!(SortDirection::parse(""), SortDirection::Ascending);
        assert_eq!(SortDirection::parse("descending"), SortDirection::Ascending);
    }

    #[test]
    fn sort_direction_deserializes_unknown_as_ascending() {
        let dir: SortDirection = serde_json::from_str("\"Sideways\"").unwrap();
        assert_eq!(dir, SortDirection::Ascending);

        let dir: SortDirection = serde_json::from_str("\"Descending\"").unwrap();
        assert_eq!(dir, SortDirection::Descending);
    }

    #[test]
    fn style_round_trips_label() {
        let style: ListingStyle = serde_json::from_str("\"A to Z\"").unwrap();
        assert_eq!(style, ListingStyle::AToZ);
        assert_eq!(serde_json::to_string(&style).unwrap(), "\"A to Z\"");
    }

    #[test]
    fn page_deserializes_flattened_node() {
        let yaml = r#"
id: 10
type: ListingPage
title: News
content: "<p>$Listing</p>"
config:
  per_page: 5
  sort_dir: Descending
  listing_template_id: 1
"#;
        let page: ListingPage = serde_yml::from_str(yaml).unwrap();
        assert_eq!(page.id(), 10);
        assert_eq!(page.config.per_page, 5);
        assert_eq!(page.config.sort_dir, SortDirection::Descending);
        assert_eq!(page.config.depth, 1);
    }

    #[test]
    fn list_type_falls_back_to_default() {
        let config = ListingConfig::default();
        assert_eq!(config.list_type_or("Page"), "Page");
    }
}
