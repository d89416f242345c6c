//! Item-template rendering and placeholder substitution.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tera::Tera;

use super::types::ListingItems;
use crate::models::ListingPage;

/// Token in a page body replaced by the rendered listing.
pub const LISTING_PLACEHOLDER: &str = "$Listing";

/// Placeholder as a rich-text editor typically stores it.
const WRAPPED_PLACEHOLDER: &str = "<p>$Listing</p>";

const TEMPLATE_NAME: &str = "listing.html";

/// External template engine.
pub trait TemplateRenderer: Send + Sync {
    /// Render `template` against a JSON object context.
    fn render(&self, template: &str, context: &Value) -> Result<String>;
}

/// Tera-backed renderer with HTML autoescaping.
#[derive(Clone)]
pub struct TeraRenderer {
    base: Tera,
}

impl Default for TeraRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TeraRenderer {
    pub fn new() -> Self {
        let mut base = Tera::default();
        Self::register_filters(&mut base);
        Self { base }
    }

    fn register_filters(tera: &mut Tera) {
        // Unix timestamp -> "January 5, 2024"
        tera.register_filter(
            "format_date",
            |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let timestamp = match value {
                    tera::Value::Number(n) => n.as_i64().unwrap_or(0),
                    _ => return Ok(tera::Value::String(String::new())),
                };

                let formatted = chrono::DateTime::from_timestamp(timestamp, 0)
                    .map(|dt| dt.format("%B %-d, %Y").to_string())
                    .unwrap_or_else(|| "Unknown date".to_string());

                Ok(tera::Value::String(formatted))
            },
        );
    }
}

impl TemplateRenderer for TeraRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<String> {
        let context =
            tera::Context::from_value(context.clone()).context("invalid template context")?;

        let mut tera = self.base.clone();
        tera.add_raw_template(TEMPLATE_NAME, template)
            .context("failed to parse item template")?;

        tera.render(TEMPLATE_NAME, &context)
            .context("failed to render item template")
    }
}

/// Context an item template is rendered with.
///
/// `Items` holds the visible nodes as flat maps; `Pagination` carries the
/// page parameter name so templates can link to neighbouring pages.
pub fn listing_context(page: &ListingPage, listing: &ListingItems) -> Value {
    let items: Vec<Value> = listing
        .items
        .iter()
        .map(|node| node.to_template_value())
        .collect();

    json!({
        "Items": items,
        "Pagination": listing.pagination,
        "Style": page.config.style.label(),
        "Page": {
            "ID": page.id(),
            "Title": page.node.title,
        },
    })
}

/// Splice a rendered listing into a page body.
///
/// A paragraph-wrapped placeholder is unwrapped first; the fragment itself
/// is never scanned for placeholders.
pub fn substitute_listing(body: &str, fragment: &str) -> String {
    body.replace(WRAPPED_PLACEHOLDER, LISTING_PLACEHOLDER)
        .replace(LISTING_PLACEHOLDER, fragment)
}
