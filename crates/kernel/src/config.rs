//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Listing configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL. When None, only fixture-backed stores are available.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 5).
    pub database_max_connections: u32,

    /// Listing defaults applied when a page leaves a setting empty.
    pub listing: ListingDefaults,

    /// Largest depth an administrator may configure (default: 5).
    pub max_depth: u32,
}

/// Fallback values used while building a listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDefaults {
    /// Type listed when a page has no list type (default: "Page").
    pub list_type: String,

    /// Sort field used when the configured one is empty or unknown (default: "Title").
    pub sort_field: String,

    /// Prefix of the per-page query parameter; the page id is appended (default: "page").
    pub page_param_prefix: String,
}

impl Default for ListingDefaults {
    fn default() -> Self {
        Self {
            list_type: "Page".to_string(),
            sort_field: "Title".to_string(),
            page_param_prefix: "page".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: 5,
            listing: ListingDefaults::default(),
            max_depth: 5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let defaults = ListingDefaults::default();

        let list_type = env::var("LISTING_DEFAULT_TYPE").unwrap_or(defaults.list_type);
        let sort_field = env::var("LISTING_DEFAULT_SORT").unwrap_or(defaults.sort_field);
        let page_param_prefix =
            env::var("LISTING_PAGE_PARAM_PREFIX").unwrap_or(defaults.page_param_prefix);

        if page_param_prefix.is_empty() {
            anyhow::bail!("LISTING_PAGE_PARAM_PREFIX must not be empty");
        }

        let max_depth = env::var("LISTING_MAX_DEPTH")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("LISTING_MAX_DEPTH must be a valid u32")?;

        Ok(Self {
            database_url,
            database_max_connections,
            listing: ListingDefaults {
                list_type,
                sort_field,
                page_param_prefix,
            },
            max_depth,
        })
    }
}
