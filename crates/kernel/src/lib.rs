//! Listing page kernel.
//!
//! Content-tree listings for CMS pages: a listing page names a source node,
//! a depth, a type filter and a sort order; the kernel collects matching
//! descendants, filters them per viewer, paginates them and renders them
//! through an item template into the page body.
//!
//! The `listing` binary drives the same library from YAML site fixtures.

pub mod admin;
pub mod config;
pub mod content;
pub mod error;
pub mod listing;
pub mod models;
pub mod store;

pub use admin::{ListingAdmin, ListingFormOptions};
pub use config::{Config, ListingDefaults};
pub use error::{ListingError, ListingResult};
pub use listing::{ListingService, Viewer};
