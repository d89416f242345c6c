//! Listing error types.
//!
//! Viewers never see these: render paths fall back silently. They are
//! raised by the admin save pipeline so a misconfigured listing page is
//! rejected before it is stored.

use thiserror::Error;

/// Errors surfaced to the administrator when saving a listing page.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing page {page_id} has no listing template selected")]
    MissingTemplate { page_id: i64 },

    #[error("listing template {0} not found")]
    TemplateNotFound(i64),

    #[error("listing template {template_id} does not compile: {reason}")]
    InvalidTemplate { template_id: i64, reason: String },

    #[error("depth {depth} exceeds the maximum of {max}")]
    InvalidDepth { depth: u32, max: u32 },

    #[error("unknown list type: {0}")]
    UnknownListType(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ListingError {
    /// Whether the error is a configuration problem the administrator can fix.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, ListingError::Store(_))
    }
}

/// Result type alias using ListingError.
pub type ListingResult<T> = Result<T, ListingError>;
