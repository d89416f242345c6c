//! Content schema.

pub mod type_registry;

pub use type_registry::{METADATA_FIELDS, TypeDescriptor, TypeRegistry};
