//! Storage backend traits.

mod repository;

pub use repository::{EntityQuery, MetadataRepository};
