//! Storage layer abstraction.
//!
//! Converters and handlers reach metadata through [`MetadataRepository`].
//! Two implementations ship with the crate:
//! - **Memory**: [`InMemoryRepository`], a `RwLock`-guarded map store
//! - **Bulkhead**: [`BulkheadRepository`], a concurrency-limiting wrapper

// Allow significant_drop_tightening - guards are held across short map updates.
#![allow(clippy::significant_drop_tightening)]

pub mod bulkhead;
mod memory;
pub mod traits;

pub use bulkhead::BulkheadRepository;
pub use memory::InMemoryRepository;
pub use traits::{EntityQuery, MetadataRepository};
