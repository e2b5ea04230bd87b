//! Bulkhead wrapper for repository operations.
//!
//! Caps the number of concurrent repository calls so a burst of conversions
//! or service runs cannot exhaust the backing store.
//!
//! # Usage
//!
//! ```rust,ignore
//! use metagov::bulkhead::BulkheadConfig;
//! use metagov::storage::{BulkheadRepository, InMemoryRepository};
//!
//! let repository = BulkheadRepository::new(
//!     InMemoryRepository::new(),
//!     BulkheadConfig::default(),
//!     "memory",
//! );
//! repository.get_entity(&guid)?;
//! ```

use super::traits::{EntityQuery, MetadataRepository};
use crate::Result;
use crate::bulkhead::{Bulkhead, BulkheadConfig};
use crate::models::{EntityDetail, Guid, InstanceProperties, Relationship};

/// Repository wrapper with bulkhead (concurrency limiting) pattern.
pub struct BulkheadRepository<R: MetadataRepository> {
    inner: R,
    bulkhead: Bulkhead,
}

impl<R: MetadataRepository> BulkheadRepository<R> {
    /// Creates a new bulkhead-wrapped repository.
    #[must_use]
    pub fn new(inner: R, config: BulkheadConfig, backend_name: &'static str) -> Self {
        Self {
            inner,
            bulkhead: Bulkhead::new(config, backend_name),
        }
    }

    /// Returns the current number of available permits.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.bulkhead.available_permits()
    }

    /// Returns the wrapped repository.
    #[must_use]
    pub const fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: MetadataRepository> MetadataRepository for BulkheadRepository<R> {
    fn store_entity(&self, user_id: &str, entity: &EntityDetail) -> Result<()> {
        self.bulkhead
            .execute("store_entity", || self.inner.store_entity(user_id, entity))
    }

    fn get_entity(&self, guid: &Guid) -> Result<Option<EntityDetail>> {
        self.bulkhead
            .execute("get_entity", || self.inner.get_entity(guid))
    }

    fn find_entities(&self, query: &EntityQuery) -> Result<Vec<EntityDetail>> {
        self.bulkhead
            .execute("find_entities", || self.inner.find_entities(query))
    }

    fn delete_entity(&self, user_id: &str, guid: &Guid) -> Result<bool> {
        self.bulkhead
            .execute("delete_entity", || self.inner.delete_entity(user_id, guid))
    }

    fn get_relationship(&self, guid: &Guid) -> Result<Option<Relationship>> {
        self.bulkhead
            .execute("get_relationship", || self.inner.get_relationship(guid))
    }

    fn get_relationships(
        &self,
        entity_guid: &Guid,
        type_name: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        self.bulkhead.execute("get_relationships", || {
            self.inner.get_relationships(entity_guid, type_name)
        })
    }

    fn get_relationships_between(
        &self,
        end_one: &Guid,
        end_two: &Guid,
        type_name: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        self.bulkhead.execute("get_relationships_between", || {
            self.inner
                .get_relationships_between(end_one, end_two, type_name)
        })
    }

    fn create_relationship(
        &self,
        user_id: &str,
        type_name: &str,
        end_one: &Guid,
        end_two: &Guid,
        properties: InstanceProperties,
    ) -> Result<Relationship> {
        self.bulkhead.execute("create_relationship", || {
            self.inner
                .create_relationship(user_id, type_name, end_one, end_two, properties)
        })
    }

    fn update_relationship_properties(
        &self,
        user_id: &str,
        guid: &Guid,
        expected_version: Option<u64>,
        properties: InstanceProperties,
    ) -> Result<Relationship> {
        self.bulkhead.execute("update_relationship_properties", || {
            self.inner
                .update_relationship_properties(user_id, guid, expected_version, properties)
        })
    }

    fn delete_relationship(
        &self,
        user_id: &str,
        guid: &Guid,
        expected_version: Option<u64>,
    ) -> Result<bool> {
        self.bulkhead.execute("delete_relationship", || {
            self.inner.delete_relationship(user_id, guid, expected_version)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryRepository;

    #[test]
    fn test_passes_calls_through() {
        let repo = BulkheadRepository::new(
            InMemoryRepository::new(),
            BulkheadConfig::new().with_max_concurrent(2),
            "test",
        );
        let entity = EntityDetail::new("Asset", InstanceProperties::new());
        repo.store_entity("tester", &entity).unwrap();

        assert!(repo.get_entity(&entity.guid).unwrap().is_some());
        assert_eq!(repo.inner().entity_count(), 1);
        assert_eq!(repo.available_permits(), 2);
    }

    #[test]
    fn test_fail_fast_rejects_when_exhausted() {
        let repo = BulkheadRepository::new(
            InMemoryRepository::new(),
            BulkheadConfig::new().with_max_concurrent(1).with_fail_fast(true),
            "test",
        );
        let held = repo.bulkhead.acquire().unwrap();
        assert!(repo.get_entity(&Guid::new("x")).is_err());
        drop(held);
        assert!(repo.get_entity(&Guid::new("x")).unwrap().is_none());
    }
}
