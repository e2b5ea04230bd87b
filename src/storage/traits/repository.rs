//! Repository access trait.
//!
//! The repository owns entities and relationships. Converters and handlers
//! consume it as an opaque CRUD + traversal interface.
//!
//! # Error Modes and Guarantees
//!
//! All methods return `Result<T>` with errors propagated via [`crate::Error`].
//!
//! | Operation | Notes |
//! |-----------|-------|
//! | `store_entity` | Insert or replace; bumps the version on replace |
//! | `get_entity` | `Ok(None)` when absent |
//! | `find_entities` | Type filter uses the type hierarchy (is-a) |
//! | `delete_entity` | Cascades to relationships touching the entity |
//! | `get_relationships` | Type filter uses the type hierarchy (is-a) |
//! | `create_relationship` | Fails if either end is missing |
//! | `update_relationship_properties` | Optional optimistic version check |
//! | `delete_relationship` | Optional optimistic version check |
//!
//! # Example
//!
//! ```rust,ignore
//! use metagov::storage::{EntityQuery, MetadataRepository};
//!
//! let engines = repository.find_entities(
//!     &EntityQuery::new()
//!         .with_type("GovernanceEngine")
//!         .with_property("qualifiedName", "AssetSurvey:engine"),
//! )?;
//! ```

use crate::Result;
use crate::models::{EntityDetail, Guid, InstanceProperties, Relationship};

/// Filter for [`MetadataRepository::find_entities`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityQuery {
    /// Entity type, including subtypes.
    pub type_name: Option<String>,
    /// String property that must match exactly.
    pub property: Option<(String, String)>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl EntityQuery {
    /// Creates an unfiltered query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by type (and subtypes).
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Filters by an exact string property value.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.property = Some((name.into(), value.into()));
        self
    }

    /// Limits the number of results.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Trait for metadata repositories.
///
/// # Implementor Notes
///
/// - Methods use `&self` to enable sharing via `Arc<dyn MetadataRepository>`
/// - Use interior mutability (e.g., `RwLock`) for mutable state
/// - Returned instances are copies; callers may mutate them freely
pub trait MetadataRepository: Send + Sync {
    /// Stores an entity, replacing any entity with the same GUID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn store_entity(&self, user_id: &str, entity: &EntityDetail) -> Result<()>;

    /// Retrieves an entity by GUID.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn get_entity(&self, guid: &Guid) -> Result<Option<EntityDetail>>;

    /// Finds entities matching the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn find_entities(&self, query: &EntityQuery) -> Result<Vec<EntityDetail>>;

    /// Deletes an entity and every relationship touching it.
    ///
    /// Returns `true` if the entity existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    fn delete_entity(&self, user_id: &str, guid: &Guid) -> Result<bool>;

    /// Retrieves a relationship by GUID.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn get_relationship(&self, guid: &Guid) -> Result<Option<Relationship>>;

    /// Relationships touching an entity, optionally of a type (is-a).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_relationships(
        &self,
        entity_guid: &Guid,
        type_name: Option<&str>,
    ) -> Result<Vec<Relationship>>;

    /// Relationships with `end_one` at end one and `end_two` at end two.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_relationships_between(
        &self,
        end_one: &Guid,
        end_two: &Guid,
        type_name: Option<&str>,
    ) -> Result<Vec<Relationship>>;

    /// Creates a relationship between two stored entities.
    ///
    /// # Errors
    ///
    /// Returns an error if either end does not exist or storage fails.
    fn create_relationship(
        &self,
        user_id: &str,
        type_name: &str,
        end_one: &Guid,
        end_two: &Guid,
        properties: InstanceProperties,
    ) -> Result<Relationship>;

    /// Replaces the properties of a relationship.
    ///
    /// When `expected_version` is set and differs from the stored version the
    /// update is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the relationship is missing, the version check
    /// fails, or storage fails.
    fn update_relationship_properties(
        &self,
        user_id: &str,
        guid: &Guid,
        expected_version: Option<u64>,
        properties: InstanceProperties,
    ) -> Result<Relationship>;

    /// Deletes a relationship.
    ///
    /// Returns `true` if the relationship existed. When `expected_version` is
    /// set and differs from the stored version the delete is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the version check or storage fails.
    fn delete_relationship(
        &self,
        user_id: &str,
        guid: &Guid,
        expected_version: Option<u64>,
    ) -> Result<bool>;
}
