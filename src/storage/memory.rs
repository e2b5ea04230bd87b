//! In-memory repository.
//!
//! Provides a fast, non-persistent implementation of [`MetadataRepository`]
//! for tests, the CLI and single-process deployments.

use super::traits::{EntityQuery, MetadataRepository};
use crate::models::{EntityDetail, Guid, InstanceProperties, Relationship, type_registry};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory repository.
///
/// Uses `RwLock` for thread-safe access with reader-writer semantics.
/// Data is not persisted between runs.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    entities: RwLock<HashMap<Guid, EntityDetail>>,
    relationships: RwLock<HashMap<Guid, Relationship>>,
}

fn lock_error(operation: &str) -> Error {
    Error::server(operation, "repository lock poisoned")
}

fn type_matches(actual: &str, expected: Option<&str>) -> bool {
    expected.is_none_or(|expected| type_registry().is_type_of(actual, expected))
}

fn check_version(operation: &str, relationship: &Relationship, expected: Option<u64>) -> Result<()> {
    match expected {
        Some(expected) if expected != relationship.header.version => Err(Error::server(
            operation,
            format!(
                "version conflict on {}: expected {expected}, found {}",
                relationship.guid, relationship.header.version
            ),
        )),
        _ => Ok(()),
    }
}

impl InMemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entities stored.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns the number of relationships stored.
    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.relationships.read().map(|r| r.len()).unwrap_or(0)
    }
}

impl MetadataRepository for InMemoryRepository {
    fn store_entity(&self, user_id: &str, entity: &EntityDetail) -> Result<()> {
        let mut entities = self
            .entities
            .write()
            .map_err(|_| lock_error("store_entity"))?;

        let mut stored = entity.clone();
        if let Some(existing) = entities.get(&entity.guid) {
            stored.header.version = existing.header.version + 1;
            stored.header.created_by.clone_from(&existing.header.created_by);
            stored.header.create_time = existing.header.create_time;
            stored.header.updated_by = Some(user_id.to_string());
            stored.header.update_time = Some(Utc::now());
        } else if stored.header.created_by.is_none() {
            stored.header.created_by = Some(user_id.to_string());
        }

        entities.insert(stored.guid.clone(), stored);
        Ok(())
    }

    fn get_entity(&self, guid: &Guid) -> Result<Option<EntityDetail>> {
        let entities = self.entities.read().map_err(|_| lock_error("get_entity"))?;
        Ok(entities.get(guid).cloned())
    }

    fn find_entities(&self, query: &EntityQuery) -> Result<Vec<EntityDetail>> {
        let entities = self
            .entities
            .read()
            .map_err(|_| lock_error("find_entities"))?;

        let mut results: Vec<EntityDetail> = entities
            .values()
            .filter(|e| type_matches(e.type_name(), query.type_name.as_deref()))
            .filter(|e| {
                query
                    .property
                    .as_ref()
                    .is_none_or(|(name, value)| e.properties.get_str(name) == Some(value.as_str()))
            })
            .cloned()
            .collect();

        results.sort_by(|a, b| a.guid.cmp(&b.guid));
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    fn delete_entity(&self, _user_id: &str, guid: &Guid) -> Result<bool> {
        let mut entities = self
            .entities
            .write()
            .map_err(|_| lock_error("delete_entity"))?;
        let mut relationships = self
            .relationships
            .write()
            .map_err(|_| lock_error("delete_entity"))?;

        let existed = entities.remove(guid).is_some();
        if existed {
            relationships.retain(|_, r| !r.touches(guid));
        }
        Ok(existed)
    }

    fn get_relationship(&self, guid: &Guid) -> Result<Option<Relationship>> {
        let relationships = self
            .relationships
            .read()
            .map_err(|_| lock_error("get_relationship"))?;
        Ok(relationships.get(guid).cloned())
    }

    fn get_relationships(
        &self,
        entity_guid: &Guid,
        type_name: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        let relationships = self
            .relationships
            .read()
            .map_err(|_| lock_error("get_relationships"))?;

        let mut results: Vec<Relationship> = relationships
            .values()
            .filter(|r| r.touches(entity_guid) && type_matches(r.type_name(), type_name))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.header.create_time.cmp(&b.header.create_time));
        Ok(results)
    }

    fn get_relationships_between(
        &self,
        end_one: &Guid,
        end_two: &Guid,
        type_name: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        let relationships = self
            .relationships
            .read()
            .map_err(|_| lock_error("get_relationships_between"))?;

        Ok(relationships
            .values()
            .filter(|r| {
                &r.end_one.guid == end_one
                    && &r.end_two.guid == end_two
                    && type_matches(r.type_name(), type_name)
            })
            .cloned()
            .collect())
    }

    fn create_relationship(
        &self,
        user_id: &str,
        type_name: &str,
        end_one: &Guid,
        end_two: &Guid,
        properties: InstanceProperties,
    ) -> Result<Relationship> {
        let entities = self
            .entities
            .read()
            .map_err(|_| lock_error("create_relationship"))?;

        let find_end = |guid: &Guid| {
            entities.get(guid).map(EntityDetail::proxy).ok_or_else(|| {
                Error::server("create_relationship", format!("entity {guid} not found"))
            })
        };
        let proxy_one = find_end(end_one)?;
        let proxy_two = find_end(end_two)?;
        drop(entities);

        let mut relationship = Relationship::new(type_name, proxy_one, proxy_two, properties);
        relationship.header.created_by = Some(user_id.to_string());

        let mut relationships = self
            .relationships
            .write()
            .map_err(|_| lock_error("create_relationship"))?;
        relationships.insert(relationship.guid.clone(), relationship.clone());
        Ok(relationship)
    }

    fn update_relationship_properties(
        &self,
        user_id: &str,
        guid: &Guid,
        expected_version: Option<u64>,
        properties: InstanceProperties,
    ) -> Result<Relationship> {
        const OPERATION: &str = "update_relationship_properties";
        let mut relationships = self
            .relationships
            .write()
            .map_err(|_| lock_error(OPERATION))?;

        let relationship = relationships
            .get_mut(guid)
            .ok_or_else(|| Error::server(OPERATION, format!("relationship {guid} not found")))?;
        check_version(OPERATION, relationship, expected_version)?;

        relationship.properties = properties;
        relationship.header.version += 1;
        relationship.header.updated_by = Some(user_id.to_string());
        relationship.header.update_time = Some(Utc::now());
        Ok(relationship.clone())
    }

    fn delete_relationship(
        &self,
        _user_id: &str,
        guid: &Guid,
        expected_version: Option<u64>,
    ) -> Result<bool> {
        const OPERATION: &str = "delete_relationship";
        let mut relationships = self
            .relationships
            .write()
            .map_err(|_| lock_error(OPERATION))?;

        let Some(relationship) = relationships.get(guid) else {
            return Ok(false);
        };
        check_version(OPERATION, relationship, expected_version)?;
        relationships.remove(guid);
        Ok(true)
    }
}
