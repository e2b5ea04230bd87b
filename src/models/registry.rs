//! Type definition registry.
//!
//! A read-only table of the entity and relationship types this crate knows,
//! with their stable GUIDs and single-inheritance supertypes. Built once and
//! shared; never mutated at runtime.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Category of a type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDefCategory {
    /// Entity type.
    Entity,
    /// Relationship type.
    Relationship,
    /// Classification type.
    Classification,
}

impl TypeDefCategory {
    /// Returns the category as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Relationship => "relationship",
            Self::Classification => "classification",
        }
    }
}

impl fmt::Display for TypeDefCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary of one type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDefSummary {
    /// Stable GUID.
    pub guid: &'static str,
    /// Type name.
    pub name: &'static str,
    /// Direct supertype.
    pub super_type: Option<&'static str>,
    /// Category.
    pub category: TypeDefCategory,
}

const fn entity(
    guid: &'static str,
    name: &'static str,
    super_type: Option<&'static str>,
) -> TypeDefSummary {
    TypeDefSummary {
        guid,
        name,
        super_type,
        category: TypeDefCategory::Entity,
    }
}

const fn relationship(guid: &'static str, name: &'static str) -> TypeDefSummary {
    TypeDefSummary {
        guid,
        name,
        super_type: None,
        category: TypeDefCategory::Relationship,
    }
}

/// Known type definitions.
pub const TYPE_DEFS: &[TypeDefSummary] = &[
    entity("4e7761e8-3969-4627-8f40-bfe3cde85a1d", "OpenMetadataRoot", None),
    entity(
        "a32316b8-dc8c-48c5-b12b-71c1b2a080bf",
        "Referenceable",
        Some("OpenMetadataRoot"),
    ),
    entity("896d14c2-7522-4f6c-8519-757711943fe6", "Asset", Some("Referenceable")),
    entity("d8f33bd7-afa9-4a11-a8c7-07dcec83c050", "Process", Some("Asset")),
    entity("e3d9fd9f-d5ed-2aed-ccba-bc34b2fffe2d", "Port", Some("Referenceable")),
    entity("adbbdf06-a6a9-4ab3-8b93-ea1b2c5d7e04", "PortImplementation", Some("Port")),
    entity("dfa5aeb1-bb6d-4e9a-9b33-2c5e8ac2c2a3", "PortAlias", Some("Port")),
    entity(
        "0db3e6ec-f5ef-4d75-ae38-b7ee6fd6ec0a",
        "GlossaryTerm",
        Some("Referenceable"),
    ),
    entity("7299d721-d17f-4562-8286-bcd451814478", "Rating", Some("OpenMetadataRoot")),
    entity("7c8f8c2c-cc48-429e-8a21-a1f1851ccdb0", "ExternalId", Some("Referenceable")),
    entity(
        "718d4244-8559-49ed-ad5a-10e5c305a656",
        "SchemaElement",
        Some("Referenceable"),
    ),
    entity(
        "1a5e159b-913a-43b1-95fe-04433b25fca9",
        "SchemaAttribute",
        Some("SchemaElement"),
    ),
    entity("c976d88a-2b11-4b40-b972-c38d41bfc6be", "EngineAction", Some("Referenceable")),
    entity(
        "54055c38-b9ad-4a66-a75b-14dc643d4c69",
        "SoftwareCapability",
        Some("Referenceable"),
    ),
    entity(
        "03170ce7-edf1-4e94-b6ab-2d5cbbf1f13c",
        "AssetManager",
        Some("SoftwareCapability"),
    ),
    entity(
        "3fa23d4a-aceb-422f-9301-04ed474c6f74",
        "GovernanceEngine",
        Some("SoftwareCapability"),
    ),
    entity(
        "5d74250a-57ca-4197-9475-8911f620a94e",
        "SurveyActionEngine",
        Some("GovernanceEngine"),
    ),
    entity(
        "7f9b7ac0-30e8-4a7e-b6b8-8d2a83a9a7c1",
        "GovernanceActionEngine",
        Some("GovernanceEngine"),
    ),
    entity("191d870c-26f4-4310-a021-b8ca8772719d", "GovernanceService", Some("Asset")),
    entity(
        "41d2bb0a-4a2e-4b6f-9b7f-2ae2c1b3d7f6",
        "SurveyActionService",
        Some("GovernanceService"),
    ),
    entity(
        "ace6ed64-8f5b-4e22-9e0a-58f6d3a6c8c4",
        "GovernanceActionService",
        Some("GovernanceService"),
    ),
    entity("2a4bc6a6-dd4b-42dc-a3c8-1c5a5c8a5c21", "SurveyReport", Some("Referenceable")),
    entity("6cea5b53-558c-48f1-8191-11d48db29fb4", "Annotation", Some("OpenMetadataRoot")),
    relationship("0aaad9e9-9cc5-4ad8-bc2e-c1099bab6344", "AttachedRating"),
    relationship("8c5b1415-2d1f-4190-ba6c-1fdd47f03269", "ExternalIdScope"),
    relationship("28ab0381-c662-4b6d-b787-5d77208de126", "ExternalIdLink"),
    relationship("35450726-1c32-4d41-b928-22db6d1ae2f4", "ControlFlow"),
    relationship("70dbbda3-903f-49f7-9782-32b503c43e0e", "ProcessHierarchy"),
    relationship("2726df0e-4f3a-44e1-8433-4ca5301457fd", "SupportedGovernanceService"),
    relationship("46ec49bf-af66-4575-aab7-06ce895120cd", "TargetForAction"),
    relationship("1cd6d1a0-7d3f-4c8e-8a5c-2f29c1d1e7b1", "AssetSurveyReport"),
    relationship("5b3ff05f-9cba-4b37-9a7e-c1c3a6d8e8a3", "ReportedAnnotation"),
];

/// Lookup structure over [`TYPE_DEFS`].
#[derive(Debug)]
pub struct TypeRegistry {
    by_name: HashMap<&'static str, TypeDefSummary>,
    by_guid: HashMap<&'static str, TypeDefSummary>,
}

impl TypeRegistry {
    fn build(defs: &[TypeDefSummary]) -> Self {
        let by_name = defs.iter().map(|def| (def.name, *def)).collect();
        let by_guid = defs.iter().map(|def| (def.guid, *def)).collect();
        Self { by_name, by_guid }
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&TypeDefSummary> {
        self.by_name.get(name)
    }

    /// Looks up a type by GUID.
    #[must_use]
    pub fn get_by_guid(&self, guid: &str) -> Option<&TypeDefSummary> {
        self.by_guid.get(guid)
    }

    /// Supertype names of `name`, nearest first.
    #[must_use]
    pub fn super_types(&self, name: &str) -> Vec<&'static str> {
        let mut result = Vec::new();
        let mut current = self.get_by_name(name).and_then(|def| def.super_type);
        while let Some(super_name) = current {
            // Guard against a cycle in the table.
            if result.contains(&super_name) {
                break;
            }
            result.push(super_name);
            current = self.get_by_name(super_name).and_then(|def| def.super_type);
        }
        result
    }

    /// Returns `true` if `actual` is `expected` or one of its subtypes.
    #[must_use]
    pub fn is_type_of(&self, actual: &str, expected: &str) -> bool {
        actual == expected || self.super_types(actual).contains(&expected)
    }
}

static TYPE_REGISTRY: Lazy<TypeRegistry> = Lazy::new(|| TypeRegistry::build(TYPE_DEFS));

/// Returns the shared type registry.
#[must_use]
pub fn type_registry() -> &'static TypeRegistry {
    &TYPE_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_and_guids_unique() {
        let names: HashSet<_> = TYPE_DEFS.iter().map(|d| d.name).collect();
        let guids: HashSet<_> = TYPE_DEFS.iter().map(|d| d.guid).collect();
        assert_eq!(names.len(), TYPE_DEFS.len());
        assert_eq!(guids.len(), TYPE_DEFS.len());
    }

    #[test]
    fn test_supertypes_resolve() {
        for def in TYPE_DEFS {
            if let Some(super_type) = def.super_type {
                assert!(
                    type_registry().get_by_name(super_type).is_some(),
                    "{} has unknown supertype {super_type}",
                    def.name
                );
            }
        }
    }

    #[test]
    fn test_is_type_of() {
        let registry = type_registry();
        assert!(registry.is_type_of("SurveyActionEngine", "GovernanceEngine"));
        assert!(registry.is_type_of("SurveyActionEngine", "Referenceable"));
        assert!(registry.is_type_of("ControlFlow", "ControlFlow"));
        assert!(!registry.is_type_of("GovernanceEngine", "SurveyActionEngine"));
        assert!(!registry.is_type_of("Unknown", "Referenceable"));
    }

    #[test]
    fn test_lookup_by_guid() {
        let def = type_registry()
            .get_by_guid("0db3e6ec-f5ef-4d75-ae38-b7ee6fd6ec0a")
            .unwrap();
        assert_eq!(def.name, "GlossaryTerm");
        assert_eq!(def.category, TypeDefCategory::Entity);
    }

    #[test]
    fn test_super_types_order() {
        assert_eq!(
            type_registry().super_types("SchemaAttribute"),
            vec!["SchemaElement", "Referenceable", "OpenMetadataRoot"]
        );
    }
}
