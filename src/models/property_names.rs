//! Property names used in repository property bags.
//!
//! Each constant is the literal storage key. [`TYPE_PROPERTIES`] lists, per
//! type, the keys a converter for that type claims; anything outside that list
//! ends up in a bean's extended properties.

/// Unique name of a referenceable element.
pub const QUALIFIED_NAME: &str = "qualifiedName";
/// Free-form additional properties set by the caller.
pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
/// Display name.
pub const DISPLAY_NAME: &str = "displayName";
/// Short name.
pub const NAME: &str = "name";
/// Description.
pub const DESCRIPTION: &str = "description";
/// Version identifier.
pub const VERSION_IDENTIFIER: &str = "versionIdentifier";

/// Glossary term summary.
pub const SUMMARY: &str = "summary";
/// Glossary term examples.
pub const EXAMPLES: &str = "examples";
/// Glossary term abbreviation.
pub const ABBREVIATION: &str = "abbreviation";
/// Glossary term usage.
pub const USAGE: &str = "usage";

/// Rating star value.
pub const STAR_RATING: &str = "starRating";
/// Rating review text.
pub const REVIEW: &str = "review";
/// Whether feedback is visible to other users.
pub const IS_PUBLIC: &str = "isPublic";

/// External identifier value.
pub const IDENTIFIER: &str = "identifier";
/// Key pattern of an external identifier.
pub const KEY_PATTERN: &str = "keyPattern";
/// User that created the external instance.
pub const EXTERNAL_INSTANCE_CREATED_BY: &str = "externalInstanceCreatedBy";
/// Creation time of the external instance.
pub const EXTERNAL_INSTANCE_CREATION_TIME: &str = "externalInstanceCreationTime";
/// User that last updated the external instance.
pub const EXTERNAL_INSTANCE_LAST_UPDATED_BY: &str = "externalInstanceLastUpdatedBy";
/// Last update time of the external instance.
pub const EXTERNAL_INSTANCE_LAST_UPDATE_TIME: &str = "externalInstanceLastUpdateTime";
/// Version of the external instance.
pub const EXTERNAL_INSTANCE_VERSION: &str = "externalInstanceVersion";
/// Mapping properties of a correlation.
pub const MAPPING_PROPERTIES: &str = "mappingProperties";
/// Last synchronisation time.
pub const LAST_SYNCHRONIZED: &str = "lastSynchronized";
/// Source of an external identifier.
pub const SOURCE: &str = "source";
/// Permitted synchronisation direction.
pub const PERMITTED_SYNCHRONIZATION: &str = "permittedSynchronization";

/// Guard selecting a control flow edge.
pub const GUARD: &str = "guard";
/// Whether the guard must be produced.
pub const MANDATORY_GUARD: &str = "mandatoryGuard";
/// Process containment type.
pub const CONTAINMENT_TYPE: &str = "containmentType";
/// Port direction.
pub const PORT_TYPE: &str = "portType";

/// Sort order of a schema attribute.
pub const SORT_ORDER: &str = "sortOrder";
/// Position of a schema attribute.
pub const POSITION: &str = "position";
/// Minimum cardinality.
pub const MIN_CARDINALITY: &str = "minCardinality";
/// Maximum cardinality.
pub const MAX_CARDINALITY: &str = "maxCardinality";
/// Whether duplicate values are allowed.
pub const ALLOWS_DUPLICATE_VALUES: &str = "allowsDuplicateValues";
/// Whether values are ordered.
pub const ORDERED_VALUES: &str = "orderedValues";
/// Default value override.
pub const DEFAULT_VALUE_OVERRIDE: &str = "defaultValueOverride";
/// Minimum length.
pub const MINIMUM_LENGTH: &str = "minimumLength";
/// Length.
pub const LENGTH: &str = "length";
/// Precision.
pub const PRECISION: &str = "precision";
/// Whether the attribute may be null.
pub const IS_NULLABLE: &str = "isNullable";
/// Native class of the attribute.
pub const NATIVE_CLASS: &str = "nativeClass";
/// Alternative names.
pub const ALIASES: &str = "aliases";

/// Governance domain identifier.
pub const DOMAIN_IDENTIFIER: &str = "domainIdentifier";
/// Request type of an engine action or registration.
pub const REQUEST_TYPE: &str = "requestType";
/// Request type passed on to the service.
pub const SERVICE_REQUEST_TYPE: &str = "serviceRequestType";
/// Request parameters.
pub const REQUEST_PARAMETERS: &str = "requestParameters";
/// Engine action status.
pub const ACTION_STATUS: &str = "actionStatus";
/// User id of the engine processing an action.
pub const PROCESSING_ENGINE_USER_ID: &str = "processingEngineUserId";
/// Time an action was requested.
pub const REQUESTED_TIME: &str = "requestedTime";
/// Time an action should start or started.
pub const START_TIME: &str = "startTime";
/// Time an action completed.
pub const COMPLETION_TIME: &str = "completionTime";
/// Guards produced on completion.
pub const COMPLETION_GUARDS: &str = "completionGuards";
/// Message produced on completion.
pub const COMPLETION_MESSAGE: &str = "completionMessage";
/// GUID of the engine running an action.
pub const EXECUTOR_ENGINE_GUID: &str = "executorEngineGUID";
/// Name of the engine running an action.
pub const EXECUTOR_ENGINE_NAME: &str = "executorEngineName";
/// Name of an action target.
pub const ACTION_TARGET_NAME: &str = "actionTargetName";
/// Provider used to instantiate a governance service.
pub const CONNECTOR_PROVIDER_NAME: &str = "connectorProviderName";

/// Purpose of a survey report.
pub const PURPOSE: &str = "purpose";
/// User that ran a survey.
pub const USER_ID: &str = "userId";
/// Annotation type.
pub const ANNOTATION_TYPE: &str = "annotationType";
/// Annotation confidence.
pub const CONFIDENCE_LEVEL: &str = "confidenceLevel";
/// Analysis step that produced an annotation.
pub const ANALYSIS_STEP: &str = "analysisStep";
/// JSON payload of an annotation.
pub const JSON_PROPERTIES: &str = "jsonProperties";
/// Explanation of an annotation.
pub const EXPLANATION: &str = "explanation";

/// Properties recognised for one type.
#[derive(Debug, Clone, Copy)]
pub struct TypeProperties {
    /// Type name.
    pub type_name: &'static str,
    /// Property keys claimed by the converter for this type.
    pub properties: &'static [&'static str],
}

/// Recognised properties per entity and relationship type.
pub const TYPE_PROPERTIES: &[TypeProperties] = &[
    TypeProperties {
        type_name: "GlossaryTerm",
        properties: &[
            QUALIFIED_NAME,
            DISPLAY_NAME,
            SUMMARY,
            DESCRIPTION,
            EXAMPLES,
            ABBREVIATION,
            USAGE,
            ADDITIONAL_PROPERTIES,
        ],
    },
    TypeProperties {
        type_name: "Rating",
        properties: &[STAR_RATING, REVIEW],
    },
    TypeProperties {
        type_name: "AttachedRating",
        properties: &[IS_PUBLIC],
    },
    TypeProperties {
        type_name: "ExternalId",
        properties: &[
            IDENTIFIER,
            KEY_PATTERN,
            EXTERNAL_INSTANCE_CREATED_BY,
            EXTERNAL_INSTANCE_CREATION_TIME,
            EXTERNAL_INSTANCE_LAST_UPDATED_BY,
            EXTERNAL_INSTANCE_LAST_UPDATE_TIME,
            EXTERNAL_INSTANCE_VERSION,
            MAPPING_PROPERTIES,
        ],
    },
    TypeProperties {
        type_name: "ExternalIdScope",
        properties: &[PERMITTED_SYNCHRONIZATION, DESCRIPTION],
    },
    TypeProperties {
        type_name: "ExternalIdLink",
        properties: &[DESCRIPTION, USAGE, SOURCE, LAST_SYNCHRONIZED],
    },
    TypeProperties {
        type_name: "ControlFlow",
        properties: &[QUALIFIED_NAME, DESCRIPTION, GUARD, MANDATORY_GUARD],
    },
    TypeProperties {
        type_name: "ProcessHierarchy",
        properties: &[CONTAINMENT_TYPE],
    },
    TypeProperties {
        type_name: "Port",
        properties: &[
            QUALIFIED_NAME,
            DISPLAY_NAME,
            PORT_TYPE,
            ADDITIONAL_PROPERTIES,
        ],
    },
    TypeProperties {
        type_name: "SchemaAttribute",
        properties: &[
            QUALIFIED_NAME,
            DISPLAY_NAME,
            DESCRIPTION,
            POSITION,
            MIN_CARDINALITY,
            MAX_CARDINALITY,
            ALLOWS_DUPLICATE_VALUES,
            ORDERED_VALUES,
            SORT_ORDER,
            DEFAULT_VALUE_OVERRIDE,
            MINIMUM_LENGTH,
            LENGTH,
            PRECISION,
            IS_NULLABLE,
            NATIVE_CLASS,
            ALIASES,
            ADDITIONAL_PROPERTIES,
        ],
    },
    TypeProperties {
        type_name: "EngineAction",
        properties: &[
            QUALIFIED_NAME,
            DOMAIN_IDENTIFIER,
            DISPLAY_NAME,
            DESCRIPTION,
            REQUEST_TYPE,
            REQUEST_PARAMETERS,
            ACTION_STATUS,
            PROCESSING_ENGINE_USER_ID,
            REQUESTED_TIME,
            START_TIME,
            COMPLETION_TIME,
            COMPLETION_GUARDS,
            COMPLETION_MESSAGE,
            EXECUTOR_ENGINE_GUID,
            EXECUTOR_ENGINE_NAME,
        ],
    },
    TypeProperties {
        type_name: "TargetForAction",
        properties: &[ACTION_TARGET_NAME, ACTION_STATUS, COMPLETION_MESSAGE],
    },
    TypeProperties {
        type_name: "GovernanceEngine",
        properties: &[
            QUALIFIED_NAME,
            DISPLAY_NAME,
            DESCRIPTION,
            VERSION_IDENTIFIER,
            ADDITIONAL_PROPERTIES,
        ],
    },
    TypeProperties {
        type_name: "GovernanceService",
        properties: &[
            QUALIFIED_NAME,
            DISPLAY_NAME,
            DESCRIPTION,
            VERSION_IDENTIFIER,
            CONNECTOR_PROVIDER_NAME,
            ADDITIONAL_PROPERTIES,
        ],
    },
    TypeProperties {
        type_name: "SupportedGovernanceService",
        properties: &[REQUEST_TYPE, SERVICE_REQUEST_TYPE, REQUEST_PARAMETERS],
    },
];

/// Returns the recognised properties for a type, if listed.
#[must_use]
pub fn properties_for(type_name: &str) -> Option<&'static [&'static str]> {
    TYPE_PROPERTIES
        .iter()
        .find(|entry| entry.type_name == type_name)
        .map(|entry| entry.properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_property_keys_unique_within_type() {
        for entry in TYPE_PROPERTIES {
            let unique: HashSet<_> = entry.properties.iter().collect();
            assert_eq!(
                unique.len(),
                entry.properties.len(),
                "duplicate key in {}",
                entry.type_name
            );
        }
    }

    #[test]
    fn test_type_names_unique() {
        let unique: HashSet<_> = TYPE_PROPERTIES.iter().map(|e| e.type_name).collect();
        assert_eq!(unique.len(), TYPE_PROPERTIES.len());
    }

    #[test]
    fn test_properties_for() {
        assert!(properties_for("Rating").is_some_and(|p| p.contains(&STAR_RATING)));
        assert!(properties_for("Unknown").is_none());
    }
}
