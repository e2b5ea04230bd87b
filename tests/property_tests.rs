//! Property-based tests for ordinal decoding and property draining.
//!
//! - Every ordinal decodes, unknown ones to the type's fallback
//! - Recognised ordinals survive encode/decode
//! - Converters leave only unrecognised properties as extended properties,
//!   for every type with a recognised property list

// Property tests use unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::unwrap_used, clippy::panic)]

use metagov::models::property_names::{TYPE_PROPERTIES, TypeProperties, properties_for};
use metagov::models::{
    Bean, BeanShape, DataItemSortOrder, EngineActionStatus, EntityDetail, EntityProxy, Guid,
    InstanceProperties, KeyPattern, OrdinalEnum, PortType, ProcessContainmentType, PropertyDrain,
    Relationship, StarRating, SynchronizationDirection,
};
use metagov::services::converters::{
    ConversionSource, GlossaryTermConverter, convert, converter_for,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn decodes_to_known_or_fallback<E: OrdinalEnum + PartialEq + std::fmt::Debug>(ordinal: i32) {
    let decoded = E::from_ordinal(ordinal);
    match E::try_from_ordinal(ordinal) {
        Some(known) => assert_eq!(decoded, known),
        None => assert_eq!(decoded, E::FALLBACK),
    }
    // Whatever was decoded re-encodes to a recognised ordinal.
    assert_eq!(E::from_ordinal(decoded.ordinal()), decoded);
}

/// Where a type's property bag sits in a conversion.
enum Placement {
    /// The converted entity, with the entity type to store it as.
    Entity(BeanShape, &'static str),
    /// The converted relationship.
    Relationship(BeanShape),
    /// A relationship attached to an entity of the given type, with the
    /// entity at end one (`true`) or end two (`false`).
    Attached(BeanShape, &'static str, bool),
}

fn placement(type_name: &str) -> Placement {
    match type_name {
        "GlossaryTerm" => Placement::Entity(BeanShape::GlossaryTerm, "GlossaryTerm"),
        "Rating" => Placement::Entity(BeanShape::Rating, "Rating"),
        "AttachedRating" => Placement::Attached(BeanShape::Rating, "Rating", false),
        "ExternalId" => Placement::Entity(BeanShape::MetadataCorrelation, "ExternalId"),
        "ExternalIdScope" | "ExternalIdLink" => {
            Placement::Attached(BeanShape::MetadataCorrelation, "ExternalId", false)
        },
        "ControlFlow" => Placement::Relationship(BeanShape::ControlFlow),
        "ProcessHierarchy" => Placement::Relationship(BeanShape::ProcessHierarchy),
        "Port" => Placement::Entity(BeanShape::Port, "Port"),
        "SchemaAttribute" => Placement::Entity(BeanShape::SchemaAttribute, "SchemaAttribute"),
        "EngineAction" => Placement::Entity(BeanShape::EngineAction, "EngineAction"),
        "TargetForAction" => Placement::Attached(BeanShape::EngineAction, "EngineAction", true),
        "GovernanceEngine" => {
            Placement::Entity(BeanShape::GovernanceEngine, "GovernanceActionEngine")
        },
        "GovernanceService" => {
            Placement::Entity(BeanShape::GovernanceService, "GovernanceActionService")
        },
        "SupportedGovernanceService" => {
            Placement::Relationship(BeanShape::RegisteredGovernanceService)
        },
        other => panic!("no conversion placement for {other}"),
    }
}

fn filled_properties(
    entry: &TypeProperties,
    extras: &BTreeMap<String, String>,
) -> InstanceProperties {
    let properties = entry
        .properties
        .iter()
        .fold(InstanceProperties::new(), |p, key| p.with_string(key, "value"));
    extras
        .iter()
        .fold(properties, |p, (k, v)| p.with_string(k, v.as_str()))
}

fn proxy(type_name: &str) -> EntityProxy {
    EntityProxy::new(Guid::generate(), type_name)
}

/// Keys of every `extended_properties` map anywhere in the bean.
fn extended_keys(value: &serde_json::Value, keys: &mut BTreeSet<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (name, child) in map {
                if name == "extended_properties"
                    && let serde_json::Value::Object(extended) = child
                {
                    keys.extend(extended.keys().cloned());
                }
                extended_keys(child, keys);
            }
        },
        serde_json::Value::Array(items) => {
            for item in items {
                extended_keys(item, keys);
            }
        },
        _ => {},
    }
}

/// Converts a bag of `entry`'s properties and returns the extended keys
/// found in the bean, plus whether the bag was the converted instance.
fn convert_entry(
    entry: &TypeProperties,
    extras: &BTreeMap<String, String>,
) -> (BTreeSet<String>, bool) {
    let properties = filled_properties(entry, extras);
    let (shape, entity, relationships, primary) = match placement(entry.type_name) {
        Placement::Entity(shape, entity_type) => (
            shape,
            Some(EntityDetail::new(entity_type, properties)),
            Vec::new(),
            true,
        ),
        Placement::Relationship(shape) => (
            shape,
            None,
            vec![Relationship::new(
                entry.type_name,
                proxy("Referenceable"),
                proxy("Referenceable"),
                properties,
            )],
            true,
        ),
        Placement::Attached(shape, entity_type, entity_at_end_one) => {
            let entity = EntityDetail::new(entity_type, InstanceProperties::new());
            let own_end = EntityProxy::new(entity.guid.clone(), entity_type);
            let (end_one, end_two) = if entity_at_end_one {
                (own_end, proxy("Referenceable"))
            } else {
                (proxy("Referenceable"), own_end)
            };
            let relationship = Relationship::new(entry.type_name, end_one, end_two, properties);
            (shape, Some(entity), vec![relationship], false)
        },
    };

    let source = ConversionSource {
        entity: entity.as_ref(),
        relationships: &relationships,
        starting_guid: None,
    };
    let converter = converter_for(shape, "server1", "properties");
    let bean = convert(converter.as_ref(), shape, &source, "convertEntry").unwrap();
    assert_eq!(bean.shape(), shape);

    let mut keys = BTreeSet::new();
    extended_keys(&serde_json::to_value(&bean).unwrap(), &mut keys);
    (keys, primary)
}

proptest! {
    /// Property: decoding never fails and unknown ordinals use the fallback.
    #[test]
    fn prop_ordinals_decode_total(ordinal in any::<i32>()) {
        decodes_to_known_or_fallback::<StarRating>(ordinal);
        decodes_to_known_or_fallback::<DataItemSortOrder>(ordinal);
        decodes_to_known_or_fallback::<KeyPattern>(ordinal);
        decodes_to_known_or_fallback::<SynchronizationDirection>(ordinal);
        decodes_to_known_or_fallback::<PortType>(ordinal);
        decodes_to_known_or_fallback::<ProcessContainmentType>(ordinal);
        decodes_to_known_or_fallback::<EngineActionStatus>(ordinal);
    }

    /// Property: star ratings outside 0-5 and 99 are no recommendation.
    #[test]
    fn prop_star_rating_out_of_range(ordinal in any::<i32>().prop_filter(
        "recognised", |o| !(0..=5).contains(o) && *o != 99
    )) {
        prop_assert_eq!(StarRating::from_ordinal(ordinal), StarRating::NoRecommendation);
    }

    /// Property: a drain removes exactly what is taken.
    #[test]
    fn prop_drain_leaves_untaken(
        values in prop::collection::btree_map("[a-z]{1,8}", "[a-zA-Z0-9 ]{0,16}", 0..12),
        take_mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        let properties = values
            .iter()
            .fold(InstanceProperties::new(), |p, (k, v)| p.with_string(k, v.as_str()));
        let mut drain = PropertyDrain::new(properties);

        let mut expected_left = BTreeMap::new();
        for ((name, value), take) in values.iter().zip(take_mask.iter()) {
            if *take {
                prop_assert_eq!(drain.take_string(name), Some(value.clone()));
                prop_assert!(!drain.contains(name));
            } else {
                expected_left.insert(name.clone(), serde_json::Value::String(value.clone()));
            }
        }

        prop_assert_eq!(drain.into_extended(), expected_left);
    }

    /// Property: glossary term conversion keeps only unknown properties as
    /// extended properties.
    #[test]
    fn prop_glossary_extended_properties_exclude_recognised(
        extras in prop::collection::btree_map("x[A-Z][a-z]{2,8}", "[a-z]{1,8}", 0..6),
    ) {
        let recognised = properties_for("GlossaryTerm").unwrap();
        let mut properties = recognised
            .iter()
            .fold(InstanceProperties::new(), |p, key| p.with_string(key, "value"));
        for (name, value) in &extras {
            properties = properties.with_string(name, value.as_str());
        }
        let entity = EntityDetail::new("GlossaryTerm", properties);

        let converter = GlossaryTermConverter::new("server1", "glossary");
        let bean = convert(
            &converter,
            BeanShape::GlossaryTerm,
            &ConversionSource::entity(&entity),
            "getTermByGUID",
        )
        .unwrap();
        let Bean::GlossaryTerm(element) = bean else {
            panic!("expected glossary term bean");
        };
        let extended = element.glossary_term_properties.unwrap().extended_properties;

        for key in recognised {
            prop_assert!(!extended.contains_key(*key), "{} leaked into extended properties", key);
        }
        let names: Vec<&String> = extended.keys().collect();
        let expected: Vec<&String> = extras.keys().collect();
        prop_assert_eq!(names, expected);
    }

    /// Property: for every type with a recognised property list, none of
    /// those properties reach extended properties, and unknown properties on
    /// the converted instance do.
    #[test]
    fn prop_no_type_leaks_recognised_properties(
        extras in prop::collection::btree_map("x[A-Z][a-z]{2,8}", "[a-z]{1,8}", 0..4),
    ) {
        for entry in TYPE_PROPERTIES {
            let (keys, primary) = convert_entry(entry, &extras);
            for key in entry.properties {
                prop_assert!(
                    !keys.contains(*key),
                    "{} leaked {} into extended properties",
                    entry.type_name,
                    key
                );
            }
            if primary {
                let expected: BTreeSet<String> = extras.keys().cloned().collect();
                prop_assert_eq!(&keys, &expected, "{}", entry.type_name);
            }
        }
    }
}
