//! Remove-on-read access to an owned property bag.
//!
//! Converters take every property they recognise out of the bag, in a fixed
//! order, and only then call [`PropertyDrain::into_extended`]. Whatever is left
//! is pass-through data for subtypes the converter does not know about.

use super::instance::{InstanceProperties, InstancePropertyValue};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// An owned copy of a property bag that is consumed as it is read.
///
/// Each `take_*` removes the named property whether or not its value has the
/// expected kind. A value of the wrong kind yields `None` and is dropped, so
/// a malformed recognised property never leaks into the extended properties.
#[derive(Debug, Clone, Default)]
pub struct PropertyDrain {
    remaining: InstanceProperties,
}

impl PropertyDrain {
    /// Takes ownership of a copy of the properties.
    #[must_use]
    pub fn new(properties: InstanceProperties) -> Self {
        Self {
            remaining: properties,
        }
    }

    /// Starts from a borrowed bag (cloned, the source is never mutated).
    #[must_use]
    pub fn from_ref(properties: &InstanceProperties) -> Self {
        Self::new(properties.clone())
    }

    /// Removes a property of any kind.
    pub fn take(&mut self, name: &str) -> Option<InstancePropertyValue> {
        self.remaining.remove(name)
    }

    /// Removes a string property.
    pub fn take_string(&mut self, name: &str) -> Option<String> {
        match self.take(name)? {
            InstancePropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Removes an array of strings. Non-string elements are skipped.
    pub fn take_string_array(&mut self, name: &str) -> Option<Vec<String>> {
        match self.take(name)? {
            InstancePropertyValue::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        InstancePropertyValue::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Removes a map whose values are strings. Non-string entries are skipped.
    pub fn take_string_map(&mut self, name: &str) -> Option<BTreeMap<String, String>> {
        match self.take(name)? {
            InstancePropertyValue::Map(map) => Some(
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Removes a map of arbitrary values as JSON.
    pub fn take_map(&mut self, name: &str) -> Option<BTreeMap<String, serde_json::Value>> {
        match self.take(name)? {
            InstancePropertyValue::Map(map) => Some(map.to_json_map()),
            _ => None,
        }
    }

    /// Removes an integer property. Longs that fit are accepted.
    pub fn take_int(&mut self, name: &str) -> Option<i32> {
        match self.take(name)? {
            InstancePropertyValue::Int(i) => Some(i),
            InstancePropertyValue::Long(l) => i32::try_from(l).ok(),
            _ => None,
        }
    }

    /// Removes a long property.
    pub fn take_long(&mut self, name: &str) -> Option<i64> {
        match self.take(name)? {
            InstancePropertyValue::Long(l) => Some(l),
            InstancePropertyValue::Int(i) => Some(i64::from(i)),
            _ => None,
        }
    }

    /// Removes a boolean property.
    pub fn take_bool(&mut self, name: &str) -> Option<bool> {
        match self.take(name)? {
            InstancePropertyValue::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// Removes a boolean property, defaulting to `false`.
    pub fn take_flag(&mut self, name: &str) -> bool {
        self.take_bool(name).unwrap_or(false)
    }

    /// Removes a date property.
    pub fn take_date(&mut self, name: &str) -> Option<DateTime<Utc>> {
        match self.take(name)? {
            InstancePropertyValue::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Removes an enumeration property and returns its ordinal.
    pub fn take_enum_ordinal(&mut self, name: &str) -> Option<i32> {
        match self.take(name)? {
            InstancePropertyValue::Enum { ordinal, .. } | InstancePropertyValue::Int(ordinal) => {
                Some(ordinal)
            },
            _ => None,
        }
    }

    /// Returns `true` if the property has not been taken.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.remaining.contains(name)
    }

    /// Names still in the bag.
    pub fn remaining_names(&self) -> impl Iterator<Item = &str> {
        self.remaining.names()
    }

    /// Consumes the drain and returns what no named field claimed.
    #[must_use]
    pub fn into_extended(self) -> BTreeMap<String, serde_json::Value> {
        self.remaining.to_json_map()
    }
}
