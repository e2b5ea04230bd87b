//! # Metagov
//!
//! Open metadata bean conversion, governance engine configuration and
//! survey task execution over a generic metadata repository.
//!
//! ## Features
//!
//! - Typed beans populated from generic entities and relationships
//! - Ordinal-decoded enumerations that degrade to a defined default
//! - Engine/service registration keeping one service per request type
//! - Bounded survey/governance service runner with completion records
//!
//! ## Example
//!
//! ```rust,ignore
//! use metagov::BeanShape;
//! use metagov::services::converters::{ConversionSource, GlossaryTermConverter, convert};
//!
//! let converter = GlossaryTermConverter::new("server1", "glossary-view");
//! let source = ConversionSource::entity(&entity);
//! let bean = convert(&converter, BeanShape::GlossaryTerm, &source, "getTermByGUID")?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod bulkhead;
pub mod config;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::{EngineHostConfig, ServicePoolConfig};
pub use models::{
    Bean, BeanShape, CompletionRecord, CompletionStatus, EntityDetail, Guid, InstanceProperties,
    InstancePropertyValue, Relationship, TypeDefCategory,
};
pub use services::{
    GovernanceConfigurationHandler, GovernanceEngineHandler, GovernanceService, ServiceRunner,
};
pub use storage::{InMemoryRepository, MetadataRepository};

/// Error type for metadata conversion, configuration and engine operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidParameter` | Missing or malformed GUID, name or request type |
/// | `Unauthorized` | The authorization verifier denies the operation |
/// | `MissingInstance` | A converter needs an entity or relationship that is absent |
/// | `InvalidBeanClass` | The constructed bean does not match the converter's shape |
/// | `ServerError` | The repository or another downstream component fails |
/// | `InvalidConnector` | A resolved service does not implement the engine's contract |
/// | `ServiceExecution` | A service cannot be launched (pool exhausted, thread spawn) |
#[derive(Debug, ThisError)]
pub enum Error {
    /// A required parameter was missing or malformed.
    #[error("invalid parameter '{parameter}' passed to {method}")]
    InvalidParameter {
        /// Name of the parameter.
        parameter: String,
        /// The calling method.
        method: String,
    },

    /// The user is not permitted to perform the operation.
    #[error("user '{user_id}' is not authorized to issue {operation}")]
    Unauthorized {
        /// The caller.
        user_id: String,
        /// The operation that was denied.
        operation: String,
    },

    /// An entity or relationship needed to build a bean was not supplied.
    ///
    /// `category` is the type definition category (entity or relationship).
    #[error("missing {category} instance of type {expected_type} in {method}")]
    MissingInstance {
        /// Entity or relationship.
        category: models::TypeDefCategory,
        /// The type the converter expected.
        expected_type: String,
        /// The calling method.
        method: String,
    },

    /// The bean built for a shape could not be used by the converter.
    ///
    /// This is a programming error in the converter wiring, not a data error.
    #[error("invalid bean class {shape} for converter {converter} in {method}")]
    InvalidBeanClass {
        /// Shape that was constructed.
        shape: String,
        /// The converter that rejected it.
        converter: String,
        /// The calling method.
        method: String,
    },

    /// A downstream server or repository operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    ServerError {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A resolved service does not implement the contract the engine runs.
    #[error("service {service} is a {actual} service, engine expects {expected}")]
    InvalidConnector {
        /// The service name.
        service: String,
        /// The contract the engine needs.
        expected: String,
        /// The contract the service implements.
        actual: String,
    },

    /// A service could not be launched.
    #[error("service {service} could not run: {cause}")]
    ServiceExecution {
        /// The service name.
        service: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds an [`Error::InvalidParameter`].
    pub fn invalid_parameter(parameter: impl Into<String>, method: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            method: method.into(),
        }
    }

    /// Builds an [`Error::ServerError`].
    pub fn server(operation: impl Into<String>, cause: impl ToString) -> Self {
        Self::ServerError {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for metagov operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fails with [`Error::InvalidParameter`] when `value` is blank.
///
/// # Errors
///
/// Returns an error if the value is empty or only whitespace.
pub fn validate_name(value: &str, parameter: &str, method: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_parameter(parameter, method));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_parameter("engineGUID", "registerServiceWithEngine");
        assert_eq!(
            err.to_string(),
            "invalid parameter 'engineGUID' passed to registerServiceWithEngine"
        );

        let err = Error::server("create_relationship", "disk full");
        assert_eq!(err.to_string(), "operation 'create_relationship' failed: disk full");

        let err = Error::MissingInstance {
            category: models::TypeDefCategory::Relationship,
            expected_type: "ControlFlow".to_string(),
            method: "getControlFlow".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "missing relationship instance of type ControlFlow in getControlFlow"
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("scan", "requestType", "m").is_ok());
        assert!(matches!(
            validate_name("  ", "requestType", "m"),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
