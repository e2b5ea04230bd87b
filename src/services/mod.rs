//! Business logic services.
//!
//! - [`converters`]: generic instances to typed beans
//! - [`configuration`]: engine and service definitions and registrations
//! - [`engine`]: running registered services and recording their outcome

pub mod configuration;
pub mod converters;
pub mod engine;

pub use configuration::{GovernanceConfigurationHandler, Registration, RegistrationOutcome};
pub use engine::{GovernanceEngineHandler, GovernanceService, ServiceRunner};
