//! Engine audit messages.

use crate::models::Guid;
use std::fmt;

/// Severity of an audit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSeverity {
    /// Normal progress.
    Info,
    /// Something went wrong but the engine carried on.
    Warning,
    /// A service failed.
    Error,
}

/// A closed set of engine audit messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditCode {
    /// A service is about to start.
    ServiceStarting {
        /// Service name.
        service: String,
        /// Request type.
        request_type: String,
        /// Engine action.
        engine_action: Guid,
    },
    /// A service finished.
    ServiceCompleted {
        /// Service name.
        service: String,
        /// Engine action.
        engine_action: Guid,
        /// Final status.
        status: String,
    },
    /// A service returned an error or panicked.
    ServiceFailed {
        /// Service name.
        service: String,
        /// Engine action.
        engine_action: Guid,
        /// Error kind.
        kind: String,
        /// Error message.
        message: String,
    },
    /// A service stopped because cancellation was requested.
    ServiceCancelled {
        /// Service name.
        service: String,
        /// Engine action.
        engine_action: Guid,
    },
    /// The completion record could not be recorded.
    RecordingFailed {
        /// Engine action.
        engine_action: Guid,
        /// Cause.
        cause: String,
    },
    /// The service could not be disconnected.
    DisconnectFailed {
        /// Service name.
        service: String,
        /// Cause.
        cause: String,
    },
    /// The engine reloaded its registered services.
    EngineRefreshed {
        /// Engine name.
        engine: String,
        /// Number of request types served.
        request_types: usize,
    },
}

impl AuditCode {
    /// Stable message identifier.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::ServiceStarting { .. } => "METAGOV-ENGINE-0001",
            Self::ServiceCompleted { .. } => "METAGOV-ENGINE-0002",
            Self::ServiceFailed { .. } => "METAGOV-ENGINE-0003",
            Self::ServiceCancelled { .. } => "METAGOV-ENGINE-0004",
            Self::RecordingFailed { .. } => "METAGOV-ENGINE-0005",
            Self::DisconnectFailed { .. } => "METAGOV-ENGINE-0006",
            Self::EngineRefreshed { .. } => "METAGOV-ENGINE-0007",
        }
    }

    /// Severity of the message.
    #[must_use]
    pub const fn severity(&self) -> AuditSeverity {
        match self {
            Self::ServiceStarting { .. }
            | Self::ServiceCompleted { .. }
            | Self::ServiceCancelled { .. }
            | Self::EngineRefreshed { .. } => AuditSeverity::Info,
            Self::RecordingFailed { .. } | Self::DisconnectFailed { .. } => AuditSeverity::Warning,
            Self::ServiceFailed { .. } => AuditSeverity::Error,
        }
    }

    /// Emits the message through `tracing`.
    pub fn emit(&self) {
        let id = self.id();
        match self.severity() {
            AuditSeverity::Info => tracing::info!(audit_id = id, "{self}"),
            AuditSeverity::Warning => tracing::warn!(audit_id = id, "{self}"),
            AuditSeverity::Error => tracing::error!(audit_id = id, "{self}"),
        }
    }
}

impl fmt::Display for AuditCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceStarting {
                service,
                request_type,
                engine_action,
            } => write!(
                f,
                "Service {service} is starting request type {request_type} for engine action {engine_action}"
            ),
            Self::ServiceCompleted {
                service,
                engine_action,
                status,
            } => write!(
                f,
                "Service {service} finished engine action {engine_action} with status {status}"
            ),
            Self::ServiceFailed {
                service,
                engine_action,
                kind,
                message,
            } => write!(
                f,
                "Service {service} failed engine action {engine_action} with {kind}: {message}"
            ),
            Self::ServiceCancelled {
                service,
                engine_action,
            } => write!(f, "Service {service} cancelled engine action {engine_action}"),
            Self::RecordingFailed {
                engine_action,
                cause,
            } => write!(
                f,
                "Unable to record completion of engine action {engine_action}: {cause}"
            ),
            Self::DisconnectFailed { service, cause } => {
                write!(f, "Unable to disconnect service {service}: {cause}")
            },
            Self::EngineRefreshed {
                engine,
                request_types,
            } => write!(
                f,
                "Engine {engine} refreshed its configuration and serves {request_types} request types"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_message_names_kind() {
        let code = AuditCode::ServiceFailed {
            service: "census".to_string(),
            engine_action: Guid::new("a1"),
            kind: "AssetNotFound".to_string(),
            message: "asset g1 not found".to_string(),
        };
        assert_eq!(code.id(), "METAGOV-ENGINE-0003");
        assert_eq!(code.severity(), AuditSeverity::Error);
        assert_eq!(
            code.to_string(),
            "Service census failed engine action a1 with AssetNotFound: asset g1 not found"
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let guid = Guid::new("a1");
        let codes = [
            AuditCode::ServiceStarting {
                service: String::new(),
                request_type: String::new(),
                engine_action: guid.clone(),
            },
            AuditCode::ServiceCompleted {
                service: String::new(),
                engine_action: guid.clone(),
                status: String::new(),
            },
            AuditCode::ServiceFailed {
                service: String::new(),
                engine_action: guid.clone(),
                kind: String::new(),
                message: String::new(),
            },
            AuditCode::ServiceCancelled {
                service: String::new(),
                engine_action: guid.clone(),
            },
            AuditCode::RecordingFailed {
                engine_action: guid,
                cause: String::new(),
            },
            AuditCode::DisconnectFailed {
                service: String::new(),
                cause: String::new(),
            },
            AuditCode::EngineRefreshed {
                engine: String::new(),
                request_types: 0,
            },
        ];
        let ids: std::collections::HashSet<_> = codes.iter().map(AuditCode::id).collect();
        assert_eq!(ids.len(), codes.len());
    }
}
