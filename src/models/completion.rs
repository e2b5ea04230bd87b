//! Completion records produced when a governance service finishes.

use super::enums::EngineActionStatus;
use super::instance::Guid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Terminal outcome of a service run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    /// The service did its work.
    #[default]
    Actioned,
    /// The request was not valid for the service.
    Invalid,
    /// The service had nothing to do.
    Ignored,
    /// The service failed.
    Failed,
    /// The run was cancelled.
    Cancelled,
}

impl CompletionStatus {
    /// Returns the status as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Actioned => "ACTIONED",
            Self::Invalid => "INVALID",
            Self::Ignored => "IGNORED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// The engine action status recorded for this outcome.
    #[must_use]
    pub const fn action_status(&self) -> EngineActionStatus {
        match self {
            Self::Actioned => EngineActionStatus::Actioned,
            Self::Invalid => EngineActionStatus::Invalid,
            Self::Ignored => EngineActionStatus::Ignored,
            Self::Failed => EngineActionStatus::Failed,
            Self::Cancelled => EngineActionStatus::Cancelled,
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A follow-on target produced by a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActionTarget {
    /// Name the next service uses for the target.
    pub action_target_name: String,
    /// GUID of the target element.
    pub action_target_guid: Guid,
}

impl NewActionTarget {
    /// Creates an action target.
    #[must_use]
    pub fn new(name: impl Into<String>, guid: Guid) -> Self {
        Self {
            action_target_name: name.into(),
            action_target_guid: guid,
        }
    }
}

/// The outcome of one service run, handed to the recording sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Engine action this run belongs to.
    pub engine_action_guid: Guid,
    /// Outcome.
    pub status: CompletionStatus,
    /// Outcome tags used to pick the next step.
    pub guards: Vec<String>,
    /// Human readable summary.
    pub message: String,
    /// Parameters for follow-on requests.
    pub request_parameters: BTreeMap<String, String>,
    /// Targets for follow-on requests.
    pub action_targets: Vec<NewActionTarget>,
    /// When the run finished.
    pub completion_time: DateTime<Utc>,
}

impl CompletionRecord {
    /// Returns `true` if the record carries the named guard.
    #[must_use]
    pub fn has_guard(&self, guard: &str) -> bool {
        self.guards.iter().any(|g| g == guard)
    }

    /// Returns the first target with the given name.
    #[must_use]
    pub fn target(&self, name: &str) -> Option<&NewActionTarget> {
        self.action_targets
            .iter()
            .find(|t| t.action_target_name == name)
    }
}
