//! Enumerations stored in the repository by ordinal.
//!
//! Decoding never fails. An ordinal with no matching case maps to the
//! enumeration's fallback (`Other` where the type defines one), so a value
//! added to a type definition later degrades instead of breaking conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An enumeration stored by ordinal.
pub trait OrdinalEnum: Sized + Copy {
    /// Value used when an ordinal is not recognised.
    const FALLBACK: Self;

    /// Decodes a recognised ordinal.
    fn try_from_ordinal(ordinal: i32) -> Option<Self>;

    /// Ordinal written to the repository.
    fn ordinal(&self) -> i32;

    /// Symbolic name written alongside the ordinal.
    fn symbolic_name(&self) -> &'static str;

    /// Decodes any ordinal, falling back for unrecognised values.
    #[must_use]
    fn from_ordinal(ordinal: i32) -> Self {
        Self::try_from_ordinal(ordinal).unwrap_or(Self::FALLBACK)
    }
}

/// Quality rating attached to feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StarRating {
    /// No rating given.
    #[default]
    NoRecommendation,
    /// One star.
    OneStar,
    /// Two stars.
    TwoStars,
    /// Three stars.
    ThreeStars,
    /// Four stars.
    FourStars,
    /// Five stars.
    FiveStars,
}

impl OrdinalEnum for StarRating {
    const FALLBACK: Self = Self::NoRecommendation;

    fn try_from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(Self::NoRecommendation),
            1 => Some(Self::OneStar),
            2 => Some(Self::TwoStars),
            3 => Some(Self::ThreeStars),
            4 => Some(Self::FourStars),
            // 99 was written for five stars by older converters.
            5 | 99 => Some(Self::FiveStars),
            _ => None,
        }
    }

    fn ordinal(&self) -> i32 {
        match self {
            Self::NoRecommendation => 0,
            Self::OneStar => 1,
            Self::TwoStars => 2,
            Self::ThreeStars => 3,
            Self::FourStars => 4,
            Self::FiveStars => 5,
        }
    }

    fn symbolic_name(&self) -> &'static str {
        match self {
            Self::NoRecommendation => "NO_RECOMMENDATION",
            Self::OneStar => "ONE_STAR",
            Self::TwoStars => "TWO_STARS",
            Self::ThreeStars => "THREE_STARS",
            Self::FourStars => "FOUR_STARS",
            Self::FiveStars => "FIVE_STARS",
        }
    }
}

/// Sort order of a schema attribute's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataItemSortOrder {
    /// Ascending.
    Ascending,
    /// Descending.
    Descending,
    /// Not sorted, or not known.
    #[default]
    Unsorted,
}

impl OrdinalEnum for DataItemSortOrder {
    const FALLBACK: Self = Self::Unsorted;

    fn try_from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Ascending),
            1 => Some(Self::Descending),
            99 => Some(Self::Unsorted),
            _ => None,
        }
    }

    fn ordinal(&self) -> i32 {
        match self {
            Self::Ascending => 0,
            Self::Descending => 1,
            Self::Unsorted => 99,
        }
    }

    fn symbolic_name(&self) -> &'static str {
        match self {
            Self::Ascending => "ASCENDING",
            Self::Descending => "DESCENDING",
            Self::Unsorted => "UNSORTED",
        }
    }
}

/// How an external identifier is managed by its owning system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyPattern {
    /// Unique key allocated and used within the scope of one system.
    #[default]
    LocalKey,
    /// Key allocated and reused once the element is deleted.
    RecycledKey,
    /// Key derived from an attribute of the element.
    NaturalKey,
    /// Key copied from another system.
    MirrorKey,
    /// Key formed from several other keys.
    AggregateKey,
    /// Key supplied by the caller.
    CallersKey,
    /// Key that never changes.
    StableKey,
    /// Another pattern.
    Other,
}

impl OrdinalEnum for KeyPattern {
    const FALLBACK: Self = Self::Other;

    fn try_from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(Self::LocalKey),
            1 => Some(Self::RecycledKey),
            2 => Some(Self::NaturalKey),
            3 => Some(Self::MirrorKey),
            4 => Some(Self::AggregateKey),
            5 => Some(Self::CallersKey),
            6 => Some(Self::StableKey),
            99 => Some(Self::Other),
            _ => None,
        }
    }

    fn ordinal(&self) -> i32 {
        match self {
            Self::LocalKey => 0,
            Self::RecycledKey => 1,
            Self::NaturalKey => 2,
            Self::MirrorKey => 3,
            Self::AggregateKey => 4,
            Self::CallersKey => 5,
            Self::StableKey => 6,
            Self::Other => 99,
        }
    }

    fn symbolic_name(&self) -> &'static str {
        match self {
            Self::LocalKey => "LOCAL_KEY",
            Self::RecycledKey => "RECYCLED_KEY",
            Self::NaturalKey => "NATURAL_KEY",
            Self::MirrorKey => "MIRROR_KEY",
            Self::AggregateKey => "AGGREGATE_KEY",
            Self::CallersKey => "CALLERS_KEY",
            Self::StableKey => "STABLE_KEY",
            Self::Other => "OTHER",
        }
    }
}

/// Direction metadata may flow between a third party and the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SynchronizationDirection {
    /// Changes flow both ways.
    #[default]
    BothDirections,
    /// Catalog is the master; changes go to the third party.
    ToThirdParty,
    /// Third party is the master.
    FromThirdParty,
    /// Another arrangement.
    Other,
}

impl OrdinalEnum for SynchronizationDirection {
    const FALLBACK: Self = Self::Other;

    fn try_from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(Self::BothDirections),
            1 => Some(Self::ToThirdParty),
            2 => Some(Self::FromThirdParty),
            99 => Some(Self::Other),
            _ => None,
        }
    }

    fn ordinal(&self) -> i32 {
        match self {
            Self::BothDirections => 0,
            Self::ToThirdParty => 1,
            Self::FromThirdParty => 2,
            Self::Other => 99,
        }
    }

    fn symbolic_name(&self) -> &'static str {
        match self {
            Self::BothDirections => "BOTH_DIRECTIONS",
            Self::ToThirdParty => "TO_THIRD_PARTY",
            Self::FromThirdParty => "FROM_THIRD_PARTY",
            Self::Other => "OTHER",
        }
    }
}

/// Direction of data through a process port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortType {
    /// No data flows.
    #[default]
    None,
    /// Data flows in.
    InputPort,
    /// Data flows out.
    OutputPort,
    /// Request in, response out.
    InOutPort,
    /// Request out, response in.
    OutInPort,
    /// Another arrangement.
    Other,
}

impl OrdinalEnum for PortType {
    const FALLBACK: Self = Self::Other;

    fn try_from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(Self::None),
            1 => Some(Self::InputPort),
            2 => Some(Self::OutputPort),
            3 => Some(Self::InOutPort),
            4 => Some(Self::OutInPort),
            99 => Some(Self::Other),
            _ => None,
        }
    }

    fn ordinal(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::InputPort => 1,
            Self::OutputPort => 2,
            Self::InOutPort => 3,
            Self::OutInPort => 4,
            Self::Other => 99,
        }
    }

    fn symbolic_name(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::InputPort => "INPUT_PORT",
            Self::OutputPort => "OUTPUT_PORT",
            Self::InOutPort => "INOUT_PORT",
            Self::OutInPort => "OUTIN_PORT",
            Self::Other => "OTHER",
        }
    }
}

/// Relationship between a parent process and a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessContainmentType {
    /// Child is owned by the parent.
    #[default]
    Owned,
    /// Child is shared.
    Used,
    /// Another arrangement.
    Other,
}

impl OrdinalEnum for ProcessContainmentType {
    const FALLBACK: Self = Self::Other;

    fn try_from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Owned),
            1 => Some(Self::Used),
            99 => Some(Self::Other),
            _ => None,
        }
    }

    fn ordinal(&self) -> i32 {
        match self {
            Self::Owned => 0,
            Self::Used => 1,
            Self::Other => 99,
        }
    }

    fn symbolic_name(&self) -> &'static str {
        match self {
            Self::Owned => "OWNED",
            Self::Used => "USED",
            Self::Other => "OTHER",
        }
    }
}

/// Progress of an engine action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineActionStatus {
    /// Created, waiting for approval.
    #[default]
    Requested,
    /// Approved to run.
    Approved,
    /// Waiting for its start time.
    Waiting,
    /// Being handed to a service.
    Activating,
    /// Service running.
    InProgress,
    /// Completed successfully.
    Actioned,
    /// Could not run because the request was invalid.
    Invalid,
    /// Nothing to do.
    Ignored,
    /// Service failed.
    Failed,
    /// Cancelled before completion.
    Cancelled,
    /// Another status.
    Other,
}

impl EngineActionStatus {
    /// Returns `true` for statuses after which the action never changes.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Actioned | Self::Invalid | Self::Ignored | Self::Failed | Self::Cancelled
        )
    }
}

impl OrdinalEnum for EngineActionStatus {
    const FALLBACK: Self = Self::Other;

    fn try_from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Requested),
            1 => Some(Self::Approved),
            2 => Some(Self::Waiting),
            3 => Some(Self::Activating),
            4 => Some(Self::InProgress),
            10 => Some(Self::Actioned),
            11 => Some(Self::Invalid),
            12 => Some(Self::Ignored),
            13 => Some(Self::Failed),
            14 => Some(Self::Cancelled),
            99 => Some(Self::Other),
            _ => None,
        }
    }

    fn ordinal(&self) -> i32 {
        match self {
            Self::Requested => 0,
            Self::Approved => 1,
            Self::Waiting => 2,
            Self::Activating => 3,
            Self::InProgress => 4,
            Self::Actioned => 10,
            Self::Invalid => 11,
            Self::Ignored => 12,
            Self::Failed => 13,
            Self::Cancelled => 14,
            Self::Other => 99,
        }
    }

    fn symbolic_name(&self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Approved => "APPROVED",
            Self::Waiting => "WAITING",
            Self::Activating => "ACTIVATING",
            Self::InProgress => "IN_PROGRESS",
            Self::Actioned => "ACTIONED",
            Self::Invalid => "INVALID",
            Self::Ignored => "IGNORED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for EngineActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbolic_name())
    }
}
