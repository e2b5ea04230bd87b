//! Rating beans and the elements they are attached to.

use super::element::{ElementHeader, ElementStub};
use super::enums::StarRating;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Properties of a rating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingProperties {
    /// Stars awarded.
    pub star_rating: StarRating,
    /// Review text.
    pub review: Option<String>,
    /// Properties from subtypes not claimed by a named field.
    pub extended_properties: BTreeMap<String, serde_json::Value>,
}

/// The element a piece of feedback is attached to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackTargetElement {
    /// Header of the attaching relationship.
    pub relationship_header: ElementHeader,
    /// The element the feedback is about.
    pub related_element: ElementStub,
    /// Whether the feedback is visible to other users.
    pub is_public: bool,
}

/// A rating and its feedback targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingElement {
    /// Header of the rating entity.
    pub element_header: ElementHeader,
    /// Rating properties; `None` until populated.
    pub properties: Option<RatingProperties>,
    /// Elements this rating is attached to.
    pub feedback_targets: Vec<FeedbackTargetElement>,
}
