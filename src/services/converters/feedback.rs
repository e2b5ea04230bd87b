//! Rating converter.

use super::{BeanConverter, ConversionSource, ConverterBase};
use crate::Result;
use crate::models::property_names::{IS_PUBLIC, REVIEW, STAR_RATING};
use crate::models::{
    Bean, BeanShape, FeedbackTargetElement, OrdinalEnum, PropertyDrain, RatingProperties,
    StarRating,
};

/// Builds [`RatingElement`](crate::models::RatingElement) beans.
///
/// `AttachedRating` relationships supplied with the rating become feedback
/// targets; the related element is the end that is not the rating.
#[derive(Debug, Clone)]
pub struct RatingConverter {
    base: ConverterBase,
}

impl RatingConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for RatingConverter {
    fn converter_name(&self) -> &'static str {
        "RatingConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::Rating
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::Rating(rating) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let entity = ConverterBase::require_entity(source.entity, "Rating", method)?;

        let mut drain = PropertyDrain::from_ref(&entity.properties);
        let star_rating = drain
            .take_enum_ordinal(STAR_RATING)
            .map_or_else(StarRating::default, StarRating::from_ordinal);
        let review = drain.take_string(REVIEW);

        rating.element_header = self.base.entity_header(entity);
        rating.properties = Some(RatingProperties {
            star_rating,
            review,
            extended_properties: drain.into_extended(),
        });
        rating.feedback_targets =
            ConverterBase::select_relationships(source.relationships, "AttachedRating")
                .filter_map(|relationship| {
                    let target = relationship.other_end(&entity.guid)?;
                    let mut relationship_drain = PropertyDrain::from_ref(&relationship.properties);
                    Some(FeedbackTargetElement {
                        relationship_header: self.base.relationship_header(relationship),
                        related_element: ConverterBase::element_stub(target),
                        is_public: relationship_drain.take_flag(IS_PUBLIC),
                    })
                })
                .collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::property_names::QUALIFIED_NAME;
    use crate::models::{EntityDetail, InstanceProperties, RatingElement, Relationship};
    use crate::services::converters::convert;
    use test_case::test_case;

    fn rating(bean: Bean) -> RatingElement {
        match bean {
            Bean::Rating(rating) => rating,
            other => panic!("unexpected bean {other:?}"),
        }
    }

    fn convert_rating(entity: &EntityDetail, relationships: &[Relationship]) -> RatingElement {
        let converter = RatingConverter::new("server1", "feedback");
        let source = ConversionSource::entity(entity).with_relationships(relationships);
        rating(convert(&converter, BeanShape::Rating, &source, "getRatings").unwrap())
    }

    #[test_case(0, StarRating::NoRecommendation ; "no recommendation")]
    #[test_case(1, StarRating::OneStar ; "one star")]
    #[test_case(5, StarRating::FiveStars ; "five stars")]
    #[test_case(99, StarRating::FiveStars ; "legacy five stars")]
    #[test_case(42, StarRating::NoRecommendation ; "unknown ordinal")]
    fn test_star_rating_decoding(ordinal: i32, expected: StarRating) {
        let entity = EntityDetail::new(
            "Rating",
            InstanceProperties::new().with_enum(STAR_RATING, ordinal, "ANY"),
        );
        let props = convert_rating(&entity, &[]).properties.unwrap();
        assert_eq!(props.star_rating, expected);
    }

    #[test]
    fn test_feedback_targets_from_attached_rating() {
        let asset = EntityDetail::new(
            "Asset",
            InstanceProperties::new().with_string(QUALIFIED_NAME, "asset::orders"),
        );
        let entity = EntityDetail::new(
            "Rating",
            InstanceProperties::new()
                .with_enum(STAR_RATING, 4, "FOUR_STARS")
                .with_string(REVIEW, "useful")
                .with_string("reviewer", "sam"),
        );
        let attached = Relationship::new(
            "AttachedRating",
            asset.proxy(),
            entity.proxy(),
            InstanceProperties::new().with_bool(IS_PUBLIC, true),
        );
        let unrelated = Relationship::new(
            "ControlFlow",
            asset.proxy(),
            entity.proxy(),
            InstanceProperties::new(),
        );

        let rating = convert_rating(&entity, &[attached.clone(), unrelated]);
        let props = rating.properties.unwrap();
        assert_eq!(props.star_rating, StarRating::FourStars);
        assert_eq!(props.review.as_deref(), Some("useful"));
        assert!(props.extended_properties.contains_key("reviewer"));

        assert_eq!(rating.feedback_targets.len(), 1);
        let target = &rating.feedback_targets[0];
        assert_eq!(target.relationship_header.guid, attached.guid);
        assert_eq!(target.related_element.guid, asset.guid);
        assert_eq!(target.related_element.unique_name.as_deref(), Some("asset::orders"));
        assert!(target.is_public);
    }
}
