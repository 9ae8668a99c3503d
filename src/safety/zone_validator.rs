//! Advisory check that a point sits inside the rectangle of its muscle's zone.

use serde::Serialize;

use crate::model::{AnatomicalZone, InjectionPoint, ZoneBoundaries, ZoneClassifier};

/// Result for a single point. `valid == false` only drives a visual warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneValidation {
    pub valid: bool,
    pub zone: AnatomicalZone,
}

/// [`ZoneValidation`] tagged with the point id, for batch results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointValidation {
    pub id: String,
    pub valid: bool,
    pub zone: AnatomicalZone,
}

#[derive(Debug, Clone)]
pub struct ZoneValidator {
    zones: ZoneBoundaries,
    classifier: ZoneClassifier,
}

impl Default for ZoneValidator {
    fn default() -> Self {
        Self::new(ZoneBoundaries::default(), ZoneClassifier::default())
    }
}

impl ZoneValidator {
    #[must_use]
    pub fn new(zones: ZoneBoundaries, classifier: ZoneClassifier) -> Self {
        Self { zones, classifier }
    }

    #[must_use]
    pub fn validate(&self, point: &InjectionPoint) -> ZoneValidation {
        let zone = self.classifier.zone_of(&point.muscle);
        let valid = match self.zones.get(zone) {
            Some(boundary) => boundary.contains_percent(point.x, point.y),
            // Nothing to check against.
            None => true,
        };
        ZoneValidation { valid, zone }
    }

    #[must_use]
    pub fn validate_all(&self, points: &[InjectionPoint]) -> Vec<PointValidation> {
        points
            .iter()
            .map(|point| {
                let ZoneValidation { valid, zone } = self.validate(point);
                PointValidation {
                    id: point.id.clone(),
                    valid,
                    zone,
                }
            })
            .collect()
    }
}
