//! Anatomical zones and their template-space rectangles.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{ConfigError, ConfigResult, merge_entries};

/// Grouping of muscles that share a facial region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnatomicalZone {
    Glabella,
    Frontalis,
    Periorbital,
    Nasal,
    Perioral,
    Mentalis,
    Masseter,
    Unknown,
}

impl AnatomicalZone {
    /// All zones that own a region of the face, in top-to-bottom order.
    pub const KNOWN: [Self; 7] = [
        Self::Frontalis,
        Self::Glabella,
        Self::Periorbital,
        Self::Nasal,
        Self::Perioral,
        Self::Mentalis,
        Self::Masseter,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Glabella => "glabella",
            Self::Frontalis => "frontalis",
            Self::Periorbital => "periorbital",
            Self::Nasal => "nasal",
            Self::Perioral => "perioral",
            Self::Mentalis => "mentalis",
            Self::Masseter => "masseter",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AnatomicalZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rectangle in fractional template space (`0..=1` on both axes, y down).
///
/// A `bilateral` boundary describes one side of the face; its mirror image across
/// the vertical midline (`x -> 1 - x`) is part of the zone as well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneBoundary {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    #[serde(default)]
    pub bilateral: bool,
}

impl ZoneBoundary {
    #[must_use]
    pub const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            bilateral: false,
        }
    }

    #[must_use]
    pub const fn bilateral(mut self) -> Self {
        self.bilateral = true;
        self
    }

    /// Inclusive rectangle test, ignoring the mirror.
    #[must_use]
    pub fn contains_band(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Membership test on template percentages (`0..=100`).
    ///
    /// The mirrored coordinate is derived from the percentage (`(100 - x) / 100`)
    /// so that validating `x` and `100 - x` evaluates the same two fractions.
    #[must_use]
    pub fn contains_percent(&self, x: f64, y: f64) -> bool {
        let fx = x / 100.0;
        let fy = y / 100.0;
        if self.contains_band(fx, fy) {
            return true;
        }
        self.bilateral && self.contains_band((100.0 - x) / 100.0, fy)
    }

    fn validate(&self, zone: AnatomicalZone) -> ConfigResult<()> {
        let values = [self.x_min, self.x_max, self.y_min, self.y_max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite(format!("zone boundary `{zone}`")));
        }
        if self.x_min > self.x_max || self.y_min > self.y_max {
            return Err(ConfigError::InvertedBoundary(zone));
        }
        Ok(())
    }
}

/// Per-zone boundary table.
///
/// Deserialized entries replace the matching defaults only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ZoneBoundaries {
    boundaries: BTreeMap<AnatomicalZone, ZoneBoundary>,
}

impl Default for ZoneBoundaries {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(AnatomicalZone::Glabella, ZoneBoundary::new(0.35, 0.65, 0.20, 0.36));
        table.insert(AnatomicalZone::Frontalis, ZoneBoundary::new(0.15, 0.85, 0.02, 0.24));
        table.insert(
            AnatomicalZone::Periorbital,
            ZoneBoundary::new(0.08, 0.36, 0.28, 0.50).bilateral(),
        );
        table.insert(AnatomicalZone::Nasal, ZoneBoundary::new(0.40, 0.60, 0.36, 0.60));
        table.insert(AnatomicalZone::Perioral, ZoneBoundary::new(0.28, 0.72, 0.58, 0.82));
        table.insert(AnatomicalZone::Mentalis, ZoneBoundary::new(0.38, 0.62, 0.80, 0.95));
        table.insert(
            AnatomicalZone::Masseter,
            ZoneBoundary::new(0.02, 0.24, 0.55, 0.88).bilateral(),
        );
        table
    }
}

impl<'de> Deserialize<'de> for ZoneBoundaries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let boundaries = merge_entries(deserializer, Self::default().boundaries)?;
        Ok(Self { boundaries })
    }
}

impl ZoneBoundaries {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            boundaries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, zone: AnatomicalZone, boundary: ZoneBoundary) {
        self.boundaries.insert(zone, boundary);
    }

    #[must_use]
    pub fn get(&self, zone: AnatomicalZone) -> Option<&ZoneBoundary> {
        self.boundaries.get(&zone)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnatomicalZone, &ZoneBoundary)> {
        self.boundaries.iter().map(|(zone, boundary)| (*zone, boundary))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (zone, boundary) in self.iter() {
            boundary.validate(zone)?;
        }
        if let Some(zone) = AnatomicalZone::KNOWN.into_iter().find(|zone| self.get(*zone).is_none()) {
            return Err(ConfigError::MissingEntry(zone.name().to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_known_zone() {
        let table = ZoneBoundaries::default();
        for zone in AnatomicalZone::KNOWN {
            assert!(table.get(zone).is_some(), "missing boundary for {zone}");
        }
        assert!(table.get(AnatomicalZone::Unknown).is_none());
        table.validate().expect("default table is valid");
    }

    #[test]
    fn only_periorbital_and_masseter_are_bilateral() {
        let table = ZoneBoundaries::default();
        let bilateral: Vec<_> = table
            .iter()
            .filter(|(_, b)| b.bilateral)
            .map(|(zone, _)| zone)
            .collect();
        assert_eq!(
            bilateral,
            vec![AnatomicalZone::Periorbital, AnatomicalZone::Masseter]
        );
    }

    #[test]
    fn bilateral_boundary_accepts_mirror() {
        let boundary = ZoneBoundary::new(0.08, 0.36, 0.28, 0.50).bilateral();
        assert!(boundary.contains_percent(20.0, 40.0));
        assert!(boundary.contains_percent(80.0, 40.0));
        assert!(!boundary.contains_percent(50.0, 40.0));

        let one_sided = ZoneBoundary::new(0.08, 0.36, 0.28, 0.50);
        assert!(!one_sided.contains_percent(80.0, 40.0));
    }

    #[test]
    fn edges_are_inclusive() {
        let boundary = ZoneBoundary::new(0.35, 0.65, 0.20, 0.36);
        assert!(boundary.contains_percent(35.0, 20.0));
        assert!(boundary.contains_percent(65.0, 36.0));
        assert!(!boundary.contains_percent(65.5, 36.0));
    }

    #[test]
    fn inverted_boundary_is_rejected() {
        let mut table = ZoneBoundaries::empty();
        table.insert(AnatomicalZone::Nasal, ZoneBoundary::new(0.6, 0.4, 0.36, 0.60));
        assert!(matches!(
            table.validate(),
            Err(ConfigError::InvertedBoundary(AnatomicalZone::Nasal))
        ));
    }

    #[test]
    fn table_without_every_zone_is_rejected() {
        let mut table = ZoneBoundaries::empty();
        table.insert(AnatomicalZone::Nasal, ZoneBoundary::new(0.4, 0.6, 0.36, 0.60));
        assert_eq!(
            table.validate(),
            Err(ConfigError::MissingEntry("frontalis".to_owned()))
        );
    }

    #[test]
    fn single_boundary_override_keeps_the_rest() {
        let json = r#"{"nasal":{"xMin":0.40,"xMax":0.60,"yMin":0.36,"yMax":0.62}}"#;
        let table: ZoneBoundaries = serde_json::from_str(json).unwrap();
        table.validate().expect("merged table is valid");

        assert_eq!(table.get(AnatomicalZone::Nasal).unwrap().y_max, 0.62);
        let defaults = ZoneBoundaries::default();
        for zone in AnatomicalZone::KNOWN {
            if zone != AnatomicalZone::Nasal {
                assert_eq!(table.get(zone), defaults.get(zone), "{zone}");
            }
        }
    }

    #[test]
    fn zone_serializes_lowercase() {
        let json = serde_json::to_string(&AnatomicalZone::Periorbital).unwrap();
        assert_eq!(json, "\"periorbital\"");
    }
}
