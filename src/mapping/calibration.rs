//! Calibration of the canonical 3D face surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{ConfigError, ConfigResult, merge_entries};
use crate::model::{AnatomicalZone, Muscle};

/// Per-zone shape parameters of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCalibration {
    /// Depth offset added to the global base depth.
    pub base_z: f64,
    /// How fast the zone curves away from the midline (`z -= x² · curve_factor`).
    pub curve_factor: f64,
    /// Vertical world offset applied after scaling.
    pub y_offset: f64,
    /// Horizontal scale applied on top of the global x scale.
    pub x_scale: f64,
}

impl ZoneCalibration {
    /// Used for zones without an entry in the table.
    pub const NEUTRAL: Self = Self::new(0.0, 0.3, 0.0, 1.0);

    #[must_use]
    pub const fn new(base_z: f64, curve_factor: f64, y_offset: f64, x_scale: f64) -> Self {
        Self {
            base_z,
            curve_factor,
            y_offset,
            x_scale,
        }
    }
}

/// A world-space rectangle that assigns a muscle to manually placed points.
///
/// Bounds are half-open (`min <= v < max`); a missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuscleBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_max: Option<f64>,
    pub muscle: Muscle,
}

impl MuscleBand {
    #[must_use]
    pub const fn rows(y_min: Option<f64>, y_max: Option<f64>, muscle: Muscle) -> Self {
        Self {
            x_min: None,
            x_max: None,
            y_min,
            y_max,
            muscle,
        }
    }

    #[must_use]
    pub const fn columns(mut self, x_min: Option<f64>, x_max: Option<f64>) -> Self {
        self.x_min = x_min;
        self.x_max = x_max;
        self
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        within(x, self.x_min, self.x_max) && within(y, self.y_min, self.y_max)
    }
}

fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_none_or(|min| value >= min) && max.is_none_or(|max| value < max)
}

/// Global and per-zone calibration of the canonical surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurfaceCalibration {
    /// Depth of the surface at the midline before zone offsets.
    pub base_depth: f64,
    /// World half-width of the template.
    pub x_scale: f64,
    /// World half-height of the template.
    pub y_scale: f64,
    /// Normalized height (`-1..=1`, up positive) above which the forehead recedes.
    pub forehead_recess_start: f64,
    pub forehead_recess_factor: f64,
    pub superficial_indicator: f64,
    pub deep_indicator: f64,
    /// Deserialized entries replace the matching defaults only.
    #[serde(deserialize_with = "merge_zone_calibrations")]
    pub zones: BTreeMap<AnatomicalZone, ZoneCalibration>,
    /// Ordered top to bottom; the first band containing a point wins.
    pub bands: Vec<MuscleBand>,
    /// Muscle for positions outside every band.
    pub fallback_muscle: Muscle,
}

impl Default for SurfaceCalibration {
    fn default() -> Self {
        Self {
            base_depth: 1.0,
            x_scale: 1.5,
            y_scale: 2.0,
            forehead_recess_start: 0.5,
            forehead_recess_factor: 0.6,
            superficial_indicator: 0.08,
            deep_indicator: 0.16,
            zones: default_zone_calibrations(),
            bands: default_bands(),
            fallback_muscle: Muscle::Procerus,
        }
    }
}

fn merge_zone_calibrations<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<AnatomicalZone, ZoneCalibration>, D::Error>
where
    D: Deserializer<'de>,
{
    merge_entries(deserializer, default_zone_calibrations())
}

fn default_zone_calibrations() -> BTreeMap<AnatomicalZone, ZoneCalibration> {
    BTreeMap::from([
        (AnatomicalZone::Glabella, ZoneCalibration::new(0.30, 0.35, 0.0, 1.0)),
        (AnatomicalZone::Frontalis, ZoneCalibration::new(0.20, 0.30, 0.05, 1.0)),
        (AnatomicalZone::Periorbital, ZoneCalibration::new(0.05, 0.25, 0.0, 1.0)),
        (AnatomicalZone::Nasal, ZoneCalibration::new(0.45, 0.50, 0.0, 0.8)),
        (AnatomicalZone::Perioral, ZoneCalibration::new(0.25, 0.40, 0.0, 0.95)),
        (AnatomicalZone::Mentalis, ZoneCalibration::new(0.20, 0.45, -0.05, 0.9)),
        (AnatomicalZone::Masseter, ZoneCalibration::new(-0.25, 0.15, 0.0, 1.05)),
        (AnatomicalZone::Unknown, ZoneCalibration::NEUTRAL),
    ])
}

fn default_bands() -> Vec<MuscleBand> {
    use Muscle::*;

    vec![
        // Forehead
        MuscleBand::rows(Some(1.2), None, Frontalis),
        // Brow line
        MuscleBand::rows(Some(0.6), Some(1.2), OrbicularisOculiLeft).columns(None, Some(-0.6)),
        MuscleBand::rows(Some(0.6), Some(1.2), CorrugatorLeft).columns(Some(-0.6), Some(-0.15)),
        MuscleBand::rows(Some(0.6), Some(1.2), Procerus).columns(Some(-0.15), Some(0.15)),
        MuscleBand::rows(Some(0.6), Some(1.2), CorrugatorRight).columns(Some(0.15), Some(0.6)),
        MuscleBand::rows(Some(0.6), Some(1.2), OrbicularisOculiRight).columns(Some(0.6), None),
        // Eyes
        MuscleBand::rows(Some(0.2), Some(0.6), OrbicularisOculiLeft).columns(None, Some(-0.45)),
        MuscleBand::rows(Some(0.2), Some(0.6), Procerus).columns(Some(-0.45), Some(0.45)),
        MuscleBand::rows(Some(0.2), Some(0.6), OrbicularisOculiRight).columns(Some(0.45), None),
        // Nose
        MuscleBand::rows(Some(-0.3), Some(0.2), OrbicularisOculiLeft).columns(None, Some(-0.4)),
        MuscleBand::rows(Some(-0.3), Some(0.2), Nasalis).columns(Some(-0.4), Some(0.4)),
        MuscleBand::rows(Some(-0.3), Some(0.2), OrbicularisOculiRight).columns(Some(0.4), None),
        // Jaw angle
        MuscleBand::rows(Some(-1.25), Some(-0.3), MasseterLeft).columns(None, Some(-0.9)),
        MuscleBand::rows(Some(-1.25), Some(-0.3), MasseterRight).columns(Some(0.9), None),
        // Mouth
        MuscleBand::rows(Some(-0.85), Some(-0.3), OrbicularisOris),
        MuscleBand::rows(Some(-1.25), Some(-0.85), DepressorAnguliOrisLeft)
            .columns(None, Some(-0.2)),
        MuscleBand::rows(Some(-1.25), Some(-0.85), OrbicularisOris).columns(Some(-0.2), Some(0.2)),
        MuscleBand::rows(Some(-1.25), Some(-0.85), DepressorAnguliOrisRight)
            .columns(Some(0.2), None),
        // Chin
        MuscleBand::rows(None, Some(-1.25), MasseterLeft).columns(None, Some(-0.9)),
        MuscleBand::rows(None, Some(-1.25), Mentalis).columns(Some(-0.9), Some(0.9)),
        MuscleBand::rows(None, Some(-1.25), MasseterRight).columns(Some(0.9), None),
    ]
}

impl SurfaceCalibration {
    #[must_use]
    pub fn zone(&self, zone: AnatomicalZone) -> ZoneCalibration {
        self.zones.get(&zone).copied().unwrap_or(ZoneCalibration::NEUTRAL)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (name, scale) in [("xScale", self.x_scale), ("yScale", self.y_scale)] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ConfigError::NonPositiveScale(name));
            }
        }
        let globals = [
            self.base_depth,
            self.forehead_recess_start,
            self.forehead_recess_factor,
            self.superficial_indicator,
            self.deep_indicator,
        ];
        if globals.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite("surface calibration".to_owned()));
        }
        for (zone, calibration) in &self.zones {
            let values = [
                calibration.base_z,
                calibration.curve_factor,
                calibration.y_offset,
                calibration.x_scale,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ConfigError::NonFinite(format!("calibration of zone `{zone}`")));
            }
            if calibration.x_scale <= 0.0 {
                return Err(ConfigError::NonPositiveScale("zone xScale"));
            }
        }
        for (index, band) in self.bands.iter().enumerate() {
            let bounds = [band.x_min, band.x_max, band.y_min, band.y_max];
            if bounds.iter().flatten().any(|v| !v.is_finite()) {
                return Err(ConfigError::NonFinite(format!("muscle band {index}")));
            }
            let inverted = |min: Option<f64>, max: Option<f64>| {
                matches!((min, max), (Some(min), Some(max)) if min >= max)
            };
            if inverted(band.x_min, band.x_max) || inverted(band.y_min, band.y_max) {
                return Err(ConfigError::InvertedBand(index));
            }
        }
        Ok(())
    }
}
