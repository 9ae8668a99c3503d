//! Template → canonical 3D surface mapping and its inverse for manual placement.
//!
//! The surface is a generic face, so no patient anchors are involved. Template
//! percentages are normalized to `-1..=1` (y up), scaled to world units, and given a
//! depth that bends back with distance from the midline. Each zone bends by its own
//! calibration; the frontalis additionally recedes towards the scalp.

use serde::Serialize;

use super::calibration::SurfaceCalibration;
use crate::geom::{Point3, Vec3};
use crate::model::{AnatomicalZone, Depth, InjectionPoint, Muscle, ZoneClassifier};

/// A template point resolved onto the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Point3,
    /// Outward unit normal of the surface at `position`.
    pub normal: Vec3,
    pub zone: AnatomicalZone,
}

/// Render data for one injection point in the 3D view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfacePlacement {
    pub id: String,
    pub position: [f64; 3],
    pub normal: [f64; 3],
    /// End of the depth indicator, pushed into the surface along the normal.
    pub indicator_end: [f64; 3],
    pub depth: Depth,
    pub zone: AnatomicalZone,
}

/// Template coordinates and muscle recovered from a position on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualPlacement {
    pub x: f64,
    pub y: f64,
    pub muscle: Muscle,
    pub zone: AnatomicalZone,
}

#[derive(Debug, Clone)]
pub struct SurfaceMapper {
    calibration: SurfaceCalibration,
    classifier: ZoneClassifier,
}

impl SurfaceMapper {
    #[must_use]
    pub fn new(calibration: SurfaceCalibration, classifier: ZoneClassifier) -> Self {
        Self {
            calibration,
            classifier,
        }
    }

    #[must_use]
    pub fn calibration(&self) -> &SurfaceCalibration {
        &self.calibration
    }

    /// Map a template point (percent) for `muscle` onto the surface.
    #[must_use]
    pub fn map(&self, x: f64, y: f64, muscle: &str) -> SurfacePoint {
        let zone = self.classifier.zone_of(muscle);
        self.map_in_zone(x, y, zone)
    }

    #[must_use]
    pub fn map_in_zone(&self, x: f64, y: f64, zone: AnatomicalZone) -> SurfacePoint {
        let cal = &self.calibration;
        let zone_cal = cal.zone(zone);

        let nx = x / 50.0 - 1.0;
        let ny = 1.0 - y / 50.0;

        let wx = nx * cal.x_scale * zone_cal.x_scale;
        let wy = ny * cal.y_scale + zone_cal.y_offset;

        let recess = self.recess_height(zone, ny);
        let vertical_correction = cal.forehead_recess_factor * recess * recess;
        let wz = cal.base_depth + zone_cal.base_z
            - wx * wx * zone_cal.curve_factor
            - vertical_correction;

        // Gradient of z over world x/y gives the outward normal (-dz/dx, -dz/dy, 1).
        let dz_dx = -2.0 * zone_cal.curve_factor * wx;
        let dz_dy = -2.0 * cal.forehead_recess_factor * recess / cal.y_scale;
        let normal = Vec3::new(-dz_dx, -dz_dy, 1.0)
            .normalized()
            .unwrap_or(Vec3::Z);

        SurfacePoint {
            position: Point3::new(wx, wy, wz),
            normal,
            zone,
        }
    }

    fn recess_height(&self, zone: AnatomicalZone, ny: f64) -> f64 {
        if zone == AnatomicalZone::Frontalis {
            (ny - self.calibration.forehead_recess_start).max(0.0)
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn place(&self, point: &InjectionPoint) -> SurfacePlacement {
        let surface = self.map(point.x, point.y, &point.muscle);
        let length = match point.depth {
            Depth::Superficial => self.calibration.superficial_indicator,
            Depth::Deep => self.calibration.deep_indicator,
        };
        let indicator_end = surface.position + (-surface.normal) * length;
        SurfacePlacement {
            id: point.id.clone(),
            position: surface.position.to_array(),
            normal: surface.normal.to_array(),
            indicator_end: indicator_end.to_array(),
            depth: point.depth,
            zone: surface.zone,
        }
    }

    /// Recover template coordinates and a muscle for a clicked surface position.
    ///
    /// Only the global scale is inverted; the muscle comes from the first band that
    /// contains the world (x, y).
    #[must_use]
    pub fn inverse(&self, position: Point3) -> ManualPlacement {
        let cal = &self.calibration;
        let nx = position.x / cal.x_scale;
        let ny = position.y / cal.y_scale;
        let x = clamp_percent((nx + 1.0) * 50.0);
        let y = clamp_percent((1.0 - ny) * 50.0);

        let muscle = self.muscle_at(position.x, position.y);
        ManualPlacement {
            x,
            y,
            muscle,
            zone: muscle.zone(),
        }
    }

    #[must_use]
    pub fn muscle_at(&self, x: f64, y: f64) -> Muscle {
        self.calibration
            .bands
            .iter()
            .find(|band| band.contains(x, y))
            .map_or(self.calibration.fallback_muscle, |band| band.muscle)
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        50.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
