//! Coordinate mappers: template percentages onto a patient photo and onto the
//! canonical 3D surface.

pub mod calibration;
pub mod chain;
pub mod photo;
pub mod surface;

pub use calibration::{MuscleBand, SurfaceCalibration, ZoneCalibration};
pub use chain::{AnchorChain, Breakpoint};
pub use photo::{PhotoMapper, PhotoPlacement, PlacementMethod};
pub use surface::{ManualPlacement, SurfaceMapper, SurfacePlacement, SurfacePoint};
