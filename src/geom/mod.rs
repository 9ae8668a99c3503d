//! Small value types for photo-space and surface-space geometry.

mod core;

pub use self::core::{Point2, Point3, Rect, Tolerance, Vec3, lerp};
