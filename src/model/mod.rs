//! Data model shared by the mappers and the safety checks.

pub mod anchors;
pub mod classifier;
pub mod detection;
pub mod muscle;
pub mod point;
pub mod zone;

pub use anchors::{Detection, FaceAnchors, FaceBox};
pub use classifier::{Classification, ZoneClassifier};
pub use detection::{DetectionSlot, PhotoToken};
pub use muscle::{Muscle, MuscleRegistry, NameMatch, normalize_name};
pub use point::{Depth, InjectionPoint};
pub use zone::{AnatomicalZone, ZoneBoundaries, ZoneBoundary};
