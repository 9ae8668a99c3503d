//! Advisory safety checks: zone membership and dosage limits.
//!
//! Nothing here blocks a plan; results only drive warnings in the UI.

pub mod dosage;
pub mod limits;
pub mod zone_validator;

pub use dosage::{DosageSafetyEngine, DosageSummary, SafetyCheck, SafetyLevel};
pub use limits::{
    DoseRange, DosageLimits, GenderRange, MuscleDosageLimit, MuscleStrength, SessionLimit, Sex,
    StrengthModifier,
};
pub use zone_validator::{PointValidation, ZoneValidation, ZoneValidator};
