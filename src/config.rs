//! Planner configuration: the limit, boundary and calibration tables every engine
//! is built from.
//!
//! `Default` yields the compiled-in tables. Every field is `#[serde(default)]` so a
//! host can override a single table from JSON. Keyed tables are read entry by
//! entry over their defaults, so overriding one muscle or one zone keeps the rest.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::mapping::SurfaceCalibration;
use crate::model::{AnatomicalZone, ZoneBoundaries, ZoneClassifier};
use crate::safety::DosageLimits;

/// Describes an inconsistent configuration table.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A value that must be a finite number is NaN or infinite.
    #[error("non-finite value in {0}")]
    NonFinite(String),
    /// A zone rectangle has `min > max` on some axis.
    #[error("inverted boundary for zone `{0}`")]
    InvertedBoundary(AnatomicalZone),
    /// A world-space band has `min >= max` on some axis.
    #[error("inverted muscle band at index {0}")]
    InvertedBand(usize),
    /// A scale constant is zero or negative.
    #[error("scale `{0}` must be positive")]
    NonPositiveScale(&'static str),
    /// A warning threshold sits above its maximum.
    #[error("warning threshold above maximum for `{0}`")]
    WarningAboveMax(String),
    /// A table lacks the entry for a muscle or zone.
    #[error("no entry for `{0}`")]
    MissingEntry(String),
    /// The input could not be deserialized.
    #[error("invalid configuration: {0}")]
    Decode(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// What to do with muscle names that are not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnknownMusclePolicy {
    /// Treat the point as glabella.
    #[default]
    Glabella,
    /// Leave the point in [`AnatomicalZone::Unknown`]; it passes zone validation.
    Unclassified,
}

impl UnknownMusclePolicy {
    #[must_use]
    pub const fn zone(self) -> AnatomicalZone {
        match self {
            Self::Glabella => AnatomicalZone::Glabella,
            Self::Unclassified => AnatomicalZone::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerConfig {
    pub dosage: DosageLimits,
    pub zones: ZoneBoundaries,
    pub surface: SurfaceCalibration,
    pub unknown_muscle: UnknownMusclePolicy,
}

impl PlannerConfig {
    /// Reads a configuration from any serde format and validates it. Decoding
    /// failures surface as [`ConfigError::Decode`].
    pub fn from_deserializer<'de, D>(deserializer: D) -> ConfigResult<Self>
    where
        D: Deserializer<'de>,
    {
        let config = Self::deserialize(deserializer).map_err(|err| ConfigError::Decode(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.dosage.validate()?;
        self.zones.validate()?;
        self.surface.validate()?;
        Ok(())
    }

    /// Classifier honouring [`PlannerConfig::unknown_muscle`].
    #[must_use]
    pub fn classifier(&self) -> ZoneClassifier {
        ZoneClassifier::new(self.unknown_muscle.zone())
    }
}

/// Reads a keyed table over `base`. Keys present in the input replace their
/// entry; the others keep the base value.
pub(crate) fn merge_entries<'de, D, K, V>(
    deserializer: D,
    mut base: BTreeMap<K, V>,
) -> Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: Ord + Deserialize<'de>,
    V: Deserialize<'de>,
{
    base.extend(BTreeMap::<K, V>::deserialize(deserializer)?);
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InjectionPoint, Muscle};
    use crate::safety::{DosageSafetyEngine, SafetyLevel, ZoneValidator};

    #[test]
    fn default_config_is_valid() {
        PlannerConfig::default()
            .validate()
            .expect("compiled-in tables are consistent");
    }

    #[test]
    fn empty_json_yields_defaults() {
        let config: PlannerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn unknown_muscle_policy_selects_fallback_zone() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"unknownMuscle":"unclassified"}"#).unwrap();
        assert_eq!(config.unknown_muscle, UnknownMusclePolicy::Unclassified);
        assert_eq!(config.classifier().zone_of("risorius"), AnatomicalZone::Unknown);
        assert_eq!(
            PlannerConfig::default().classifier().zone_of("risorius"),
            AnatomicalZone::Glabella
        );
    }

    #[test]
    fn single_entry_overrides_keep_other_checks() {
        let json = r#"{
            "dosage":{"muscles":{"procerus":{
                "max":10,"warning":8,"label":"Prócero",
                "genderRange":{"female":{"min":4,"max":8},"male":{"min":6,"max":10}}}}},
            "zones":{"nasal":{"xMin":0.40,"xMax":0.60,"yMin":0.36,"yMax":0.62}}
        }"#;
        let config = PlannerConfig::from_deserializer(&mut serde_json::Deserializer::from_str(json))
            .expect("merged config is valid");
        assert_eq!(config.dosage.muscles.len(), Muscle::ALL.len());

        let engine = DosageSafetyEngine::new(config.dosage.clone(), config.classifier());
        let checks = engine.evaluate_points(&[InjectionPoint::new("a", "masseter_left", 10.0, 70.0, 90)]);
        assert!(checks.iter().any(|c| c.muscle == "masseter_left" && c.level == SafetyLevel::Danger));

        let validator = ZoneValidator::new(config.zones.clone(), config.classifier());
        let stray = validator.validate(&InjectionPoint::new("b", "mentalis", 50.0, 20.0, 4));
        assert!(!stray.valid);
        assert_eq!(stray.zone, AnatomicalZone::Mentalis);
    }

    #[test]
    fn malformed_input_is_a_decode_error() {
        let result = PlannerConfig::from_deserializer(&mut serde_json::Deserializer::from_str(r#"{"zones":3}"#));
        assert!(matches!(result, Err(ConfigError::Decode(_))), "{result:?}");

        let json = r#"{"dosage":{"session":{"max":50,"warning":60,"label":"Total"}}}"#;
        let result = PlannerConfig::from_deserializer(&mut serde_json::Deserializer::from_str(json));
        assert_eq!(result, Err(ConfigError::WarningAboveMax("Total".to_owned())));
    }

    #[test]
    fn invalid_table_is_reported() {
        let mut config = PlannerConfig::default();
        config.surface.x_scale = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveScale("xScale")));
    }
}
