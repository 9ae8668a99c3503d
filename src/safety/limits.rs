//! Clinical dosage limits.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{ConfigError, ConfigResult, merge_entries};
use crate::model::Muscle;

/// Inclusive unit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseRange {
    pub min: u32,
    pub max: u32,
}

impl DoseRange {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuscleStrength {
    Low,
    Medium,
    High,
}

/// Typical dose range by patient sex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderRange {
    pub female: DoseRange,
    pub male: DoseRange,
}

/// Dose multipliers by observed muscle strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthModifier {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for StrengthModifier {
    fn default() -> Self {
        Self {
            low: 0.8,
            medium: 1.0,
            high: 1.25,
        }
    }
}

/// Limits for one muscle.
///
/// `gender_range` and `strength_modifier` describe typical dosing; the safety
/// evaluator only reads `max` and `warning`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuscleDosageLimit {
    pub max: u32,
    pub warning: u32,
    pub label: String,
    pub gender_range: GenderRange,
    #[serde(default)]
    pub strength_modifier: StrengthModifier,
}

impl MuscleDosageLimit {
    fn new(max: u32, warning: u32, label: &str, female: DoseRange, male: DoseRange) -> Self {
        Self {
            max,
            warning,
            label: label.to_owned(),
            gender_range: GenderRange { female, male },
            strength_modifier: StrengthModifier::default(),
        }
    }

    /// Typical range for a patient, scaled by muscle strength and capped at `max`.
    #[must_use]
    pub fn recommended_range(&self, sex: Sex, strength: MuscleStrength) -> DoseRange {
        let base = match sex {
            Sex::Female => self.gender_range.female,
            Sex::Male => self.gender_range.male,
        };
        let factor = match strength {
            MuscleStrength::Low => self.strength_modifier.low,
            MuscleStrength::Medium => self.strength_modifier.medium,
            MuscleStrength::High => self.strength_modifier.high,
        };
        let scale = |units: u32| -> u32 {
            let scaled = (f64::from(units) * factor).round();
            if scaled.is_finite() && scaled > 0.0 {
                (scaled as u32).min(self.max)
            } else {
                0
            }
        };
        let max = scale(base.max);
        DoseRange::new(scale(base.min).min(max), max)
    }
}

/// Limits for the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLimit {
    pub max: u32,
    pub warning: u32,
    pub label: String,
}

impl Default for SessionLimit {
    fn default() -> Self {
        Self {
            max: 100,
            warning: 80,
            label: "Total da Sessão".to_owned(),
        }
    }
}

/// Per-muscle limit table plus the session limit. Iteration follows [`Muscle`]
/// declaration order.
///
/// Deserialized `muscles` entries replace the matching defaults only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DosageLimits {
    #[serde(deserialize_with = "merge_muscle_limits")]
    pub muscles: BTreeMap<Muscle, MuscleDosageLimit>,
    pub session: SessionLimit,
}

impl Default for DosageLimits {
    fn default() -> Self {
        Self {
            muscles: default_muscle_limits(),
            session: SessionLimit::default(),
        }
    }
}

fn merge_muscle_limits<'de, D>(deserializer: D) -> Result<BTreeMap<Muscle, MuscleDosageLimit>, D::Error>
where
    D: Deserializer<'de>,
{
    merge_entries(deserializer, default_muscle_limits())
}

fn default_muscle_limits() -> BTreeMap<Muscle, MuscleDosageLimit> {
    use Muscle::*;

    let r = DoseRange::new;
    BTreeMap::from([
        (Procerus, MuscleDosageLimit::new(12, 10, "Prócero", r(4, 8), r(6, 10))),
        (
            CorrugatorLeft,
            MuscleDosageLimit::new(15, 12, "Corrugador Esquerdo", r(4, 8), r(6, 12)),
        ),
        (
            CorrugatorRight,
            MuscleDosageLimit::new(15, 12, "Corrugador Direito", r(4, 8), r(6, 12)),
        ),
        (Frontalis, MuscleDosageLimit::new(20, 16, "Frontal", r(6, 14), r(10, 18))),
        (
            OrbicularisOculiLeft,
            MuscleDosageLimit::new(15, 12, "Orbicular do Olho Esquerdo", r(6, 10), r(8, 12)),
        ),
        (
            OrbicularisOculiRight,
            MuscleDosageLimit::new(15, 12, "Orbicular do Olho Direito", r(6, 10), r(8, 12)),
        ),
        (Nasalis, MuscleDosageLimit::new(8, 6, "Nasal", r(2, 4), r(2, 6))),
        (
            OrbicularisOris,
            MuscleDosageLimit::new(6, 4, "Orbicular da Boca", r(1, 4), r(2, 4)),
        ),
        (
            DepressorAnguliOrisLeft,
            MuscleDosageLimit::new(
                8,
                6,
                "Depressor do Ângulo da Boca Esquerdo",
                r(2, 4),
                r(2, 6),
            ),
        ),
        (
            DepressorAnguliOrisRight,
            MuscleDosageLimit::new(
                8,
                6,
                "Depressor do Ângulo da Boca Direito",
                r(2, 4),
                r(2, 6),
            ),
        ),
        (Mentalis, MuscleDosageLimit::new(10, 8, "Mentual", r(4, 6), r(4, 8))),
        (
            MasseterLeft,
            MuscleDosageLimit::new(35, 30, "Masseter Esquerdo", r(15, 25), r(20, 30)),
        ),
        (
            MasseterRight,
            MuscleDosageLimit::new(35, 30, "Masseter Direito", r(15, 25), r(20, 30)),
        ),
    ])
}

impl DosageLimits {
    #[must_use]
    pub fn get(&self, muscle: Muscle) -> Option<&MuscleDosageLimit> {
        self.muscles.get(&muscle)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (muscle, limit) in &self.muscles {
            if limit.warning > limit.max {
                return Err(ConfigError::WarningAboveMax(muscle.id().to_owned()));
            }
        }
        if self.session.warning > self.session.max {
            return Err(ConfigError::WarningAboveMax(self.session.label.clone()));
        }
        if let Some(muscle) = Muscle::ALL.into_iter().find(|m| !self.muscles.contains_key(m)) {
            return Err(ConfigError::MissingEntry(muscle.id().to_owned()));
        }
        Ok(())
    }
}
