//! Per-muscle and session-total dosage checks.

use std::collections::BTreeMap;

use serde::Serialize;

use super::limits::DosageLimits;
use crate::model::{InjectionPoint, Muscle, MuscleRegistry, NameMatch, ZoneClassifier, normalize_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Safe,
    Warning,
    Danger,
}

/// One alert for the banner. `muscle` is the canonical id, the family id for a
/// bilateral muscle named without a side, or `"total"` for the session check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyCheck {
    pub level: SafetyLevel,
    pub muscle: String,
    pub label: String,
    pub dosage: u32,
    pub limit: u32,
    pub message: String,
}

pub const SESSION_KEY: &str = "total";

/// Cumulative dosage per muscle name plus the session total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DosageSummary {
    pub by_muscle: BTreeMap<String, u32>,
    pub total: u32,
}

impl DosageSummary {
    /// Sums the plan's points. Names that resolve to a muscle fold onto its
    /// canonical id, unsided bilateral names onto the family id; other names are
    /// kept in normalized form.
    #[must_use]
    pub fn from_points(points: &[InjectionPoint], registry: &MuscleRegistry) -> Self {
        let mut summary = Self::default();
        for point in points {
            let key = match registry.lookup(&point.muscle) {
                Some(NameMatch::Muscle(muscle)) => muscle.id().to_owned(),
                Some(NameMatch::Pair { family, .. }) => family.to_owned(),
                None => normalize_name(&point.muscle),
            };
            let entry = summary.by_muscle.entry(key).or_default();
            *entry = entry.saturating_add(point.dosage);
            summary.total = summary.total.saturating_add(point.dosage);
        }
        summary
    }
}

#[derive(Debug, Clone, Default)]
pub struct DosageSafetyEngine {
    limits: DosageLimits,
    classifier: ZoneClassifier,
}

impl DosageSafetyEngine {
    #[must_use]
    pub fn new(limits: DosageLimits, classifier: ZoneClassifier) -> Self {
        Self { limits, classifier }
    }

    #[must_use]
    pub fn limits(&self) -> &DosageLimits {
        &self.limits
    }

    /// Evaluates `dosage_by_muscle` against the per-muscle table (in table order)
    /// and `total` against the session limit.
    ///
    /// Keys resolve through the muscle registry, so two aliases of one muscle add
    /// up. A bilateral muscle named without a side is checked against the
    /// stricter of its two side limits, after the per-muscle checks. Keys that
    /// resolve to nothing, or to a muscle without a limit, are left out.
    #[must_use]
    pub fn evaluate(&self, dosage_by_muscle: &BTreeMap<String, u32>, total: u32) -> Vec<SafetyCheck> {
        let registry = self.classifier.registry();
        let mut by_muscle: BTreeMap<Muscle, u32> = BTreeMap::new();
        let mut unsided: BTreeMap<Muscle, (&'static str, Muscle, u32)> = BTreeMap::new();
        for (name, dosage) in dosage_by_muscle {
            match registry.lookup(name) {
                Some(NameMatch::Muscle(muscle)) => {
                    let entry = by_muscle.entry(muscle).or_default();
                    *entry = entry.saturating_add(*dosage);
                }
                Some(NameMatch::Pair { family, left, right }) => {
                    let entry = unsided.entry(left).or_insert((family, right, 0));
                    entry.2 = entry.2.saturating_add(*dosage);
                }
                None => log::debug!("no dosage limit for {name:?} ({dosage}U), skipped"),
            }
        }

        let mut checks = Vec::new();
        for (muscle, limit) in &self.limits.muscles {
            let Some(&dosage) = by_muscle.get(muscle) else {
                continue;
            };
            if let Some(check) = check(muscle.id(), &limit.label, dosage, limit.max, limit.warning) {
                checks.push(check);
            }
        }
        for muscle in by_muscle.keys() {
            if !self.limits.muscles.contains_key(muscle) {
                log::debug!("no dosage limit configured for {muscle}, skipped");
            }
        }

        for (left, (family, right, dosage)) in unsided {
            match self.pair_limit(left, right) {
                Some((label, max, warning)) => {
                    if let Some(check) = check(family, &label, dosage, max, warning) {
                        checks.push(check);
                    }
                }
                None => log::debug!("no dosage limit configured for {family}, skipped"),
            }
        }

        let session = &self.limits.session;
        if let Some(check) = check(SESSION_KEY, &session.label, total, session.max, session.warning) {
            checks.push(check);
        }
        checks
    }

    /// Stricter of the two side limits, labelled with the words both labels share.
    fn pair_limit(&self, left: Muscle, right: Muscle) -> Option<(String, u32, u32)> {
        match (self.limits.get(left), self.limits.get(right)) {
            (Some(l), Some(r)) => Some((
                shared_label(&l.label, &r.label),
                l.max.min(r.max),
                l.warning.min(r.warning),
            )),
            (Some(only), None) | (None, Some(only)) => {
                Some((only.label.clone(), only.max, only.warning))
            }
            (None, None) => None,
        }
    }

    /// Aggregates `points` and evaluates the result.
    #[must_use]
    pub fn evaluate_points(&self, points: &[InjectionPoint]) -> Vec<SafetyCheck> {
        let summary = DosageSummary::from_points(points, self.classifier.registry());
        self.evaluate(&summary.by_muscle, summary.total)
    }
}

/// Leading words common to both labels ("Masseter Esquerdo" and "Masseter
/// Direito" give "Masseter"); the first label when they share none.
fn shared_label(a: &str, b: &str) -> String {
    let shared: Vec<&str> = a
        .split_whitespace()
        .zip(b.split_whitespace())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect();
    if shared.is_empty() {
        a.to_owned()
    } else {
        shared.join(" ")
    }
}

fn check(muscle: &str, label: &str, dosage: u32, max: u32, warning: u32) -> Option<SafetyCheck> {
    let (level, message) = if dosage > max {
        (
            SafetyLevel::Danger,
            format!("{label}: {dosage}U excede o limite máximo de {max}U"),
        )
    } else if dosage >= warning {
        (
            SafetyLevel::Warning,
            format!(
                "{label}: {dosage}U próximo do limite máximo de {max}U (alerta a partir de {warning}U)"
            ),
        )
    } else {
        return None;
    };
    Some(SafetyCheck {
        level,
        muscle: muscle.to_owned(),
        label: label.to_owned(),
        dosage,
        limit: max,
        message,
    })
}
