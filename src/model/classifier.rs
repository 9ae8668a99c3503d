//! The muscle → zone classifier shared by the mappers and the validator.

use std::sync::Arc;

use super::muscle::{Muscle, MuscleRegistry, NameMatch};
use super::zone::AnatomicalZone;

/// Outcome of resolving a free-form muscle name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The name resolved to a canonical muscle.
    Known(Muscle),
    /// The name names a bilateral muscle without a side.
    Bilateral { left: Muscle, right: Muscle },
    /// The name is not registered; the point takes the configured fallback zone.
    Unknown { fallback: AnatomicalZone },
}

impl Classification {
    #[must_use]
    pub const fn zone(self) -> AnatomicalZone {
        match self {
            Self::Known(muscle) | Self::Bilateral { left: muscle, .. } => muscle.zone(),
            Self::Unknown { fallback } => fallback,
        }
    }

    #[must_use]
    pub const fn muscle(self) -> Option<Muscle> {
        match self {
            Self::Known(muscle) => Some(muscle),
            Self::Bilateral { .. } | Self::Unknown { .. } => None,
        }
    }
}

/// Deterministic muscle-name classifier.
///
/// Cloning is cheap; the registry is shared.
#[derive(Debug, Clone)]
pub struct ZoneClassifier {
    registry: Arc<MuscleRegistry>,
    unknown_zone: AnatomicalZone,
}

impl Default for ZoneClassifier {
    fn default() -> Self {
        Self::new(AnatomicalZone::Glabella)
    }
}

impl ZoneClassifier {
    /// Creates a classifier that assigns `unknown_zone` to unregistered names.
    /// Pass [`AnatomicalZone::Unknown`] to leave such points unclassified.
    #[must_use]
    pub fn new(unknown_zone: AnatomicalZone) -> Self {
        Self {
            registry: Arc::new(MuscleRegistry::default()),
            unknown_zone,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &MuscleRegistry {
        &self.registry
    }

    #[must_use]
    pub fn unknown_zone(&self) -> AnatomicalZone {
        self.unknown_zone
    }

    #[must_use]
    pub fn classify(&self, name: &str) -> Classification {
        match self.registry.lookup(name) {
            Some(NameMatch::Muscle(muscle)) => Classification::Known(muscle),
            Some(NameMatch::Pair { left, right, .. }) => Classification::Bilateral { left, right },
            None => {
                log_unknown_muscle(&self.registry, name, self.unknown_zone);
                Classification::Unknown {
                    fallback: self.unknown_zone,
                }
            }
        }
    }

    /// Zone of a muscle name.
    #[must_use]
    pub fn zone_of(&self, name: &str) -> AnatomicalZone {
        self.classify(name).zone()
    }
}

pub(crate) fn log_unknown_muscle(registry: &MuscleRegistry, name: &str, zone: AnatomicalZone) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    match registry.closest(name) {
        Some((suggestion, distance)) => log::debug!(
            "unknown muscle {name:?} classified as {zone} (closest known: {suggestion}, distance {distance})"
        ),
        None => log::debug!("unknown muscle {name:?} classified as {zone}"),
    }
}
