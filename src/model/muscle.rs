//! Canonical muscle identifiers and the name registry that resolves free-form
//! muscle names onto them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::zone::AnatomicalZone;

/// Muscles the planner knows about. Declaration order is the order of the
/// dosage limit table.
///
/// Sided muscles follow image orientation: `*Left` lies at template `x < 50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Muscle {
    Procerus,
    CorrugatorLeft,
    CorrugatorRight,
    Frontalis,
    OrbicularisOculiLeft,
    OrbicularisOculiRight,
    Nasalis,
    OrbicularisOris,
    DepressorAnguliOrisLeft,
    DepressorAnguliOrisRight,
    Mentalis,
    MasseterLeft,
    MasseterRight,
}

impl Muscle {
    pub const ALL: [Self; 13] = [
        Self::Procerus,
        Self::CorrugatorLeft,
        Self::CorrugatorRight,
        Self::Frontalis,
        Self::OrbicularisOculiLeft,
        Self::OrbicularisOculiRight,
        Self::Nasalis,
        Self::OrbicularisOris,
        Self::DepressorAnguliOrisLeft,
        Self::DepressorAnguliOrisRight,
        Self::Mentalis,
        Self::MasseterLeft,
        Self::MasseterRight,
    ];

    /// Canonical snake_case identifier, as used in point data and dosage maps.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Procerus => "procerus",
            Self::CorrugatorLeft => "corrugator_left",
            Self::CorrugatorRight => "corrugator_right",
            Self::Frontalis => "frontalis",
            Self::OrbicularisOculiLeft => "orbicularis_oculi_left",
            Self::OrbicularisOculiRight => "orbicularis_oculi_right",
            Self::Nasalis => "nasalis",
            Self::OrbicularisOris => "orbicularis_oris",
            Self::DepressorAnguliOrisLeft => "depressor_anguli_oris_left",
            Self::DepressorAnguliOrisRight => "depressor_anguli_oris_right",
            Self::Mentalis => "mentalis",
            Self::MasseterLeft => "masseter_left",
            Self::MasseterRight => "masseter_right",
        }
    }

    #[must_use]
    pub const fn zone(self) -> AnatomicalZone {
        match self {
            Self::Procerus | Self::CorrugatorLeft | Self::CorrugatorRight => {
                AnatomicalZone::Glabella
            }
            Self::Frontalis => AnatomicalZone::Frontalis,
            Self::OrbicularisOculiLeft | Self::OrbicularisOculiRight => {
                AnatomicalZone::Periorbital
            }
            Self::Nasalis => AnatomicalZone::Nasal,
            Self::OrbicularisOris
            | Self::DepressorAnguliOrisLeft
            | Self::DepressorAnguliOrisRight => AnatomicalZone::Perioral,
            Self::Mentalis => AnatomicalZone::Mentalis,
            Self::MasseterLeft | Self::MasseterRight => AnatomicalZone::Masseter,
        }
    }

    /// Labeled center of the muscle on the standard template, in percent.
    #[must_use]
    pub const fn template_center(self) -> (f64, f64) {
        match self {
            Self::Procerus => (50.0, 30.0),
            Self::CorrugatorLeft => (41.0, 27.0),
            Self::CorrugatorRight => (59.0, 27.0),
            Self::Frontalis => (50.0, 12.0),
            Self::OrbicularisOculiLeft => (22.0, 38.0),
            Self::OrbicularisOculiRight => (78.0, 38.0),
            Self::Nasalis => (50.0, 48.0),
            Self::OrbicularisOris => (50.0, 68.0),
            Self::DepressorAnguliOrisLeft => (38.0, 75.0),
            Self::DepressorAnguliOrisRight => (62.0, 75.0),
            Self::Mentalis => (50.0, 87.0),
            Self::MasseterLeft => (12.0, 70.0),
            Self::MasseterRight => (88.0, 70.0),
        }
    }
}

impl fmt::Display for Muscle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Accepted names for one muscle.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub names: &'static [&'static str],
    pub muscle: Muscle,
}

/// Every accepted spelling. The canonical id is registered implicitly.
pub const REGISTRATIONS: &[Registration] = &[
    Registration {
        names: &["Procerus", "Prócero", "Procero"],
        muscle: Muscle::Procerus,
    },
    Registration {
        names: &["Left Corrugator", "Corrugator L", "Corrugador Esquerdo"],
        muscle: Muscle::CorrugatorLeft,
    },
    Registration {
        names: &["Right Corrugator", "Corrugator R", "Corrugador Direito"],
        muscle: Muscle::CorrugatorRight,
    },
    Registration {
        names: &["Frontal", "Frontalis Center"],
        muscle: Muscle::Frontalis,
    },
    Registration {
        names: &[
            "Left Orbicularis Oculi",
            "Orbicularis Oculi L",
            "Orbicular do Olho Esquerdo",
        ],
        muscle: Muscle::OrbicularisOculiLeft,
    },
    Registration {
        names: &[
            "Right Orbicularis Oculi",
            "Orbicularis Oculi R",
            "Orbicular do Olho Direito",
        ],
        muscle: Muscle::OrbicularisOculiRight,
    },
    Registration {
        names: &["Nasal", "Nasalis Transverse"],
        muscle: Muscle::Nasalis,
    },
    Registration {
        names: &["Orbicular da Boca", "Orbicularis Oris Upper"],
        muscle: Muscle::OrbicularisOris,
    },
    Registration {
        names: &[
            "Left DAO",
            "DAO L",
            "Depressor do Ângulo da Boca Esquerdo",
        ],
        muscle: Muscle::DepressorAnguliOrisLeft,
    },
    Registration {
        names: &[
            "Right DAO",
            "DAO R",
            "Depressor do Ângulo da Boca Direito",
        ],
        muscle: Muscle::DepressorAnguliOrisRight,
    },
    Registration {
        names: &["Mentual", "Mentalis Center"],
        muscle: Muscle::Mentalis,
    },
    Registration {
        names: &["Left Masseter", "Masseter L", "Masseter Esquerdo"],
        muscle: Muscle::MasseterLeft,
    },
    Registration {
        names: &["Right Masseter", "Masseter R", "Masseter Direito"],
        muscle: Muscle::MasseterRight,
    },
];

/// Registry that looks muscles up by normalized name.
#[derive(Debug, Clone)]
pub struct MuscleRegistry {
    by_name: HashMap<String, Muscle>,
}

impl Default for MuscleRegistry {
    fn default() -> Self {
        let mut registry = Self::new();

        for muscle in Muscle::ALL {
            registry.register_names(&[muscle.id()], muscle);
        }

        for registration in REGISTRATIONS {
            registry.register_names(registration.names, registration.muscle);
        }

        registry
    }
}

impl MuscleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }

    pub fn register_names(&mut self, names: &[&str], muscle: Muscle) {
        for name in names {
            let key = normalize_name(name);
            self.by_name.insert(key, muscle);
        }
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Muscle> {
        self.by_name.get(&normalize_name(name)).copied()
    }

    /// Exact lookup first, then the keyword families.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<NameMatch> {
        if let Some(muscle) = self.resolve(name) {
            return Some(NameMatch::Muscle(muscle));
        }
        match_family(name)
    }

    /// Closest registered muscle by edit distance, for diagnostics only.
    #[must_use]
    pub fn closest(&self, name: &str) -> Option<(Muscle, usize)> {
        let key = normalize_name(name);
        self.by_name
            .iter()
            .map(|(known, muscle)| (*muscle, levenshtein::levenshtein(&key, known)))
            .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
    }
}

/// Outcome of [`MuscleRegistry::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// The name designates one muscle.
    Muscle(Muscle),
    /// The name designates a bilateral muscle without saying which side.
    Pair {
        family: &'static str,
        left: Muscle,
        right: Muscle,
    },
}

impl NameMatch {
    #[must_use]
    pub const fn zone(self) -> AnatomicalZone {
        match self {
            Self::Muscle(muscle) | Self::Pair { left: muscle, .. } => muscle.zone(),
        }
    }
}

/// A muscle family recognized by a run of name tokens. Unsided muscles use the
/// same muscle on both sides.
struct Family {
    id: &'static str,
    keywords: &'static [&'static [&'static str]],
    left: Muscle,
    right: Muscle,
}

/// Checked in order; the first family whose keyword run occurs in the name wins.
const FAMILIES: &[Family] = &[
    Family {
        id: "depressor_anguli_oris",
        keywords: &[&["depressor", "anguli"], &["depressor", "do", "ângulo"], &["dao"]],
        left: Muscle::DepressorAnguliOrisLeft,
        right: Muscle::DepressorAnguliOrisRight,
    },
    Family {
        id: "orbicularis_oculi",
        keywords: &[&["orbicularis", "oculi"], &["orbicular", "do", "olho"], &["oculi"]],
        left: Muscle::OrbicularisOculiLeft,
        right: Muscle::OrbicularisOculiRight,
    },
    Family {
        id: "orbicularis_oris",
        keywords: &[&["orbicularis", "oris"], &["orbicular", "da", "boca"], &["oris"]],
        left: Muscle::OrbicularisOris,
        right: Muscle::OrbicularisOris,
    },
    Family {
        id: "corrugator",
        keywords: &[&["corrugator"], &["corrugador"]],
        left: Muscle::CorrugatorLeft,
        right: Muscle::CorrugatorRight,
    },
    Family {
        id: "procerus",
        keywords: &[&["procerus"], &["prócero"], &["procero"]],
        left: Muscle::Procerus,
        right: Muscle::Procerus,
    },
    Family {
        id: "frontalis",
        keywords: &[&["frontalis"], &["frontal"]],
        left: Muscle::Frontalis,
        right: Muscle::Frontalis,
    },
    Family {
        id: "nasalis",
        keywords: &[&["nasalis"], &["nasal"]],
        left: Muscle::Nasalis,
        right: Muscle::Nasalis,
    },
    Family {
        id: "mentalis",
        keywords: &[&["mentalis"], &["mentual"]],
        left: Muscle::Mentalis,
        right: Muscle::Mentalis,
    },
    Family {
        id: "masseter",
        keywords: &[&["masseter"]],
        left: Muscle::MasseterLeft,
        right: Muscle::MasseterRight,
    },
];

const LEFT_TOKENS: &[&str] = &["left", "l", "esquerdo", "esquerda", "esq"];
const RIGHT_TOKENS: &[&str] = &["right", "r", "direito", "direita", "dir"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Keyword match for names outside the registration table, e.g. `masseter`,
/// `frontalis_left` or `corrugator superior esq`.
fn match_family(name: &str) -> Option<NameMatch> {
    let normalized = normalize_name(name);
    let tokens: Vec<&str> = normalized.split('_').filter(|t| !t.is_empty()).collect();
    let family = FAMILIES.iter().find(|family| {
        family
            .keywords
            .iter()
            .any(|run| tokens.windows(run.len()).any(|window| window == *run))
    })?;

    if family.left == family.right {
        return Some(NameMatch::Muscle(family.left));
    }
    let side = tokens.iter().find_map(|token| {
        if LEFT_TOKENS.contains(token) {
            Some(Side::Left)
        } else if RIGHT_TOKENS.contains(token) {
            Some(Side::Right)
        } else {
            None
        }
    });
    Some(match side {
        Some(Side::Left) => NameMatch::Muscle(family.left),
        Some(Side::Right) => NameMatch::Muscle(family.right),
        None => NameMatch::Pair {
            family: family.id,
            left: family.left,
            right: family.right,
        },
    })
}

/// Lowercases, trims and folds spaces and hyphens into underscores.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
