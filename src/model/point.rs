use serde::{Deserialize, Serialize};

/// Injection depth; drives the depth indicator in the 3D view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    #[default]
    Superficial,
    Deep,
}

/// A proposed or manually placed injection.
///
/// `x` and `y` are always template-relative percentages (`0..=100`); mapped photo or
/// surface positions are derived on demand and never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionPoint {
    pub id: String,
    pub muscle: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub depth: Depth,
    pub dosage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl InjectionPoint {
    #[must_use]
    pub fn new(id: impl Into<String>, muscle: impl Into<String>, x: f64, y: f64, dosage: u32) -> Self {
        Self {
            id: id.into(),
            muscle: muscle.into(),
            x,
            y,
            depth: Depth::default(),
            dosage,
            confidence: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    /// Template position as fractions (`0..=1`).
    #[must_use]
    pub fn standard(&self) -> (f64, f64) {
        (self.x / 100.0, self.y / 100.0)
    }
}
