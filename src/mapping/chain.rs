//! Piecewise-linear chains between standard template values and image values.

use crate::geom::lerp;

/// One chain node: where a template value lands in the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub standard: f64,
    pub image: f64,
}

impl Breakpoint {
    #[must_use]
    pub const fn new(standard: f64, image: f64) -> Self {
        Self { standard, image }
    }
}

/// An ordered chain of `N` breakpoints with strictly increasing standard values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorChain<const N: usize> {
    breakpoints: [Breakpoint; N],
}

impl<const N: usize> AnchorChain<N> {
    /// Pair fixed standard positions with their measured image values.
    #[must_use]
    pub fn new(standard: &[f64; N], image: [f64; N]) -> Self {
        let mut breakpoints = [Breakpoint::new(0.0, 0.0); N];
        for (slot, (s, i)) in breakpoints.iter_mut().zip(standard.iter().zip(image)) {
            *slot = Breakpoint::new(*s, i);
        }
        Self { breakpoints }
    }

    #[must_use]
    pub fn breakpoints(&self) -> &[Breakpoint; N] {
        &self.breakpoints
    }

    /// Interpolate the image value for `value`.
    ///
    /// Brackets are half-open `[lo, hi)` except the last, which is closed, so a value
    /// sitting exactly on a breakpoint returns that breakpoint's image value without
    /// rounding. Returns `None` when no bracket contains `value`.
    #[must_use]
    pub fn interpolate(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let last = self.breakpoints.len().checked_sub(2)?;
        self.breakpoints
            .windows(2)
            .enumerate()
            .find_map(|(idx, pair)| {
                let (lo, hi) = (pair[0], pair[1]);
                let inside = if idx == last {
                    value >= lo.standard && value <= hi.standard
                } else {
                    value >= lo.standard && value < hi.standard
                };
                if !inside {
                    return None;
                }
                if value == hi.standard {
                    return Some(hi.image);
                }
                let span = hi.standard - lo.standard;
                if span <= 0.0 {
                    return Some(lo.image);
                }
                Some(lerp(lo.image, hi.image, (value - lo.standard) / span))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD: [f64; 4] = [0.0, 0.25, 0.5, 1.0];

    #[test]
    fn interpolates_within_bracket() {
        let chain = AnchorChain::new(&STANDARD, [0.1, 0.2, 0.6, 0.9]);
        let v = chain.interpolate(0.375).unwrap();
        assert!((v - 0.4).abs() < 1e-12);
    }

    #[test]
    fn breakpoints_are_exact() {
        let chain = AnchorChain::new(&STANDARD, [0.1, 0.29, 0.6, 0.9]);
        assert_eq!(chain.interpolate(0.0), Some(0.1));
        assert_eq!(chain.interpolate(0.25), Some(0.29));
        assert_eq!(chain.interpolate(0.5), Some(0.6));
        assert_eq!(chain.interpolate(1.0), Some(0.9));
    }

    #[test]
    fn outside_every_bracket_is_none() {
        let chain = AnchorChain::new(&STANDARD, [0.1, 0.2, 0.6, 0.9]);
        assert_eq!(chain.interpolate(-0.01), None);
        assert_eq!(chain.interpolate(1.01), None);
        assert_eq!(chain.interpolate(f64::NAN), None);
    }

    #[test]
    fn non_monotone_image_values_still_interpolate() {
        let chain = AnchorChain::new(&STANDARD, [0.5, 0.3, 0.4, 0.2]);
        let v = chain.interpolate(0.125).unwrap();
        assert!((v - 0.4).abs() < 1e-12);
    }
}
