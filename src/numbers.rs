// Floating point numbers cannot be sorted because they can be NaN. A
// damage history can contain NaN or infinity when a rate overflows, so
// the extremes used for axis limits and reports go through this wrapper.

use std::cmp::Ordering;

#[derive(PartialEq, Clone, Copy, Debug)]
pub struct NonNan(f64);

impl NonNan {
    pub fn new(val: f64) -> Option<NonNan> {
        if val.is_nan() {
            None
        } else {
            Some(NonNan(val))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Eq for NonNan {}
impl Ord for NonNan {
    fn cmp(&self, other: &NonNan) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for NonNan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Largest finite value, ignoring NaN and infinities.
pub fn max_finite(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .filter(|v| v.is_finite())
        .filter_map(|&v| NonNan::new(v))
        .max()
        .map(NonNan::value)
}

/// Smallest finite value, ignoring NaN and infinities.
pub fn min_finite(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .filter(|v| v.is_finite())
        .filter_map(|&v| NonNan::new(v))
        .min()
        .map(NonNan::value)
}
