//! Time codes.
//!
//! One time code unit per AGX time step: step `i` is authored at time code
//! `i as f64`.

use std::cmp::Ordering;
use std::fmt;

/// Scalar time code of an authored sample.
///
/// Ordered with `f64::total_cmp`, so it can key sorted sample maps.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeCode(f64);

impl TimeCode {
    /// Create a time code.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Time code of an AGX time step.
    #[inline]
    pub fn from_step(index: u32) -> Self {
        Self(f64::from(index))
    }

    /// The raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for TimeCode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeCode {}

impl PartialOrd for TimeCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for TimeCode {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared start and end time codes of a stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    pub start: TimeCode,
    pub end: TimeCode,
}

impl TimeRange {
    /// `[0, count - 1]`, collapsing to `[0, 0]` for zero time steps.
    pub fn from_time_steps(count: u32) -> Self {
        Self {
            start: TimeCode::new(0.0),
            end: TimeCode::from_step(count.saturating_sub(1)),
        }
    }

    /// Check if a time code lies inside the range.
    pub fn contains(&self, time: TimeCode) -> bool {
        self.start <= time && time <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_step() {
        assert_eq!(TimeCode::from_step(0).value(), 0.0);
        assert_eq!(TimeCode::from_step(2).value(), 2.0);
    }

    #[test]
    fn test_ordering() {
        let mut codes = vec![TimeCode::new(2.0), TimeCode::new(0.0), TimeCode::new(1.5)];
        codes.sort();
        assert_eq!(codes, vec![TimeCode::new(0.0), TimeCode::new(1.5), TimeCode::new(2.0)]);
    }

    #[test]
    fn test_range() {
        let r = TimeRange::from_time_steps(2);
        assert_eq!(r.start.value(), 0.0);
        assert_eq!(r.end.value(), 1.0);
        assert!(r.contains(TimeCode::new(1.0)));
        assert!(!r.contains(TimeCode::new(2.0)));

        let empty = TimeRange::from_time_steps(0);
        assert_eq!(empty.end.value(), 0.0);
    }
}
