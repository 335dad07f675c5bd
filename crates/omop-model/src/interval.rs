use serde::{Deserialize, Serialize};

/// A `[low, high]` reference interval.
///
/// The unbounded side of a one-sided interval is represented as `0.0`, not
/// infinity; downstream consumers of the destination tables rely on this
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    /// "No normal range known".
    pub const UNKNOWN: Self = Self {
        low: 0.0,
        high: 0.0,
    };

    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Smallest interval containing both inputs: min of lows, max of highs.
    /// Used to collapse sex-specific reference ranges when the subject's
    /// sex is unknown.
    pub fn superinterval(self, other: Self) -> Self {
        Self {
            low: self.low.min(other.low),
            high: self.high.max(other.high),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superinterval_takes_widest_bounds() {
        let f = Interval::new(7.0, 33.0);
        let m = Interval::new(10.0, 64.0);
        assert_eq!(f.superinterval(m), Interval::new(7.0, 64.0));
    }

    #[test]
    fn superinterval_is_commutative() {
        let a = Interval::new(0.38, 1.02);
        let b = Interval::new(0.51, 1.18);
        assert_eq!(a.superinterval(b), b.superinterval(a));
    }
}
