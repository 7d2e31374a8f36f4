//! `ObjectiveScore` - the scalar the model builder and primary solver minimize.

use std::cmp::Ordering;
use std::fmt;

use super::traits::Score;

/// A millipenalty score: the weighted sum of soft-constraint slack, scaled
/// by 1000 and rounded to an integer (`spec.md` §9, "Numeric safety"), then
/// negated so that higher is better and `ZERO` means no slack anywhere.
///
/// # Examples
///
/// ```
/// use roster_core::{ObjectiveScore, Score};
///
/// let understaffed = ObjectiveScore::of_penalty(1500);
/// let feasible = ObjectiveScore::ZERO;
///
/// assert!(feasible > understaffed);
/// assert!(feasible.is_feasible());
/// assert!(!understaffed.is_feasible());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct ObjectiveScore {
    millipenalty: i64,
}

impl ObjectiveScore {
    /// No slack anywhere.
    pub const ZERO: ObjectiveScore = ObjectiveScore { millipenalty: 0 };

    /// Builds a score directly from a (negated) millipenalty value.
    #[inline]
    pub const fn of(millipenalty: i64) -> Self {
        ObjectiveScore { millipenalty }
    }

    /// Builds a score from a nonnegative accumulated penalty (weighted slack
    /// sum). The stored value is negated so comparisons read naturally.
    #[inline]
    pub fn of_penalty(penalty: i64) -> Self {
        ObjectiveScore { millipenalty: -penalty }
    }

    /// Total accumulated penalty (always `>= 0`).
    #[inline]
    pub fn penalty(&self) -> i64 {
        -self.millipenalty
    }
}

impl Score for ObjectiveScore {
    #[inline]
    fn is_feasible(&self) -> bool {
        self.millipenalty >= 0
    }

    #[inline]
    fn zero() -> Self {
        ObjectiveScore::ZERO
    }

    fn multiply(&self, multiplicand: f64) -> Self {
        ObjectiveScore::of((self.millipenalty as f64 * multiplicand).round() as i64)
    }
}

impl Ord for ObjectiveScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millipenalty.cmp(&other.millipenalty)
    }
}

impl PartialOrd for ObjectiveScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::ops::Add for ObjectiveScore {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        ObjectiveScore::of(self.millipenalty + other.millipenalty)
    }
}

impl std::ops::Sub for ObjectiveScore {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        ObjectiveScore::of(self.millipenalty - other.millipenalty)
    }
}

impl std::ops::Neg for ObjectiveScore {
    type Output = Self;
    fn neg(self) -> Self {
        ObjectiveScore::of(-self.millipenalty)
    }
}

impl fmt::Debug for ObjectiveScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectiveScore({})", self.millipenalty)
    }
}

impl fmt::Display for ObjectiveScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.millipenalty)
    }
}

impl From<i64> for ObjectiveScore {
    fn from(millipenalty: i64) -> Self {
        ObjectiveScore::of(millipenalty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_feasible() {
        assert!(ObjectiveScore::ZERO.is_feasible());
    }

    #[test]
    fn penalty_round_trips() {
        let s = ObjectiveScore::of_penalty(4200);
        assert_eq!(s.penalty(), 4200);
        assert!(!s.is_feasible());
    }

    #[test]
    fn ordering_prefers_less_penalty() {
        let worse = ObjectiveScore::of_penalty(2000);
        let better = ObjectiveScore::of_penalty(500);
        assert!(better > worse);
        assert!(ObjectiveScore::ZERO > better);
    }

    #[test]
    fn multiply_scales_penalty() {
        let s = ObjectiveScore::of_penalty(1000).multiply(0.5);
        assert_eq!(s.penalty(), 500);
    }
}
