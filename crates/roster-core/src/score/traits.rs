//! Core `Score` trait definition.

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::ops::{Add, Neg, Sub};

/// Trait for solution-quality scores produced by the model builder and the
/// primary solver driver.
///
/// A score here is a single scalar (see `SPEC_FULL.md` §3): hard invariants
/// are enforced structurally during construction, so there is no separate
/// hard/soft level to compare — the only thing left to minimize is the
/// weighted sum of soft-constraint slack, scaled into an integer. Higher is
/// better; zero means no slack anywhere. This is deliberately distinct from
/// the postprocessor's own `Penalty` (a plain `f64`, never wrapped in
/// `Score`) — the two scoring functions are never unified.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns true when no soft constraint carries any slack.
    fn is_feasible(&self) -> bool;

    /// The zero score (identity element for addition).
    fn zero() -> Self;

    /// Multiplies this score by a scalar (used by weight jitter and the
    /// relaxation ladder).
    fn multiply(&self, multiplicand: f64) -> Self;

    /// Compares two scores, returning the ordering.
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// Returns true if this score is strictly better than `other`.
    fn is_better_than(&self, other: &Self) -> bool {
        self > other
    }

    /// Returns true if this score is strictly worse than `other`.
    fn is_worse_than(&self, other: &Self) -> bool {
        self < other
    }
}
