//! The scalar score the model builder and primary solver driver minimize.
//!
//! See `SPEC_FULL.md` §3 for why this is a single scalar rather than the
//! multi-level hard/soft scores common in general-purpose constraint
//! solvers: hard invariants are enforced structurally by construction, so
//! there is nothing left to score except the weighted soft-constraint slack.

mod objective;
mod traits;

pub use objective::ObjectiveScore;
pub use traits::Score;
