//! Preflight structural analysis and per-constraint scoring for the roster
//! engine (`spec.md` §4.1, §4.2).
//!
//! This crate turns a [`roster_core::ScheduleInput`] plus a candidate
//! [`roster_core::Assignment`] set into a weighted [`roster_core::ObjectiveScore`]
//! and a full [`roster_core::Diagnostics`] record. It has no notion of how
//! assignments are produced or searched; that lives in `roster-solver`.

pub mod evaluator;
pub mod preflight;
pub mod shared;

pub use evaluator::evaluate;
pub use preflight::analyze as analyze_preflight;
