//! Domain types, shift-code rules, and the scalar score for the shift-roster
//! constraint-optimization engine.
//!
//! This crate carries the fixed single-domain model: the typed scheduling
//! input, the shift-code alphabet and allowed-shift relation, the
//! diagnostics record and its violation entries, and the scalar objective
//! score. It has no knowledge of how a schedule is built or searched; that
//! lives in `roster-scoring` and `roster-solver`.

pub mod assignment;
pub mod diagnostics;
pub mod employee;
pub mod error;
pub mod options;
pub mod schedule_input;
pub mod score;
pub mod shift;
pub mod shift_code;
pub mod special_request;

pub use assignment::Assignment;
pub use diagnostics::{
    AvoidPatternViolation, CareerGroupCoverageGap, Diagnostics, OffBalanceGap, PostprocessStats,
    PreflightIssue, ShiftPatternBreak, SolverStatus, SpecialRequestMissed, StaffingShortage,
    TeamCoverageGap, TeamWorkloadGap,
};
pub use employee::{Employee, WorkPatternType};
pub use error::{Result, RosterError};
pub use options::{
    AnnealingSettings, ConstraintWeights, CspSettings, MultiRunSettings, Options,
    PatternConstraints,
};
pub use schedule_input::ScheduleInput;
pub use score::{ObjectiveScore, Score};
pub use shift::Shift;
pub use special_request::{AliasMaps, CareerGroup, Holiday, SpecialRequest, TeamPattern};
