//! Facade crate for the shift-roster constraint-optimization engine.
//!
//! [`solve_schedule`] is the single public entry point: it runs the
//! preflight analyzer, the orchestrator (solver selection, relaxation
//! ladder, multi-run ensemble), and assembles the `spec.md` §6 result
//! payload (`ScheduleResult`, flattened `Violation`s, a derived `score`
//! summary, and `offAccruals`). On failure it assembles the §7 `guidance`
//! map instead. The external job envelope (HTTP status polling, queue
//! persistence, job ids and timestamps) is an out-of-scope collaborator;
//! this crate only builds the payload that envelope would carry.

pub mod accruals;
pub mod guidance;
pub mod result;
pub mod score;
pub mod telemetry;

use std::time::Instant;

use roster_core::{Diagnostics, RosterError, ScheduleInput};
use roster_solver::CancellationToken;

pub use guidance::GuidanceMap;
pub use result::{GenerationResult, OffAccrual, ScheduleResult, ScoreBreakdownEntry, ScoreSummary, Violation};

pub use roster_core::{Assignment, Employee, Options, PreflightIssue, Shift, WorkPatternType};
pub use roster_solver::DEFAULT_SOLVER_NAME;

/// Everything returned on a failed solve: a human-readable `message`, the
/// `diagnostics` observed before the failure (when any survive), and the
/// `guidance` map built from them (`spec.md` §7).
#[derive(Debug, Clone)]
pub struct SolveFailure {
    pub message: String,
    pub diagnostics: Option<Diagnostics>,
    pub guidance: GuidanceMap,
}

impl std::fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SolveFailure {}

fn total_required_slots(input: &ScheduleInput) -> u32 {
    let per_day: u32 = input.required_staff_map().values().sum();
    per_day.saturating_mul(input.date_range().len() as u32)
}

fn build_result(input: &ScheduleInput, assignments: Vec<roster_core::Assignment>, diagnostics: Diagnostics, wall_time: Instant) -> ScheduleResult {
    let violations = result::flatten_violations(&diagnostics);
    let off_accruals = accruals::compute_off_accruals(input, &assignments);
    let score_summary = score::summarize(&diagnostics, &input.options.constraint_weights, total_required_slots(input));

    let generation_result = GenerationResult {
        computation_time: wall_time.elapsed().as_millis() as u64,
        solve_status: diagnostics.solver_status.unwrap_or(roster_core::SolverStatus::Feasible),
        solver_timed_out: diagnostics.solver_timed_out,
        violations,
        score: score_summary,
        off_accruals,
        postprocess: diagnostics.postprocess,
        diagnostics,
    };

    ScheduleResult { assignments, generation_result }
}

fn build_failure(error: RosterError, preflight_issues: &[PreflightIssue]) -> SolveFailure {
    match error {
        RosterError::SolverFailure { message, diagnostics } => {
            let diagnostics = diagnostics.map(|d| *d);
            let guidance = guidance::build(diagnostics.as_ref(), preflight_issues);
            SolveFailure { message, diagnostics, guidance }
        }
        RosterError::SolverCancelled => SolveFailure {
            message: "solve was cancelled before any feasible attempt completed".to_string(),
            diagnostics: None,
            guidance: guidance::build(None, preflight_issues),
        },
        other => SolveFailure {
            message: other.to_string(),
            diagnostics: None,
            guidance: guidance::build(None, preflight_issues),
        },
    }
}

/// Runs preflight analysis and the full solve against a fresh, never
/// externally cancelled token. Most callers want this.
pub fn solve_schedule(input: &ScheduleInput) -> Result<ScheduleResult, SolveFailure> {
    solve_schedule_cancellable(input, &CancellationToken::new())
}

/// Same as [`solve_schedule`], but lets a caller hold onto `cancellation`
/// and cancel the solve from another thread (`spec.md` §5). `cancellation`
/// is checked at solver construction, backend polish, postprocessor
/// iterations, and the multi-run ensemble boundary.
pub fn solve_schedule_cancellable(input: &ScheduleInput, cancellation: &CancellationToken) -> Result<ScheduleResult, SolveFailure> {
    let start = Instant::now();
    let preflight_issues = roster_scoring::analyze_preflight(input);

    match roster_solver::solve(input, &preflight_issues, cancellation) {
        Ok((assignments, diagnostics)) => Ok(build_result(input, assignments, diagnostics, start)),
        Err(error) => Err(build_failure(error, &preflight_issues)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use roster_core::Employee;
    use std::collections::HashMap;

    fn employee(id: &str) -> Employee {
        Employee {
            id: id.into(),
            team_id: None,
            work_pattern_type: WorkPatternType::ThreeShift,
            career_group_alias: None,
            preferred_shift_types: HashMap::new(),
            max_consecutive_days_preferred: None,
            max_consecutive_nights_preferred: None,
        }
    }

    fn input() -> ScheduleInput {
        ScheduleInput {
            department_id: "dept".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            employees: vec![employee("e1"), employee("e2"), employee("e3"), employee("e4"), employee("e5")],
            shifts: vec![],
            special_requests: None,
            holidays: None,
            team_pattern: None,
            required_staff_per_shift: Some(HashMap::from([
                ("D".to_string(), 2),
                ("E".to_string(), 1),
                ("N".to_string(), 1),
            ])),
            previous_off_accruals: HashMap::new(),
            night_intensive_paid_leave_days: None,
            career_groups: None,
            alias_maps: None,
            options: Options::default(),
        }
    }

    #[test]
    fn solve_schedule_returns_a_complete_result_payload() {
        let input = input();
        let result = solve_schedule(&input).unwrap();
        assert_eq!(result.assignments.len(), input.employees.len() * input.date_range().len());
        assert_eq!(result.generation_result.off_accruals.len(), input.employees.len());
    }

    #[test]
    fn rejected_solver_choice_surfaces_as_a_failure_with_guidance() {
        let mut input = input();
        input.options.solver = Some("cp-sat".to_string());
        let failure = solve_schedule(&input).unwrap_err();
        assert!(!failure.guidance.general.is_empty());
    }

    #[test]
    fn cancelling_before_solving_produces_a_failure() {
        let input = input();
        let token = CancellationToken::new();
        token.cancel();
        let result = solve_schedule_cancellable(&input, &token);
        assert!(result.is_err());
    }
}
