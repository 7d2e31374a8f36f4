//! Top-level solve driver: preflight pass-through, the relaxation ladder,
//! and the multi-run ensemble (`spec.md` §4.7).
//!
//! A single attempt is backend solve (construction + polish) followed by
//! postprocessing. The ladder only relaxes the weights *fed to search*; an
//! attempt's score and diagnostics are always recomputed against the
//! caller's original, unrelaxed weights so attempts and ensemble members
//! stay comparable on one scale.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roster_core::{
    Assignment, Diagnostics, ObjectiveScore, PostprocessStats, PreflightIssue, Result, RosterError,
    ScheduleInput, Score, SolverStatus,
};

use crate::backend::{ConstructionLocalSearchBackend, SolverBackend};
use crate::cancellation::CancellationToken;
use crate::postprocessor;

/// The only backend name this build understands. `options.solver`, when
/// set, is checked against this rather than silently ignored — requesting
/// an unavailable solver is an error, not a fallback (`spec.md` §4.7
/// "don't silently switch solvers").
pub const DEFAULT_SOLVER_NAME: &str = "construction-local-search";

/// Weight multipliers tried on successive relaxation-ladder rungs when an
/// attempt comes back infeasible, floored at [`RELAXATION_FLOOR`].
const RELAXATION_FACTORS: [f64; 3] = [0.8, 0.6, 0.4];
const RELAXATION_FLOOR: f64 = 0.2;

fn default_max_solve_time_ms(input: &ScheduleInput) -> u64 {
    input
        .options
        .max_solve_time_ms
        .unwrap_or_else(|| input.options.csp_settings.time_limit_ms.saturating_mul(2).max(1000))
}

struct Attempt {
    assignments: Vec<Assignment>,
    diagnostics: Diagnostics,
    score: ObjectiveScore,
    /// The `spec.md` §4.7 "per-attempt penalty" used to select among
    /// ensemble members: the postprocessor's own `finalPenalty` when one
    /// ran, else the synthetic sum over the canonical-scale diagnostics.
    penalty: f64,
}

/// The `spec.md` §4.7 per-attempt selection penalty: `postprocess.finalPenalty`
/// when present, else the synthetic weighted sum over the (canonical-scale)
/// diagnostics.
fn attempt_penalty(diagnostics: &Diagnostics) -> f64 {
    if let Some(stats) = &diagnostics.postprocess {
        return stats.final_penalty;
    }
    1000.0 * diagnostics.staffing_shortages.iter().map(|s| s.shortage as f64).sum::<f64>()
        + 400.0 * diagnostics.team_coverage_gaps.iter().map(|g| g.shortage as f64).sum::<f64>()
        + 350.0 * diagnostics.career_group_coverage_gaps.iter().map(|g| g.shortage as f64).sum::<f64>()
        + 200.0 * diagnostics.team_workload_gaps.iter().map(|g| g.difference as f64).sum::<f64>()
        + 180.0 * diagnostics.off_balance_gaps.iter().map(|g| g.difference as f64).sum::<f64>()
        + 120.0 * diagnostics.shift_pattern_breaks.iter().map(|b| b.excess as f64).sum::<f64>()
        + 150.0 * diagnostics.special_request_misses.len() as f64
}

/// Runs the backend then the postprocessor against `search_input`, and
/// returns the raw assignments, the postprocessor's own stats (if it ran),
/// and the backend's status and wall time. The violation diagnostics
/// themselves are *not* finalized here, since `search_input` may carry
/// relaxed weights that must not leak into the reported score.
fn solve_assignments(
    search_input: &ScheduleInput,
    deadline: Instant,
    cancellation: &CancellationToken,
    rng: &mut impl Rng,
) -> (Vec<Assignment>, Option<PostprocessStats>, SolverStatus, Duration) {
    let start = Instant::now();
    let mut backend = ConstructionLocalSearchBackend::new();
    let backend_solution = backend.solve(search_input, deadline, cancellation);
    let (assignments, diagnostics) = postprocessor::run(search_input, backend_solution.assignments, &[], cancellation, rng);
    (assignments, diagnostics.postprocess, backend_solution.status, start.elapsed())
}

fn finalize_attempt(
    canonical_input: &ScheduleInput,
    assignments: Vec<Assignment>,
    postprocess: Option<PostprocessStats>,
    preflight_issues: &[PreflightIssue],
    status: SolverStatus,
    wall_time: Duration,
) -> Attempt {
    let (score, mut diagnostics) = roster_scoring::evaluate(canonical_input, &assignments);
    diagnostics.preflight_issues = preflight_issues.to_vec();
    diagnostics.postprocess = postprocess;
    diagnostics.solver_status = Some(status);
    diagnostics.solver_timed_out = matches!(status, SolverStatus::Timeout);
    diagnostics.solver_wall_time_ms = Some(wall_time.as_millis() as u64);
    let penalty = attempt_penalty(&diagnostics);
    Attempt { assignments, diagnostics, score, penalty }
}

/// One full relaxation-ladder climb starting from `canonical_input`'s own
/// weights, returning the best-scoring rung (by the canonical, unrelaxed
/// score).
fn run_through_relaxation_ladder(
    canonical_input: &ScheduleInput,
    preflight_issues: &[PreflightIssue],
    deadline: Instant,
    cancellation: &CancellationToken,
    rng: &mut impl Rng,
) -> Attempt {
    let (assignments, postprocess, status, wall_time) = solve_assignments(canonical_input, deadline, cancellation, rng);
    let mut best = finalize_attempt(canonical_input, assignments, postprocess, preflight_issues, status, wall_time);

    if best.score.is_feasible() || cancellation.is_cancelled() {
        return best;
    }

    let mut relaxed = canonical_input.clone();
    for &factor in &RELAXATION_FACTORS {
        if cancellation.is_cancelled() || Instant::now() >= deadline {
            break;
        }
        relaxed.options.constraint_weights = canonical_input.options.constraint_weights.relax(factor, RELAXATION_FLOOR);
        let (assignments, postprocess, status, wall_time) = solve_assignments(&relaxed, deadline, cancellation, rng);
        let candidate = finalize_attempt(canonical_input, assignments, postprocess, preflight_issues, status, wall_time);
        if candidate.score.is_better_than(&best.score) {
            best = candidate;
        }
        if best.score.is_feasible() {
            break;
        }
    }
    best
}

/// Perturbs the four relaxation-ladder-eligible weights by up to
/// `jitter_pct` in either direction, leaving `shiftPattern` untouched, per
/// `ConstraintWeights::scale_jitter`.
fn jitter_weights(input: &ScheduleInput, jitter_pct: f64, rng: &mut impl Rng) -> ScheduleInput {
    let mut jittered = input.clone();
    let mut factor = || 1.0 + (rng.random::<f64>() * 2.0 - 1.0) * jitter_pct;
    let (f1, f2, f3, f4) = (factor(), factor(), factor(), factor());
    jittered.options.constraint_weights = input.options.constraint_weights.scale_jitter(f1, f2, f3, f4);
    jittered
}

/// Runs the full solve: solver-selection guard, multi-run ensemble (each
/// member independently climbing its own relaxation ladder), and the
/// `multiRunSummary` preflight annotation when more than one attempt ran or
/// the single attempt was itself weight-jittered.
pub fn solve(
    input: &ScheduleInput,
    preflight_issues: &[PreflightIssue],
    cancellation: &CancellationToken,
) -> Result<(Vec<Assignment>, Diagnostics)> {
    if let Some(requested) = &input.options.solver {
        if requested != DEFAULT_SOLVER_NAME {
            return Err(RosterError::Config(format!(
                "solver \"{requested}\" is not available in this build; only \"{DEFAULT_SOLVER_NAME}\" is implemented and it is never substituted silently for an explicit request",
            )));
        }
    }

    let attempts = input.options.multi_run.clamped_attempts();
    let base_seed = input.options.multi_run.seed.unwrap_or(0);
    let jitter_pct = input.options.multi_run.weight_jitter_pct.max(0.0);
    let deadline = Instant::now() + Duration::from_millis(default_max_solve_time_ms(input));

    let mut best: Option<(u32, Attempt)> = None;

    for attempt_idx in 0..attempts {
        if cancellation.is_cancelled() {
            break;
        }
        let seed = base_seed.wrapping_add(attempt_idx as u64 * 0x9E37_79B9_7F4A_7C15);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        // `app.py:829`: jitter every attempt except the baseline (attempt 0)
        // when more than one attempt runs; when only one attempt runs, the
        // jitter still applies to it (a single jittered ensemble member).
        let attempt_input = if jitter_pct > 0.0 && (attempts == 1 || attempt_idx > 0) {
            jitter_weights(input, jitter_pct, &mut rng)
        } else {
            input.clone()
        };

        let attempt = run_through_relaxation_ladder(&attempt_input, preflight_issues, deadline, cancellation, &mut rng);
        let is_better = best.as_ref().map_or(true, |(_, current)| attempt.penalty < current.penalty);
        if is_better {
            best = Some((attempt_idx, attempt));
        }
        let current_best = &best.as_ref().unwrap().1;
        let status_is_good = matches!(current_best.diagnostics.solver_status, Some(SolverStatus::Optimal) | Some(SolverStatus::Feasible));
        if current_best.penalty <= 1e-6 && status_is_good {
            break;
        }
    }

    let Some((best_idx, mut attempt)) = best else {
        return Err(RosterError::SolverCancelled);
    };

    if attempts > 1 || jitter_pct > 0.0 {
        attempt.diagnostics.preflight_issues.push(PreflightIssue::MultiRunSummary {
            attempts,
            seed: base_seed,
            jitter_pct,
            best_attempt: best_idx + 1,
            best_penalty: attempt.penalty,
        });
    }

    if cancellation.is_cancelled() && attempt.assignments.is_empty() {
        return Err(RosterError::SolverCancelled);
    }

    Ok((attempt.assignments, attempt.diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{Employee, MultiRunSettings, Options, WorkPatternType};
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
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            employees: vec![employee("e1"), employee("e2"), employee("e3")],
            shifts: vec![],
            special_requests: None,
            holidays: None,
            team_pattern: None,
            required_staff_per_shift: Some(HashMap::from([
                ("D".to_string(), 1),
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
    fn solve_produces_a_complete_assignment_grid() {
        let input = input();
        let (assignments, _diag) = solve(&input, &[], &CancellationToken::new()).unwrap();
        assert_eq!(assignments.len(), input.date_range().len() * input.employees.len());
    }

    #[test]
    fn rejects_an_unknown_requested_solver() {
        let mut input = input();
        input.options.solver = Some("cp-sat".to_string());
        let result = solve(&input, &[], &CancellationToken::new());
        assert!(matches!(result, Err(RosterError::Config(_))));
    }

    #[test]
    fn multi_run_attaches_summary_preflight_issue() {
        let mut input = input();
        input.options.multi_run = MultiRunSettings { attempts: 3, weight_jitter_pct: 0.2, seed: Some(42) };
        let (_, diagnostics) = solve(&input, &[], &CancellationToken::new()).unwrap();
        assert!(diagnostics
            .preflight_issues
            .iter()
            .any(|issue| matches!(issue, PreflightIssue::MultiRunSummary { .. })));
    }

    #[test]
    fn a_single_attempt_adds_no_summary_issue() {
        let input = input();
        let (_, diagnostics) = solve(&input, &[], &CancellationToken::new()).unwrap();
        assert!(!diagnostics
            .preflight_issues
            .iter()
            .any(|issue| matches!(issue, PreflightIssue::MultiRunSummary { .. })));
    }

    #[test]
    fn a_single_jittered_attempt_still_attaches_a_summary() {
        let mut input = input();
        input.options.multi_run = MultiRunSettings { attempts: 1, weight_jitter_pct: 0.2, seed: Some(7) };
        let (_, diagnostics) = solve(&input, &[], &CancellationToken::new()).unwrap();
        assert!(diagnostics
            .preflight_issues
            .iter()
            .any(|issue| matches!(issue, PreflightIssue::MultiRunSummary { best_attempt: 1, .. })));
    }

    #[test]
    fn multi_run_summary_reports_a_one_based_best_attempt() {
        let mut input = input();
        input.options.multi_run = MultiRunSettings { attempts: 3, weight_jitter_pct: 0.2, seed: Some(42) };
        let (_, diagnostics) = solve(&input, &[], &CancellationToken::new()).unwrap();
        let summary = diagnostics
            .preflight_issues
            .iter()
            .find_map(|issue| match issue {
                PreflightIssue::MultiRunSummary { attempts, best_attempt, .. } => Some((*attempts, *best_attempt)),
                _ => None,
            })
            .expect("multiRunSummary issue present");
        assert_eq!(summary.0, 3);
        assert!((1..=3).contains(&summary.1));
    }

    #[test]
    fn finalized_diagnostics_carry_postprocess_stats() {
        let input = input();
        let (_, diagnostics) = solve(&input, &[], &CancellationToken::new()).unwrap();
        let stats = diagnostics.postprocess.expect("postprocess stats should be threaded through");
        assert!(stats.final_penalty <= stats.initial_penalty + 1e-6);
    }
}
