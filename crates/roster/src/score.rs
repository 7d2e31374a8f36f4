//! Derives the `spec.md` §6 `score` summary (`total, fairness, preference,
//! coverage, constraintSatisfaction, breakdown`) from a finalized
//! [`Diagnostics`] record.
//!
//! The original implementation returns this block as a hardcoded constant
//! (`{total: 100, fairness: 100, preference: 100, coverage: 100,
//! constraintSatisfaction: 100, breakdown: []}` in `app.py`'s
//! `build_solver_result`). That is a placeholder rather than a deliberate
//! design choice, so this crate computes each sub-score from the
//! diagnostics categories a reader would expect it to summarize; see
//! `DESIGN.md`.

use roster_core::{ConstraintWeights, Diagnostics};

use crate::result::{ScoreBreakdownEntry, ScoreSummary};

fn clamp_0_100(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Builds the `score` block. `total_required_slots` is the sum over every
/// `(date, shiftType)` of the required headcount, used to scale the
/// staffing shortfall into a percentage; `0` is treated as "no staffing
/// requirement at all", which scores coverage at 100.
pub fn summarize(diagnostics: &Diagnostics, weights: &ConstraintWeights, total_required_slots: u32) -> ScoreSummary {
    let staffing_shortfall: u32 = diagnostics.staffing_shortages.iter().map(|s| s.shortage).sum();
    let coverage = if total_required_slots == 0 {
        100.0
    } else {
        clamp_0_100(100.0 * (1.0 - staffing_shortfall as f64 / total_required_slots as f64))
    };

    let coverage_gap_count = diagnostics.team_coverage_gaps.len() + diagnostics.career_group_coverage_gaps.len();
    let workload_gap_count = diagnostics.team_workload_gaps.len() + diagnostics.off_balance_gaps.len();
    let fairness = clamp_0_100(100.0 - 5.0 * (coverage_gap_count + workload_gap_count) as f64);

    let pattern_break_count = diagnostics.shift_pattern_breaks.len() + diagnostics.avoid_pattern_violations.len();
    let preference = clamp_0_100(100.0 - 5.0 * pattern_break_count as f64 - 5.0 * diagnostics.special_request_misses.len() as f64);

    let total_violations = diagnostics.staffing_shortages.len()
        + diagnostics.team_coverage_gaps.len()
        + diagnostics.career_group_coverage_gaps.len()
        + diagnostics.team_workload_gaps.len()
        + diagnostics.off_balance_gaps.len()
        + diagnostics.shift_pattern_breaks.len()
        + diagnostics.special_request_misses.len()
        + diagnostics.avoid_pattern_violations.len();
    let constraint_satisfaction = clamp_0_100(100.0 - 2.0 * total_violations as f64);

    let total = (coverage + fairness + preference + constraint_satisfaction) / 4.0;

    let w = weights.floored();
    let breakdown = vec![
        ScoreBreakdownEntry { category: "staffing".to_string(), penalty: staffing_shortfall as f64 * w.staffing },
        ScoreBreakdownEntry { category: "teamBalance".to_string(), penalty: (diagnostics.team_coverage_gaps.len() + diagnostics.team_workload_gaps.len()) as f64 * w.team_balance },
        ScoreBreakdownEntry { category: "careerBalance".to_string(), penalty: diagnostics.career_group_coverage_gaps.len() as f64 * w.career_balance },
        ScoreBreakdownEntry { category: "offBalance".to_string(), penalty: diagnostics.off_balance_gaps.len() as f64 * w.off_balance },
        ScoreBreakdownEntry { category: "shiftPattern".to_string(), penalty: pattern_break_count as f64 * w.shift_pattern },
        ScoreBreakdownEntry { category: "specialRequests".to_string(), penalty: diagnostics.special_request_misses.len() as f64 },
    ];

    ScoreSummary { total, fairness, preference, coverage, constraint_satisfaction, breakdown }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_diagnostics_scores_perfectly() {
        let summary = summarize(&Diagnostics::default(), &ConstraintWeights::default(), 100);
        assert_eq!(summary.total, 100.0);
        assert_eq!(summary.coverage, 100.0);
        assert!(summary.breakdown.iter().all(|b| b.penalty == 0.0));
    }

    #[test]
    fn zero_required_slots_still_scores_full_coverage() {
        let summary = summarize(&Diagnostics::default(), &ConstraintWeights::default(), 0);
        assert_eq!(summary.coverage, 100.0);
    }
}
