//! The `guidance` map of `spec.md` §7: five category buckets of
//! plain-language, retryable suggestions derived from diagnostics and
//! preflight issues — "the only user-facing text the core produces."
//!
//! Grounded in the original implementation's `_build_failure_guidance`
//! (`app.py`), re-expressed in English and generalized to the typed
//! `PreflightIssue`/`Diagnostics` records rather than its raw dict shape.

use std::collections::HashSet;

use roster_core::{Diagnostics, PreflightIssue};
use serde::{Deserialize, Serialize};

/// Five named buckets of human-readable hints, one list per category
/// (`spec.md` §7: `staffing, coverage, requests, patterns, general`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceMap {
    #[serde(default)]
    pub staffing: Vec<String>,
    #[serde(default)]
    pub coverage: Vec<String>,
    #[serde(default)]
    pub requests: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub general: Vec<String>,
}

impl GuidanceMap {
    fn is_empty(&self) -> bool {
        self.staffing.is_empty()
            && self.coverage.is_empty()
            && self.requests.is_empty()
            && self.patterns.is_empty()
            && self.general.is_empty()
    }

    fn push_unique(list: &mut Vec<String>, seen: &mut HashSet<String>, message: String) {
        if seen.insert(message.clone()) {
            list.push(message);
        }
    }
}

/// Builds the guidance map from whatever preflight issues and diagnostics
/// were observed. Always returns at least one `general` hint so a caller
/// never sees an empty guidance block on a failure.
pub fn build(diagnostics: Option<&Diagnostics>, preflight_issues: &[PreflightIssue]) -> GuidanceMap {
    let mut guidance = GuidanceMap::default();
    let mut seen = HashSet::new();

    for issue in preflight_issues {
        match issue {
            PreflightIssue::OffRequirementImpossible { employee_id, required_off_days, available_days } => {
                GuidanceMap::push_unique(
                    &mut guidance.staffing,
                    &mut seen,
                    format!(
                        "employee {employee_id} needs {required_off_days} off days but the window only has {available_days}; lower the requirement or extend the window",
                    ),
                );
            }
            PreflightIssue::InsufficientPotentialStaff { date, shift_type, required, available } => {
                GuidanceMap::push_unique(
                    &mut guidance.staffing,
                    &mut seen,
                    format!(
                        "{date} {shift_type} needs {required} staff but only {available} employees can legally work it; add staff or lower requiredStaffPerShift",
                    ),
                );
            }
            PreflightIssue::TeamCoverageImpossible { date, shift_type, team_id } => {
                GuidanceMap::push_unique(
                    &mut guidance.coverage,
                    &mut seen,
                    format!("team {team_id} has no employee eligible for {shift_type} on {date}; add a team member or relax their work pattern"),
                );
            }
            PreflightIssue::CareerGroupCoverageImpossible { date, shift_type, career_group_alias } => {
                GuidanceMap::push_unique(
                    &mut guidance.coverage,
                    &mut seen,
                    format!(
                        "career group {career_group_alias} has no employee eligible for {shift_type} on {date}",
                    ),
                );
            }
            PreflightIssue::SpecialRequestPatternConflict { employee_id, date, requested_shift, .. } => {
                GuidanceMap::push_unique(
                    &mut guidance.requests,
                    &mut seen,
                    format!(
                        "employee {employee_id}'s request for {requested_shift} on {date} conflicts with their work pattern and cannot be honored",
                    ),
                );
            }
            PreflightIssue::SpecialRequestUnknownEmployee { employee_id, date } => {
                GuidanceMap::push_unique(
                    &mut guidance.requests,
                    &mut seen,
                    format!("special request for unknown employee {employee_id} on {date} was ignored"),
                );
            }
            PreflightIssue::SpecialRequestInvalidDate { employee_id, raw_date } => {
                GuidanceMap::push_unique(
                    &mut guidance.requests,
                    &mut seen,
                    format!("special request for employee {employee_id} has an unparseable date \"{raw_date}\" and was ignored"),
                );
            }
            PreflightIssue::MultiRunSummary { .. } => {}
        }
    }

    if let Some(diagnostics) = diagnostics {
        if !diagnostics.staffing_shortages.is_empty() {
            GuidanceMap::push_unique(
                &mut guidance.staffing,
                &mut seen,
                format!(
                    "{} shift(s) ended up understaffed; consider lowering requiredStaffPerShift or adding employees",
                    diagnostics.staffing_shortages.len()
                ),
            );
        }
        if !diagnostics.team_coverage_gaps.is_empty() || !diagnostics.career_group_coverage_gaps.is_empty() {
            GuidanceMap::push_unique(
                &mut guidance.coverage,
                &mut seen,
                "some teams or career groups could not be evenly covered on every required shift".to_string(),
            );
        }
        if !diagnostics.special_request_misses.is_empty() {
            GuidanceMap::push_unique(
                &mut guidance.requests,
                &mut seen,
                format!(
                    "{} special request(s) could not be honored alongside the other constraints",
                    diagnostics.special_request_misses.len()
                ),
            );
        }
        if !diagnostics.shift_pattern_breaks.is_empty() {
            let rest_after_night = diagnostics
                .shift_pattern_breaks
                .iter()
                .any(|b| b.shift_type.starts_with("N->"));
            if rest_after_night {
                GuidanceMap::push_unique(
                    &mut guidance.patterns,
                    &mut seen,
                    "at least one employee was scheduled back into a day or evening shift immediately after a night shift".to_string(),
                );
            }
            GuidanceMap::push_unique(
                &mut guidance.patterns,
                &mut seen,
                format!(
                    "{} shift-pattern break(s) remain (repetition, night-intensive cadence, or balance); consider relaxing shiftPattern weight",
                    diagnostics.shift_pattern_breaks.len()
                ),
            );
        }
        if !diagnostics.team_workload_gaps.is_empty() {
            GuidanceMap::push_unique(
                &mut guidance.patterns,
                &mut seen,
                "workload is not evenly split across teams or career groups; consider relaxing teamBalance/careerBalance weight".to_string(),
            );
        }
        if !diagnostics.off_balance_gaps.is_empty() {
            GuidanceMap::push_unique(
                &mut guidance.patterns,
                &mut seen,
                "off-day counts are not evenly split within at least one team; consider relaxing offBalance weight or csp.offTolerance".to_string(),
            );
        }
        if !diagnostics.avoid_pattern_violations.is_empty() {
            GuidanceMap::push_unique(
                &mut guidance.patterns,
                &mut seen,
                "at least one team's forbidden shift sequence (avoidPatterns) still appears in the result".to_string(),
            );
        }
    }

    if guidance.is_empty() {
        guidance.general.push(
            "no specific cause could be identified; retrying with a longer maxSolveTimeMs or more multiRun attempts may help"
                .to_string(),
        );
    }

    guidance
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use roster_core::StaffingShortage;

    #[test]
    fn empty_inputs_yield_a_general_fallback_hint() {
        let guidance = build(None, &[]);
        assert!(guidance.staffing.is_empty());
        assert_eq!(guidance.general.len(), 1);
    }

    #[test]
    fn staffing_shortage_populates_staffing_category() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.staffing_shortages.push(StaffingShortage {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            shift_type: "D".into(),
            required: 5,
            covered: 3,
            shortage: 2,
        });
        let guidance = build(Some(&diagnostics), &[]);
        assert_eq!(guidance.staffing.len(), 1);
        assert!(guidance.general.is_empty());
    }

    #[test]
    fn preflight_insufficient_staff_is_deduplicated_against_diagnostics() {
        let issues = vec![PreflightIssue::InsufficientPotentialStaff {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            shift_type: "D".into(),
            required: 5,
            available: 2,
        }];
        let guidance = build(None, &issues);
        assert_eq!(guidance.staffing.len(), 1);
    }
}
