//! The diagnostics record and its typed violation entries (`spec.md` §4.5,
//! §4.1, §6).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A staffing shortfall on `(date, shiftType)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffingShortage {
    pub date: NaiveDate,
    pub shift_type: String,
    pub required: u32,
    pub covered: u32,
    pub shortage: u32,
}

/// A team has zero (or below-minimum) eligible coverage for a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCoverageGap {
    pub date: NaiveDate,
    pub shift_type: String,
    pub team_id: String,
    pub shortage: u32,
}

/// A career group has zero (or below-minimum) eligible coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerGroupCoverageGap {
    pub date: NaiveDate,
    pub shift_type: String,
    pub career_group_alias: String,
    pub shortage: u32,
}

/// Two teams' total worked-shift counts differ by more than `tolerance`.
///
/// Also carries career-group workload-balance violations (`spec.md` §4.2's
/// "Career-group workload pairwise" row): the diagnostics record has no
/// separate key for those, so `team_a`/`team_b` hold career-group aliases
/// in that case. See `DESIGN.md`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamWorkloadGap {
    pub team_a: String,
    pub team_b: String,
    pub difference: u32,
    pub tolerance: u32,
}

/// Two employees of the same team have off-day counts differing by more
/// than `tolerance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffBalanceGap {
    pub team_id: String,
    pub employee_a: String,
    pub employee_b: String,
    pub difference: u32,
    pub tolerance: u32,
}

/// A same-shift-repetition, night-intensive-pattern, rest-after-night, or
/// per-employee shift-type-balance break. `shift_type` is `"N->D"`/`"N->E"`
/// for rest-after-night entries and `"D/E"`-style for shift-type-balance
/// entries (no separate diagnostics key exists for that family either; see
/// `DESIGN.md`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPatternBreak {
    pub employee_id: String,
    pub shift_type: String,
    pub start_date: NaiveDate,
    pub window: u32,
    pub excess: u32,
}

/// A special request whose shift code was not honored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialRequestMissed {
    pub date: NaiveDate,
    pub shift_type: String,
    pub employee_id: String,
}

/// A `teamPattern.avoidPatterns` sequence that appeared anyway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvoidPatternViolation {
    pub employee_id: String,
    pub start_date: NaiveDate,
    pub pattern: Vec<String>,
}

/// Structural-feasibility findings produced before any model is built
/// (`spec.md` §4.1), plus the multi-run summary annotation appended by the
/// orchestrator (`spec.md` §4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PreflightIssue {
    OffRequirementImpossible {
        employee_id: String,
        required_off_days: u32,
        available_days: u32,
    },
    InsufficientPotentialStaff {
        date: NaiveDate,
        shift_type: String,
        required: u32,
        available: u32,
    },
    TeamCoverageImpossible {
        date: NaiveDate,
        shift_type: String,
        team_id: String,
    },
    CareerGroupCoverageImpossible {
        date: NaiveDate,
        shift_type: String,
        career_group_alias: String,
    },
    SpecialRequestPatternConflict {
        employee_id: String,
        date: NaiveDate,
        requested_shift: String,
        work_pattern_type: crate::employee::WorkPatternType,
    },
    SpecialRequestUnknownEmployee {
        employee_id: String,
        date: NaiveDate,
    },
    SpecialRequestInvalidDate {
        employee_id: String,
        raw_date: String,
    },
    MultiRunSummary {
        attempts: u32,
        seed: u64,
        jitter_pct: f64,
        best_attempt: u32,
        best_penalty: f64,
    },
}

/// The outcome classification of a single solver attempt (`spec.md` §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverStatus {
    Optimal,
    Feasible,
    Timeout,
    Cancelled,
    Infeasible,
    Error,
}

/// Postprocessor output stats (`spec.md` §4.6 "Output stats").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostprocessStats {
    pub initial_penalty: f64,
    pub final_penalty: f64,
    pub iterations: u32,
    pub improvements: u32,
    pub accepted_worse: u32,
    pub temperature: f64,
}

/// The full diagnostics record threaded between solver, postprocessor, and
/// caller (`spec.md` §4.5). Always re-derived from the current `Assignment`
/// set, never stale (I5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    #[serde(default)]
    pub staffing_shortages: Vec<StaffingShortage>,
    #[serde(default)]
    pub team_coverage_gaps: Vec<TeamCoverageGap>,
    #[serde(default)]
    pub career_group_coverage_gaps: Vec<CareerGroupCoverageGap>,
    #[serde(default)]
    pub team_workload_gaps: Vec<TeamWorkloadGap>,
    #[serde(default)]
    pub off_balance_gaps: Vec<OffBalanceGap>,
    #[serde(default)]
    pub shift_pattern_breaks: Vec<ShiftPatternBreak>,
    #[serde(default)]
    pub special_request_misses: Vec<SpecialRequestMissed>,
    #[serde(default)]
    pub avoid_pattern_violations: Vec<AvoidPatternViolation>,
    #[serde(default)]
    pub preflight_issues: Vec<PreflightIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postprocess: Option<PostprocessStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_status: Option<SolverStatus>,
    #[serde(default)]
    pub solver_timed_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_wall_time_ms: Option<u64>,
}

impl Diagnostics {
    /// True when every violation category (not counting preflight issues or
    /// postprocess stats) is empty.
    pub fn is_clean(&self) -> bool {
        self.staffing_shortages.is_empty()
            && self.team_coverage_gaps.is_empty()
            && self.career_group_coverage_gaps.is_empty()
            && self.team_workload_gaps.is_empty()
            && self.off_balance_gaps.is_empty()
            && self.shift_pattern_breaks.is_empty()
            && self.special_request_misses.is_empty()
            && self.avoid_pattern_violations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_diagnostics_is_clean() {
        assert!(Diagnostics::default().is_clean());
    }

    #[test]
    fn non_empty_category_is_not_clean() {
        let mut diag = Diagnostics::default();
        diag.staffing_shortages.push(StaffingShortage {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            shift_type: "D".into(),
            required: 5,
            covered: 4,
            shortage: 1,
        });
        assert!(!diag.is_clean());
    }

    #[test]
    fn preflight_issue_tags_serialize_with_type_field() {
        let issue = PreflightIssue::SpecialRequestUnknownEmployee {
            employee_id: "ghost".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("\"type\":\"specialRequestUnknownEmployee\""));
    }
}
