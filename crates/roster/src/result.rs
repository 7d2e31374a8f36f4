//! The result payload schema of `spec.md` §6: `ScheduleResult` (the `result`
//! object inside the external job-polling response), its flattened
//! `Violation` list, the `score` summary, and `offAccruals`.
//!
//! The HTTP job envelope itself (`id`, `status`, `error`, timestamps) is an
//! out-of-scope external collaborator (`spec.md` §1); this crate only
//! builds the `result`/`bestResult` payload the core is responsible for.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use roster_core::{Assignment, Diagnostics, PostprocessStats, SolverStatus};

/// One flattened, tagged violation entry (`spec.md` §6 "Violation
/// records"). This is a reporting-friendly projection of [`Diagnostics`];
/// `avoidPatternViolations` and `preflightIssues` are carried in full only
/// inside `diagnostics`, matching the seven kinds the spec's payload
/// schema names here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Violation {
    StaffingShortage {
        date: NaiveDate,
        shift_type: String,
        required: u32,
        covered: u32,
        shortage: u32,
    },
    TeamCoverageGap {
        date: NaiveDate,
        shift_type: String,
        team_id: String,
        shortage: u32,
    },
    CareerGroupCoverageGap {
        date: NaiveDate,
        shift_type: String,
        career_group_alias: String,
        shortage: u32,
    },
    TeamWorkloadGap {
        team_a: String,
        team_b: String,
        difference: u32,
        tolerance: u32,
    },
    OffBalanceGap {
        team_id: String,
        employee_a: String,
        employee_b: String,
        difference: u32,
        tolerance: u32,
    },
    ShiftPatternBreak {
        employee_id: String,
        shift_type: String,
        start_date: NaiveDate,
        window: u32,
        excess: u32,
    },
    SpecialRequestMissed {
        date: NaiveDate,
        shift_type: String,
        employee_id: String,
    },
}

/// Flattens a [`Diagnostics`] record's per-kind vectors into the single
/// tagged list `spec.md` §6 calls `violations`, in the same category order
/// as the diagnostics record itself.
pub fn flatten_violations(diagnostics: &Diagnostics) -> Vec<Violation> {
    let mut violations = Vec::new();
    for s in &diagnostics.staffing_shortages {
        violations.push(Violation::StaffingShortage {
            date: s.date,
            shift_type: s.shift_type.clone(),
            required: s.required,
            covered: s.covered,
            shortage: s.shortage,
        });
    }
    for g in &diagnostics.team_coverage_gaps {
        violations.push(Violation::TeamCoverageGap {
            date: g.date,
            shift_type: g.shift_type.clone(),
            team_id: g.team_id.clone(),
            shortage: g.shortage,
        });
    }
    for g in &diagnostics.career_group_coverage_gaps {
        violations.push(Violation::CareerGroupCoverageGap {
            date: g.date,
            shift_type: g.shift_type.clone(),
            career_group_alias: g.career_group_alias.clone(),
            shortage: g.shortage,
        });
    }
    for g in &diagnostics.team_workload_gaps {
        violations.push(Violation::TeamWorkloadGap {
            team_a: g.team_a.clone(),
            team_b: g.team_b.clone(),
            difference: g.difference,
            tolerance: g.tolerance,
        });
    }
    for g in &diagnostics.off_balance_gaps {
        violations.push(Violation::OffBalanceGap {
            team_id: g.team_id.clone(),
            employee_a: g.employee_a.clone(),
            employee_b: g.employee_b.clone(),
            difference: g.difference,
            tolerance: g.tolerance,
        });
    }
    for b in &diagnostics.shift_pattern_breaks {
        violations.push(Violation::ShiftPatternBreak {
            employee_id: b.employee_id.clone(),
            shift_type: b.shift_type.clone(),
            start_date: b.start_date,
            window: b.window,
            excess: b.excess,
        });
    }
    for m in &diagnostics.special_request_misses {
        violations.push(Violation::SpecialRequestMissed {
            date: m.date,
            shift_type: m.shift_type.clone(),
            employee_id: m.employee_id.clone(),
        });
    }
    violations
}

/// One term of the score breakdown: a named penalty family and the share
/// of the objective it contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdownEntry {
    pub category: String,
    pub penalty: f64,
}

/// The `score` block of `spec.md` §6's result payload: a 0-100 summary
/// scaled down from the diagnostics record, plus a per-family breakdown.
///
/// Each sub-score is a simple, explainable projection of diagnostics
/// counts (see `DESIGN.md` — the original implementation left this block
/// a hardcoded constant; this is a modest, literal reading of what each
/// name should mean given the diagnostics actually collected).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total: f64,
    pub fairness: f64,
    pub preference: f64,
    pub coverage: f64,
    pub constraint_satisfaction: f64,
    pub breakdown: Vec<ScoreBreakdownEntry>,
}

/// One employee's guaranteed-vs-actual off-day accounting (`spec.md` §6
/// `offAccruals`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffAccrual {
    pub employee_id: String,
    pub guaranteed_off_days: i64,
    pub actual_off_days: i64,
    pub extra_off_days: i64,
}

/// The `generationResult` object of `spec.md` §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub computation_time: u64,
    pub solve_status: SolverStatus,
    pub solver_timed_out: bool,
    pub violations: Vec<Violation>,
    pub score: ScoreSummary,
    pub off_accruals: Vec<OffAccrual>,
    pub diagnostics: Diagnostics,
    pub postprocess: Option<PostprocessStats>,
}

/// The full `result` payload of `spec.md` §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub assignments: Vec<Assignment>,
    pub generation_result: GenerationResult,
}
