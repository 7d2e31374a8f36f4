//! Structural-feasibility checks run before any model is built
//! (`spec.md` §4.1).

use roster_core::{PreflightIssue, ScheduleInput};

use crate::shared;

/// Runs every preflight check against `input` and returns the append-only
/// list of structural-issue records. Never aborts; callers weave these into
/// the returned diagnostics so the relaxation ladder and user-facing
/// guidance can react.
pub fn analyze(input: &ScheduleInput) -> Vec<PreflightIssue> {
    let mut issues = Vec::new();

    check_off_requirements(input, &mut issues);
    check_staffing_and_coverage(input, &mut issues);
    check_special_requests(input, &mut issues);

    for issue in &issues {
        tracing::warn!(?issue, "preflight issue recorded");
    }
    issues
}

fn check_off_requirements(input: &ScheduleInput, issues: &mut Vec<PreflightIssue>) {
    let required_off = shared::required_off_days(input);
    let window = shared::window_days(input);
    for emp in &input.employees {
        if let Some(&target) = required_off.get(&emp.id) {
            if target > window {
                issues.push(PreflightIssue::OffRequirementImpossible {
                    employee_id: emp.id.clone(),
                    required_off_days: target,
                    available_days: window,
                });
            }
        }
    }
}

fn check_staffing_and_coverage(input: &ScheduleInput, issues: &mut Vec<PreflightIssue>) {
    let required = input.required_staff_map();
    let coverage_codes = shared::team_coverage_codes(input);
    let team_ids = shared::team_ids(input);
    let career_groups = shared::career_group_aliases(input);
    let holidays = input.holiday_set();

    for day in input.date_range() {
        for (code, &min_required) in required.iter().filter(|(_, &v)| v > 0) {
            let available = shared::eligible_count(input, day, code);
            if available < min_required {
                issues.push(PreflightIssue::InsufficientPotentialStaff {
                    date: day,
                    shift_type: code.clone(),
                    required: min_required,
                    available,
                });
            }

            if !coverage_codes.contains(code) {
                continue;
            }
            for team_id in &team_ids {
                let team_available = input
                    .employees
                    .iter()
                    .filter(|e| e.team_id.as_deref() == Some(team_id.as_str()))
                    .filter(|e| roster_core::shift_code::is_shift_allowed(e, day, code, &holidays))
                    .count();
                if team_available == 0 {
                    issues.push(PreflightIssue::TeamCoverageImpossible {
                        date: day,
                        shift_type: code.clone(),
                        team_id: team_id.clone(),
                    });
                }
            }
            for alias in &career_groups {
                let group_available = input
                    .employees
                    .iter()
                    .filter(|e| e.career_group_alias.as_deref() == Some(alias.as_str()))
                    .filter(|e| roster_core::shift_code::is_shift_allowed(e, day, code, &holidays))
                    .count();
                if group_available == 0 {
                    issues.push(PreflightIssue::CareerGroupCoverageImpossible {
                        date: day,
                        shift_type: code.clone(),
                        career_group_alias: alias.clone(),
                    });
                }
            }
        }
    }
}

fn check_special_requests(input: &ScheduleInput, issues: &mut Vec<PreflightIssue>) {
    let holidays = input.holiday_set();
    let Some(requests) = &input.special_requests else {
        return;
    };
    for req in requests {
        let Some(code) = req.normalized_code() else {
            continue;
        };
        let Some(emp) = shared::employee_by_id(input, &req.employee_id) else {
            issues.push(PreflightIssue::SpecialRequestUnknownEmployee {
                employee_id: req.employee_id.clone(),
                date: req.date,
            });
            continue;
        };
        if !roster_core::shift_code::is_shift_allowed(emp, req.date, &code, &holidays) {
            issues.push(PreflightIssue::SpecialRequestPatternConflict {
                employee_id: emp.id.clone(),
                date: req.date,
                requested_shift: code,
                work_pattern_type: emp.work_pattern_type,
            });
        }
    }
}
