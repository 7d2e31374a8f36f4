//! Sequence-dependent hard constraints consulted by the construction
//! heuristic (`spec.md` §4.2 hard-constraints table: avoid patterns,
//! consecutive-working-days cap, consecutive-nights cap).
//!
//! These are enforced only at construction time, matching the original
//! implementation's CP-SAT model (`cpsat_solver.py`'s
//! `_add_consecutive_constraints` / `_add_avoid_pattern_constraints` add
//! them once, at model-build time). The postprocessor's swap moves do not
//! re-check them — it only re-checks the allowed-shift relation, same as
//! the original's `ScheduleState._is_shift_allowed` — so a swap can in
//! principle reintroduce one of these patterns; `roster-scoring::evaluator`
//! still reports `avoidPatternViolations` defensively for whatever slips
//! through.

use roster_core::{Employee, ScheduleInput};

/// True if appending `code` for `employee` on the day at `history[history.len()]`
/// (i.e. `history` holds the codes already chosen for the preceding days in
/// order) would complete one of `input`'s `avoidPatterns` sequences.
pub fn would_complete_avoid_pattern(input: &ScheduleInput, history: &[&str], code: &str) -> bool {
    let Some(team_pattern) = &input.team_pattern else {
        return false;
    };
    let Some(avoid_patterns) = &team_pattern.avoid_patterns else {
        return false;
    };
    for pattern in avoid_patterns {
        let normalized: Vec<String> = pattern
            .iter()
            .map(|c| roster_core::shift_code::normalize(c))
            .filter(|c| !c.is_empty())
            .collect();
        if normalized.is_empty() || normalized.len() > history.len() + 1 {
            continue;
        }
        let prefix_len = normalized.len() - 1;
        let suffix = &history[history.len() - prefix_len..];
        let prefix_matches = suffix
            .iter()
            .zip(&normalized[..prefix_len])
            .all(|(have, want)| *have == want.as_str());
        if prefix_matches && normalized[prefix_len] == code {
            return true;
        }
    }
    false
}

/// True if appending `code` would push the trailing run of worked
/// (non-off) days beyond `employee.maxConsecutiveDaysPreferred`.
pub fn would_break_consecutive_days_cap(employee: &Employee, history: &[&str], code: &str) -> bool {
    let Some(cap) = employee.max_consecutive_days_preferred else {
        return false;
    };
    if is_off_code(code) {
        return false;
    }
    let mut run = 1u32;
    for &past in history.iter().rev() {
        if is_off_code(past) {
            break;
        }
        run += 1;
    }
    run > cap
}

/// True if appending `code` would push the trailing run of `N` assignments
/// beyond `employee.maxConsecutiveNightsPreferred`.
pub fn would_break_consecutive_nights_cap(employee: &Employee, history: &[&str], code: &str) -> bool {
    let Some(cap) = employee.max_consecutive_nights_preferred else {
        return false;
    };
    if code != "N" {
        return false;
    }
    let mut run = 1u32;
    for &past in history.iter().rev() {
        if past != "N" {
            break;
        }
        run += 1;
    }
    run > cap
}

fn is_off_code(code: &str) -> bool {
    matches!(code, "O" | "V")
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{Employee, SpecialRequest, TeamPattern, WorkPatternType};
    use std::collections::HashMap;

    fn employee() -> Employee {
        Employee {
            id: "e1".into(),
            team_id: None,
            work_pattern_type: WorkPatternType::ThreeShift,
            career_group_alias: None,
            preferred_shift_types: HashMap::new(),
            max_consecutive_days_preferred: None,
            max_consecutive_nights_preferred: None,
        }
    }

    fn input_with_avoid(patterns: Vec<Vec<&str>>) -> ScheduleInput {
        use chrono::NaiveDate;
        use roster_core::Options;
        ScheduleInput {
            department_id: "dept".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            employees: vec![],
            shifts: vec![],
            special_requests: None::<Vec<SpecialRequest>>,
            holidays: None,
            team_pattern: Some(TeamPattern {
                pattern: vec![],
                avoid_patterns: Some(
                    patterns
                        .into_iter()
                        .map(|p| p.into_iter().map(str::to_string).collect())
                        .collect(),
                ),
            }),
            required_staff_per_shift: None,
            previous_off_accruals: HashMap::new(),
            night_intensive_paid_leave_days: None,
            career_groups: None,
            alias_maps: None,
            options: Options::default(),
        }
    }

    #[test]
    fn detects_completion_of_avoid_pattern() {
        let input = input_with_avoid(vec![vec!["N", "D"]]);
        assert!(would_complete_avoid_pattern(&input, &["N"], "D"));
        assert!(!would_complete_avoid_pattern(&input, &["N"], "O"));
        assert!(!would_complete_avoid_pattern(&input, &["D"], "D"));
    }

    #[test]
    fn consecutive_days_cap_triggers_after_run() {
        let mut emp = employee();
        emp.max_consecutive_days_preferred = Some(2);
        assert!(!would_break_consecutive_days_cap(&emp, &["D"], "D"));
        assert!(would_break_consecutive_days_cap(&emp, &["D", "D"], "D"));
        assert!(!would_break_consecutive_days_cap(&emp, &["D", "O"], "D"));
    }

    #[test]
    fn consecutive_nights_cap_only_applies_to_n() {
        let mut emp = employee();
        emp.max_consecutive_nights_preferred = Some(1);
        assert!(!would_break_consecutive_nights_cap(&emp, &["N"], "D"));
        assert!(would_break_consecutive_nights_cap(&emp, &["N"], "N"));
    }
}
