//! Per-constraint evaluation: turns a concrete `Assignment` set into a
//! [`Diagnostics`] record and the weighted [`ObjectiveScore`] the primary
//! solver driver's local search minimizes (`spec.md` §4.2).
//!
//! This is deliberately a different scale from the postprocessor's own
//! penalty function (`spec.md` §4.6, implemented in `roster-solver`): this
//! module sums slack *magnitude* × weight, matching the MIP/CP objective
//! table; the postprocessor instead counts violation *records*. The two
//! are never unified.

use std::collections::HashMap;

use chrono::NaiveDate;
use roster_core::{
    Assignment, AvoidPatternViolation, CareerGroupCoverageGap, ConstraintWeights, Diagnostics,
    ObjectiveScore, OffBalanceGap, ScheduleInput, ShiftPatternBreak, SpecialRequestMissed,
    StaffingShortage, TeamCoverageGap, TeamWorkloadGap, WorkPatternType,
};

use crate::shared;

/// An index over `assignments` keyed by `(employee_id, date)` for O(1)
/// lookup during evaluation.
struct AssignmentIndex<'a> {
    by_employee_date: HashMap<(&'a str, NaiveDate), &'a Assignment>,
}

impl<'a> AssignmentIndex<'a> {
    fn build(assignments: &'a [Assignment]) -> Self {
        let mut by_employee_date = HashMap::with_capacity(assignments.len());
        for a in assignments {
            by_employee_date.insert((a.employee_id.as_str(), a.date), a);
        }
        AssignmentIndex { by_employee_date }
    }

    fn code_at(&self, employee_id: &str, date: NaiveDate) -> Option<&str> {
        self.by_employee_date
            .get(&(employee_id, date))
            .map(|a| a.shift_type.as_str())
    }
}

/// Evaluates `assignments` against `input`, returning the weighted
/// objective score and the full diagnostics record.
pub fn evaluate(input: &ScheduleInput, assignments: &[Assignment]) -> (ObjectiveScore, Diagnostics) {
    let index = AssignmentIndex::build(assignments);
    let weights = input.options.constraint_weights.floored();
    let mut diagnostics = Diagnostics::default();
    let mut penalty = 0.0;

    penalty += staffing(input, &index, &weights, &mut diagnostics);
    penalty += team_and_career_coverage(input, &index, &weights, &mut diagnostics);
    penalty += team_workload(input, &index, &weights, &mut diagnostics);
    penalty += career_group_workload(input, &index, &weights, &mut diagnostics);
    penalty += off_balance(input, &index, &weights, &mut diagnostics);
    penalty += shift_repeat_and_night_patterns(input, &index, &weights, &mut diagnostics);
    penalty += rest_after_night(input, &index, &weights, &mut diagnostics);
    penalty += shift_type_balance(input, &index, &weights, &mut diagnostics);
    penalty += special_request_misses(input, &index, &mut diagnostics);
    penalty += avoid_patterns(input, &index, &mut diagnostics);
    penalty += preference_penalty(input, &index);

    (ObjectiveScore::of_penalty(penalty.round() as i64), diagnostics)
}

fn staffing(
    input: &ScheduleInput,
    index: &AssignmentIndex,
    weights: &ConstraintWeights,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let required = input.required_staff_map();
    let mut penalty = 0.0;
    for day in input.date_range() {
        for (code, &min_required) in required.iter().filter(|(_, &v)| v > 0) {
            let covered = input
                .employees
                .iter()
                .filter(|e| index.code_at(&e.id, day) == Some(code.as_str()))
                .count() as u32;
            if covered < min_required {
                let shortage = min_required - covered;
                diagnostics.staffing_shortages.push(StaffingShortage {
                    date: day,
                    shift_type: code.clone(),
                    required: min_required,
                    covered,
                    shortage,
                });
                penalty += shortage as f64 * 1000.0 * weights.staffing;
            }
        }
    }
    penalty
}

fn team_and_career_coverage(
    input: &ScheduleInput,
    index: &AssignmentIndex,
    weights: &ConstraintWeights,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let coverage_codes = shared::team_coverage_codes(input);
    let team_ids = shared::team_ids(input);
    let career_groups = shared::career_group_aliases(input);
    let holidays = input.holiday_set();
    let mut penalty = 0.0;

    for day in input.date_range() {
        for code in &coverage_codes {
            for team_id in &team_ids {
                let eligible: Vec<_> = input
                    .employees
                    .iter()
                    .filter(|e| e.team_id.as_deref() == Some(team_id.as_str()))
                    .filter(|e| roster_core::shift_code::is_shift_allowed(e, day, code, &holidays))
                    .collect();
                if eligible.is_empty() {
                    continue;
                }
                let covered = eligible
                    .iter()
                    .any(|e| index.code_at(&e.id, day) == Some(code.as_str()));
                if !covered {
                    diagnostics.team_coverage_gaps.push(TeamCoverageGap {
                        date: day,
                        shift_type: code.clone(),
                        team_id: team_id.clone(),
                        shortage: 1,
                    });
                    penalty += 500.0 * weights.team_balance;
                }
            }
            for alias in &career_groups {
                let eligible: Vec<_> = input
                    .employees
                    .iter()
                    .filter(|e| e.career_group_alias.as_deref() == Some(alias.as_str()))
                    .filter(|e| roster_core::shift_code::is_shift_allowed(e, day, code, &holidays))
                    .collect();
                if eligible.is_empty() {
                    continue;
                }
                let covered = eligible
                    .iter()
                    .any(|e| index.code_at(&e.id, day) == Some(code.as_str()));
                if !covered {
                    diagnostics
                        .career_group_coverage_gaps
                        .push(CareerGroupCoverageGap {
                            date: day,
                            shift_type: code.clone(),
                            career_group_alias: alias.clone(),
                            shortage: 1,
                        });
                    penalty += 450.0 * weights.career_balance;
                }
            }
        }
    }
    penalty
}

/// Total worked-shift count (excluding `O`/`A`) for every employee in
/// `group` over the whole window.
fn group_totals<'a>(
    input: &'a ScheduleInput,
    index: &AssignmentIndex,
    group_of: impl Fn(&'a roster_core::Employee) -> Option<&'a str>,
    excluded: &std::collections::HashSet<String>,
) -> HashMap<String, u32> {
    let mut totals: HashMap<String, u32> = HashMap::new();
    let dates = input.date_range();
    for emp in &input.employees {
        let Some(group) = group_of(emp) else { continue };
        let entry = totals.entry(group.to_string()).or_insert(0);
        for day in &dates {
            if let Some(code) = index.code_at(&emp.id, *day) {
                if !excluded.contains(code) {
                    *entry += 1;
                }
            }
        }
    }
    totals
}

fn team_workload(
    input: &ScheduleInput,
    index: &AssignmentIndex,
    weights: &ConstraintWeights,
    diagnostics: &mut Diagnostics,
) -> f64 {
    const TOLERANCE: u32 = 2;
    let excluded: std::collections::HashSet<String> =
        ["O".to_string(), "A".to_string()].into_iter().collect();
    let totals = group_totals(input, index, |e| e.team_id.as_deref(), &excluded);
    let team_ids = shared::team_ids(input);
    let mut penalty = 0.0;

    for i in 0..team_ids.len() {
        for j in (i + 1)..team_ids.len() {
            let total_i = *totals.get(&team_ids[i]).unwrap_or(&0);
            let total_j = *totals.get(&team_ids[j]).unwrap_or(&0);
            let (hi, lo, hi_id, lo_id) = if total_i >= total_j {
                (total_i, total_j, &team_ids[i], &team_ids[j])
            } else {
                (total_j, total_i, &team_ids[j], &team_ids[i])
            };
            let diff = hi - lo;
            if diff > TOLERANCE {
                diagnostics.team_workload_gaps.push(TeamWorkloadGap {
                    team_a: hi_id.clone(),
                    team_b: lo_id.clone(),
                    difference: diff,
                    tolerance: TOLERANCE,
                });
                penalty += 500.0 * weights.team_balance;
            }
        }
    }
    penalty
}

fn career_group_workload(
    input: &ScheduleInput,
    index: &AssignmentIndex,
    weights: &ConstraintWeights,
    diagnostics: &mut Diagnostics,
) -> f64 {
    const TOLERANCE: u32 = 1;
    let excluded = shared::career_group_balance_codes(input);
    let all_codes: std::collections::HashSet<String> = shared::active_alphabet(input).into_iter().collect();
    let complement: std::collections::HashSet<String> =
        all_codes.difference(&excluded).cloned().collect();
    let totals = group_totals(input, index, |e| e.career_group_alias.as_deref(), &complement);
    let aliases = shared::career_group_aliases(input);
    let mut penalty = 0.0;

    for i in 0..aliases.len() {
        for j in (i + 1)..aliases.len() {
            let total_i = *totals.get(&aliases[i]).unwrap_or(&0);
            let total_j = *totals.get(&aliases[j]).unwrap_or(&0);
            let (hi, lo, hi_id, lo_id) = if total_i >= total_j {
                (total_i, total_j, &aliases[i], &aliases[j])
            } else {
                (total_j, total_i, &aliases[j], &aliases[i])
            };
            let diff = hi - lo;
            if diff > TOLERANCE {
                // Folded into TeamWorkloadGap; see its doc comment.
                diagnostics.team_workload_gaps.push(TeamWorkloadGap {
                    team_a: hi_id.clone(),
                    team_b: lo_id.clone(),
                    difference: diff,
                    tolerance: TOLERANCE,
                });
                penalty += 600.0 * weights.career_balance;
            }
        }
    }
    penalty
}

fn off_count(input: &ScheduleInput, index: &AssignmentIndex, employee_id: &str) -> u32 {
    input
        .date_range()
        .into_iter()
        .filter(|day| matches!(index.code_at(employee_id, *day), Some("O") | Some("V")))
        .count() as u32
}

fn off_balance(
    input: &ScheduleInput,
    index: &AssignmentIndex,
    weights: &ConstraintWeights,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let tolerance = input.options.csp_settings.off_tolerance;
    let mut by_team: HashMap<String, Vec<&roster_core::Employee>> = HashMap::new();
    for emp in &input.employees {
        if let Some(team_id) = &emp.team_id {
            by_team.entry(team_id.clone()).or_default().push(emp);
        }
    }
    let mut penalty = 0.0;
    for (team_id, members) in &by_team {
        if members.len() < 2 {
            continue;
        }
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let count_a = off_count(input, index, &members[i].id);
                let count_b = off_count(input, index, &members[j].id);
                let diff = count_a.abs_diff(count_b);
                if diff > tolerance {
                    diagnostics.off_balance_gaps.push(OffBalanceGap {
                        team_id: team_id.clone(),
                        employee_a: members[i].id.clone(),
                        employee_b: members[j].id.clone(),
                        difference: diff,
                        tolerance,
                    });
                    penalty += 800.0 * weights.off_balance;
                }
            }
        }
    }
    penalty
}

fn shift_repeat_and_night_patterns(
    input: &ScheduleInput,
    index: &AssignmentIndex,
    weights: &ConstraintWeights,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let alphabet = shared::active_alphabet(input);
    let max_same_shift = input.options.csp_settings.clamped_max_same_shift();
    let dates = input.date_range();
    let mut penalty = 0.0;

    let window = (max_same_shift + 1) as usize;
    if window <= dates.len() {
        for emp in &input.employees {
            for code in alphabet.iter().filter(|c| c.as_str() != "O") {
                for start in 0..=(dates.len() - window) {
                    let count = dates[start..start + window]
                        .iter()
                        .filter(|d| index.code_at(&emp.id, **d) == Some(code.as_str()))
                        .count() as u32;
                    if count > max_same_shift {
                        let excess = count - max_same_shift;
                        diagnostics.shift_pattern_breaks.push(ShiftPatternBreak {
                            employee_id: emp.id.clone(),
                            shift_type: code.clone(),
                            start_date: dates[start],
                            window: window as u32,
                            excess,
                        });
                        penalty += excess as f64 * 350.0 * weights.shift_pattern;
                    }
                }
            }
        }
    }

    for emp in &input.employees {
        if emp.work_pattern_type != WorkPatternType::NightIntensive {
            continue;
        }
        if dates.len() >= 4 {
            for start in 0..=(dates.len() - 4) {
                let count = dates[start..start + 4]
                    .iter()
                    .filter(|d| index.code_at(&emp.id, **d) == Some("N"))
                    .count() as u32;
                if count > 3 {
                    let excess = count - 3;
                    diagnostics.shift_pattern_breaks.push(ShiftPatternBreak {
                        employee_id: emp.id.clone(),
                        shift_type: "N".into(),
                        start_date: dates[start],
                        window: 4,
                        excess,
                    });
                    penalty += excess as f64 * 350.0 * weights.shift_pattern;
                }
            }
        }
        if dates.len() >= 5 {
            for start in 0..=(dates.len() - 5) {
                let count = dates[start..start + 5]
                    .iter()
                    .filter(|d| index.code_at(&emp.id, **d) == Some("O"))
                    .count() as u32;
                if count < 2 {
                    let excess = 2 - count;
                    diagnostics.shift_pattern_breaks.push(ShiftPatternBreak {
                        employee_id: emp.id.clone(),
                        shift_type: "O".into(),
                        start_date: dates[start],
                        window: 5,
                        excess,
                    });
                    penalty += excess as f64 * 350.0 * weights.shift_pattern;
                }
            }
        }
    }
    penalty
}

fn rest_after_night(
    input: &ScheduleInput,
    index: &AssignmentIndex,
    weights: &ConstraintWeights,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let dates = input.date_range();
    if dates.len() < 2 {
        return 0.0;
    }
    let mut penalty = 0.0;
    for emp in &input.employees {
        for w in dates.windows(2) {
            let (day, next) = (w[0], w[1]);
            if index.code_at(&emp.id, day) != Some("N") {
                continue;
            }
            for early in ["D", "E"] {
                if index.code_at(&emp.id, next) == Some(early) {
                    diagnostics.shift_pattern_breaks.push(ShiftPatternBreak {
                        employee_id: emp.id.clone(),
                        shift_type: format!("N->{early}"),
                        start_date: day,
                        window: 2,
                        excess: 1,
                    });
                    penalty += 500.0 * weights.shift_pattern;
                }
            }
        }
    }
    penalty
}

fn shift_type_balance(
    input: &ScheduleInput,
    index: &AssignmentIndex,
    weights: &ConstraintWeights,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let alphabet: std::collections::HashSet<String> = shared::active_alphabet(input).into_iter().collect();
    let core_shifts: Vec<&str> = ["D", "E", "N"]
        .into_iter()
        .filter(|c| alphabet.contains(*c))
        .collect();
    if core_shifts.len() < 2 {
        return 0.0;
    }
    let tolerance = input.options.csp_settings.clamped_shift_balance_tolerance();
    let dates = input.date_range();
    let mut penalty = 0.0;

    for emp in &input.employees {
        if emp.work_pattern_type != WorkPatternType::ThreeShift {
            continue;
        }
        let counts: HashMap<&str, u32> = core_shifts
            .iter()
            .map(|code| {
                let count = dates
                    .iter()
                    .filter(|d| index.code_at(&emp.id, **d) == Some(*code))
                    .count() as u32;
                (*code, count)
            })
            .collect();
        for i in 0..core_shifts.len() {
            for j in (i + 1)..core_shifts.len() {
                let (a, b) = (core_shifts[i], core_shifts[j]);
                let count_a = counts[a];
                let count_b = counts[b];
                let diff = count_a.abs_diff(count_b);
                if diff > tolerance {
                    let excess = diff - tolerance;
                    diagnostics.shift_pattern_breaks.push(ShiftPatternBreak {
                        employee_id: emp.id.clone(),
                        shift_type: format!("{a}/{b}"),
                        start_date: input.start_date,
                        window: 0,
                        excess,
                    });
                    penalty += excess as f64 * 250.0 * weights.shift_pattern;
                }
            }
        }
    }
    penalty
}

fn special_request_misses(
    input: &ScheduleInput,
    index: &AssignmentIndex,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let Some(requests) = &input.special_requests else {
        return 0.0;
    };
    let mut penalty = 0.0;
    for req in requests {
        let Some(code) = req.normalized_code() else {
            continue;
        };
        if index.code_at(&req.employee_id, req.date) != Some(code.as_str()) {
            diagnostics.special_request_misses.push(SpecialRequestMissed {
                date: req.date,
                shift_type: code,
                employee_id: req.employee_id.clone(),
            });
            penalty += 1200.0;
        }
    }
    penalty
}

fn avoid_patterns(
    input: &ScheduleInput,
    index: &AssignmentIndex,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let Some(team_pattern) = &input.team_pattern else {
        return 0.0;
    };
    let Some(avoid_patterns) = &team_pattern.avoid_patterns else {
        return 0.0;
    };
    let dates = input.date_range();
    let mut penalty = 0.0;
    for pattern in avoid_patterns {
        let normalized: Vec<String> = pattern
            .iter()
            .map(|c| roster_core::shift_code::normalize(c))
            .filter(|c| !c.is_empty())
            .collect();
        if normalized.is_empty() || normalized.len() > dates.len() {
            continue;
        }
        let len = normalized.len();
        for emp in &input.employees {
            for start in 0..=(dates.len() - len) {
                let matches = (0..len).all(|offset| {
                    index.code_at(&emp.id, dates[start + offset]) == Some(normalized[offset].as_str())
                });
                if matches {
                    diagnostics.avoid_pattern_violations.push(AvoidPatternViolation {
                        employee_id: emp.id.clone(),
                        start_date: dates[start],
                        pattern: normalized.clone(),
                    });
                    penalty += 10.0;
                }
            }
        }
    }
    penalty
}

fn preference_penalty(input: &ScheduleInput, index: &AssignmentIndex) -> f64 {
    let pattern_sequence: Vec<String> = input
        .team_pattern
        .as_ref()
        .map(|tp| {
            tp.pattern
                .iter()
                .map(|c| roster_core::shift_code::normalize(c))
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default();
    const TEAM_PATTERN_PENALTY: f64 = 40.0;
    const PREFERENCE_PENALTY_BASE: f64 = 20.0;

    let mut penalty = 0.0;
    for (day_index, day) in input.date_range().into_iter().enumerate() {
        let expected_shift = (!pattern_sequence.is_empty())
            .then(|| pattern_sequence[day_index % pattern_sequence.len()].as_str());
        for emp in &input.employees {
            let Some(code) = index.code_at(&emp.id, day) else {
                continue;
            };
            if let Some(expected) = expected_shift {
                if emp.work_pattern_type == WorkPatternType::ThreeShift && code != expected {
                    penalty += TEAM_PATTERN_PENALTY;
                }
            }
            if !emp.preferred_shift_types.is_empty() {
                if let Some(&weight) = emp.preferred_shift_types.get(code) {
                    let weight = weight.clamp(0.0, 1.0);
                    penalty += (1.0 - weight).max(0.0) * PREFERENCE_PENALTY_BASE;
                }
            }
        }
    }
    penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{Employee, Options, Shift};
    use std::collections::HashMap;

    fn employee(id: &str, pattern: WorkPatternType) -> Employee {
        Employee {
            id: id.into(),
            team_id: None,
            work_pattern_type: pattern,
            career_group_alias: None,
            preferred_shift_types: HashMap::new(),
            max_consecutive_days_preferred: None,
            max_consecutive_nights_preferred: None,
        }
    }

    fn base_input() -> ScheduleInput {
        ScheduleInput {
            department_id: "dept".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            employees: vec![employee("e1", WorkPatternType::ThreeShift), employee("e2", WorkPatternType::ThreeShift)],
            shifts: vec![Shift {
                id: "d".into(),
                code: Some("D".into()),
                name: "Day".into(),
                r#type: None,
                color: None,
                required_staff: 1,
                min_staff: None,
                max_staff: None,
            }],
            special_requests: None,
            holidays: None,
            team_pattern: None,
            required_staff_per_shift: Some(HashMap::from([
                ("D".to_string(), 1),
                ("E".to_string(), 0),
                ("N".to_string(), 0),
            ])),
            previous_off_accruals: HashMap::new(),
            night_intensive_paid_leave_days: None,
            career_groups: None,
            alias_maps: None,
            options: Options::default(),
        }
    }

    #[test]
    fn feasible_schedule_has_zero_penalty() {
        let input = base_input();
        let day = input.start_date;
        let assignments = vec![
            Assignment::new("e1", day, "d", "D", false),
            Assignment::new("e2", day, "o", "O", false),
        ];
        let (score, diagnostics) = evaluate(&input, &assignments);
        assert!(score.is_feasible());
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn staffing_shortage_is_penalized() {
        let input = base_input();
        let day = input.start_date;
        let assignments = vec![
            Assignment::new("e1", day, "o", "O", false),
            Assignment::new("e2", day, "o", "O", false),
        ];
        let (score, diagnostics) = evaluate(&input, &assignments);
        assert!(!score.is_feasible());
        assert_eq!(diagnostics.staffing_shortages.len(), 1);
        assert_eq!(diagnostics.staffing_shortages[0].shortage, 1);
        assert_eq!(score.penalty(), 1000);
    }

    #[test]
    fn special_request_miss_is_penalized() {
        let mut input = base_input();
        input.special_requests = Some(vec![roster_core::SpecialRequest {
            employee_id: "e1".into(),
            date: input.start_date,
            request_type: "shift".into(),
            shift_type_code: Some("E".into()),
        }]);
        let day = input.start_date;
        let assignments = vec![
            Assignment::new("e1", day, "d", "D", false),
            Assignment::new("e2", day, "o", "O", false),
        ];
        let (_, diagnostics) = evaluate(&input, &assignments);
        assert_eq!(diagnostics.special_request_misses.len(), 1);
    }
}
