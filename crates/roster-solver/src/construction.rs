//! Greedy construction heuristic building the initial assignment grid
//! (`spec.md` §4.2, §4.4).
//!
//! There is no MIP/CP-SAT crate in the teacher's dependency stack, so this
//! plays the role the original's `cpsat_solver.py` variable-domain
//! restriction plays (cell eligibility is still hard-filtered through
//! [`roster_core::shift_code::is_shift_allowed`], special-request isolation,
//! avoid-patterns, and the consecutive-day/night caps) while the actual
//! per-cell choice is a one-pass greedy fill rather than a MIP solve. The
//! result is then handed to [`crate::backend::ConstructionLocalSearchBackend`]
//! for a short best-improvement polish before the postprocessor takes over.
//!
//! Special requests are *not* forced: the original models them with a slack
//! variable (`model.Add(var + slack >= 1)`), i.e. a heavily-weighted soft
//! target, not a hard pre-assignment. This heuristic honors a request
//! whenever the requested code is legal for that cell, but falls back
//! silently otherwise — the miss shows up in `Diagnostics.specialRequestMisses`.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use roster_core::{Assignment, Employee, ScheduleInput};

use crate::hard_constraints;

/// Codes that appear in the active alphabet only because a special request
/// named them — not because any shift requires staffing on them and not
/// `O`/`A`. Mirrors `_restrict_special_only_shifts` in the original: these
/// codes are only legal in the exact `(employee, date)` cell that requested
/// them.
fn special_only_codes(input: &ScheduleInput, alphabet: &[String]) -> HashSet<String> {
    let required = input.required_staff_map();
    alphabet
        .iter()
        .filter(|c| c.as_str() != "O" && c.as_str() != "A")
        .filter(|c| required.get(c.as_str()).copied().unwrap_or(0) == 0)
        .cloned()
        .collect()
}

fn requested_codes(input: &ScheduleInput) -> HashMap<(String, NaiveDate), String> {
    let mut map = HashMap::new();
    if let Some(requests) = &input.special_requests {
        for req in requests {
            if let Some(code) = req.normalized_code() {
                map.insert((req.employee_id.clone(), req.date), code);
            }
        }
    }
    map
}

pub(crate) fn shift_id_for_code(input: &ScheduleInput, code: &str) -> String {
    input
        .shifts
        .iter()
        .find(|s| s.resolved_code() == code)
        .map(|s| s.id.clone())
        .unwrap_or_else(|| code.to_string())
}

struct Candidate {
    code: String,
    score: f64,
}

#[allow(clippy::too_many_arguments)]
fn pick_code(
    input: &ScheduleInput,
    employee: &Employee,
    day: NaiveDate,
    holidays: &HashSet<NaiveDate>,
    alphabet: &[String],
    special_only: &HashSet<String>,
    requested: &HashMap<(String, NaiveDate), String>,
    day_counts: &HashMap<String, u32>,
    required: &HashMap<String, u32>,
    off_target: &HashMap<String, u32>,
    off_so_far: u32,
    days_left: u32,
    history: &[&str],
) -> (String, bool) {
    let legal: Vec<&str> = alphabet
        .iter()
        .map(String::as_str)
        .filter(|c| roster_core::shift_code::is_shift_allowed(employee, day, c, holidays))
        .filter(|c| {
            !special_only.contains(*c)
                || requested.get(&(employee.id.clone(), day)).map(String::as_str) == Some(*c)
        })
        .collect();

    if let Some(req_code) = requested.get(&(employee.id.clone(), day)) {
        if legal.contains(&req_code.as_str()) {
            return (req_code.clone(), true);
        }
    }

    if let Some(&target) = off_target.get(&employee.id) {
        let remaining_needed = target.saturating_sub(off_so_far);
        if remaining_needed >= days_left && legal.contains(&"O") {
            return ("O".to_string(), false);
        }
    }

    let filtered: Vec<&str> = legal
        .iter()
        .copied()
        .filter(|c| {
            !hard_constraints::would_complete_avoid_pattern(input, history, c)
                && !hard_constraints::would_break_consecutive_days_cap(employee, history, c)
                && !hard_constraints::would_break_consecutive_nights_cap(employee, history, c)
        })
        .collect();
    let pool: &[&str] = if filtered.is_empty() { &legal } else { &filtered };

    let mut candidates: Vec<Candidate> = pool
        .iter()
        .map(|&code| {
            let required_count = required.get(code).copied().unwrap_or(0) as i64;
            let assigned_count = day_counts.get(code).copied().unwrap_or(0) as i64;
            let shortfall = (required_count - assigned_count).max(0) as f64;
            let overstaff = (assigned_count - required_count).max(0) as f64;
            let preference = employee.preference_weight(code) * 10.0;
            let off_pressure = if code == "O" {
                off_target
                    .get(&employee.id)
                    .map(|&target| {
                        let remaining_needed = target.saturating_sub(off_so_far) as f64;
                        remaining_needed / days_left.max(1) as f64 * 50.0
                    })
                    .unwrap_or(0.0)
            } else {
                0.0
            };
            Candidate {
                code: code.to_string(),
                score: shortfall * 100.0 + preference + off_pressure - overstaff * 5.0,
            }
        })
        .collect();
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.code.cmp(&b.code))
    });

    match candidates.into_iter().next() {
        Some(best) => {
            let locked = best.code == "V";
            (best.code, locked)
        }
        // No legal code at all (structurally infeasible cell); fall back to
        // off so the one-assignment-per-slot invariant still holds.
        None => ("O".to_string(), false),
    }
}

/// Builds a complete initial assignment grid: exactly one assignment per
/// `(employee, date)` slot (P1), respecting the allowed-shift relation (P2)
/// and special-request isolation, and best-effort respecting avoid-patterns
/// and the consecutive-day/night caps.
pub fn construct(input: &ScheduleInput) -> Vec<Assignment> {
    let dates = input.date_range();
    let holidays = input.holiday_set();
    let alphabet = roster_scoring::shared::active_alphabet(input);
    let required = input.required_staff_map();
    let special_only = special_only_codes(input, &alphabet);
    let requested = requested_codes(input);
    let off_target = roster_scoring::shared::required_off_days(input);

    let mut employees: Vec<&Employee> = input.employees.iter().collect();
    employees.sort_by(|a, b| a.id.cmp(&b.id));

    let mut history: HashMap<String, Vec<String>> = HashMap::new();
    let mut off_so_far: HashMap<String, u32> = HashMap::new();
    let mut assignments = Vec::with_capacity(dates.len() * employees.len());

    for (day_idx, &day) in dates.iter().enumerate() {
        let days_left = (dates.len() - day_idx) as u32;
        let mut day_counts: HashMap<String, u32> = HashMap::new();

        for &employee in &employees {
            let hist_owned = history.entry(employee.id.clone()).or_default();
            let hist_refs: Vec<&str> = hist_owned.iter().map(String::as_str).collect();
            let so_far = off_so_far.get(&employee.id).copied().unwrap_or(0);

            let (code, locked) = pick_code(
                input,
                employee,
                day,
                &holidays,
                &alphabet,
                &special_only,
                &requested,
                &day_counts,
                &required,
                &off_target,
                so_far,
                days_left,
                &hist_refs,
            );

            *day_counts.entry(code.clone()).or_insert(0) += 1;
            if code == "O" || code == "V" {
                *off_so_far.entry(employee.id.clone()).or_insert(0) += 1;
            }
            history
                .get_mut(&employee.id)
                .expect("entry inserted above")
                .push(code.clone());

            let shift_id = shift_id_for_code(input, &code);
            assignments.push(Assignment::new(employee.id.clone(), day, shift_id, code, locked));
        }
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{Options, WorkPatternType};

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

    fn input() -> ScheduleInput {
        ScheduleInput {
            department_id: "dept".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            employees: vec![
                employee("e1", WorkPatternType::ThreeShift),
                employee("e2", WorkPatternType::ThreeShift),
                employee("e3", WorkPatternType::ThreeShift),
                employee("e4", WorkPatternType::WeekdayOnly),
            ],
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
    fn assigns_exactly_one_code_per_employee_per_day() {
        let input = input();
        let assignments = construct(&input);
        assert_eq!(assignments.len(), input.date_range().len() * input.employees.len());
        for emp in &input.employees {
            for day in input.date_range() {
                let count = assignments
                    .iter()
                    .filter(|a| a.employee_id == emp.id && a.date == day)
                    .count();
                assert_eq!(count, 1, "expected exactly one assignment for {} on {}", emp.id, day);
            }
        }
    }

    #[test]
    fn respects_allowed_shift_relation_for_weekday_only() {
        let input = input();
        let assignments = construct(&input);
        let holidays = input.holiday_set();
        for a in assignments.iter().filter(|a| a.employee_id == "e4") {
            let emp = input.employees.iter().find(|e| e.id == "e4").unwrap();
            assert!(roster_core::shift_code::is_shift_allowed(emp, a.date, &a.shift_type, &holidays));
        }
    }

    #[test]
    fn honors_legal_special_request_and_locks_it() {
        let mut input = input();
        input.special_requests = Some(vec![roster_core::SpecialRequest {
            employee_id: "e1".into(),
            date: input.start_date,
            request_type: "shift".into(),
            shift_type_code: Some("N".into()),
        }]);
        let assignments = construct(&input);
        let found = assignments
            .iter()
            .find(|a| a.employee_id == "e1" && a.date == input.start_date)
            .unwrap();
        assert_eq!(found.shift_type, "N");
        assert!(found.is_locked);
    }
}
