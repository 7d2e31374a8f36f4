//! Shared helpers computed once per `ScheduleInput` and reused by the
//! preflight analyzer, the per-constraint evaluators, and (for off-day
//! accrual reporting) the facade crate.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use roster_core::{Employee, ScheduleInput, WorkPatternType};

/// The active shift-code alphabet the model builder reasons over
/// (`spec.md` §4.2): every code with positive required staff, `O` always,
/// `A` when any weekday-only employee exists, plus every code named by a
/// special request.
pub fn active_alphabet(input: &ScheduleInput) -> Vec<String> {
    let required = input.required_staff_map();
    let mut codes: HashSet<String> = required
        .iter()
        .filter(|(_, &count)| count > 0)
        .map(|(code, _)| code.clone())
        .collect();
    if input
        .employees
        .iter()
        .any(|e| e.work_pattern_type == WorkPatternType::WeekdayOnly)
    {
        codes.insert("A".to_string());
    }
    codes.insert("O".to_string());
    if let Some(requests) = &input.special_requests {
        for req in requests {
            if let Some(code) = req.normalized_code() {
                codes.insert(code);
            }
        }
    }
    let mut codes: Vec<String> = codes.into_iter().collect();
    codes.sort();
    codes
}

/// Codes eligible for team/career-group coverage (required staff > 0,
/// excluding `O`/`A`), matching `team_coverage_shift_codes` in the original.
pub fn team_coverage_codes(input: &ScheduleInput) -> HashSet<String> {
    input
        .required_staff_map()
        .into_iter()
        .filter(|(code, count)| *count > 0 && code != "O" && code != "A")
        .map(|(code, _)| code)
        .collect()
}

/// Codes counted toward career-group workload balance (required staff > 0,
/// excluding `O`/`A`/`N`), matching `career_group_balance_shift_codes`.
pub fn career_group_balance_codes(input: &ScheduleInput) -> HashSet<String> {
    input
        .required_staff_map()
        .into_iter()
        .filter(|(code, count)| *count > 0 && code != "O" && code != "A" && code != "N")
        .map(|(code, _)| code)
        .collect()
}

/// Distinct team ids among employees that have one, sorted.
pub fn team_ids(input: &ScheduleInput) -> Vec<String> {
    let mut ids: Vec<String> = input
        .employees
        .iter()
        .filter_map(|e| e.team_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    ids.sort();
    ids
}

/// Distinct career-group aliases among employees that have one, sorted.
pub fn career_group_aliases(input: &ScheduleInput) -> Vec<String> {
    let mut aliases: Vec<String> = input
        .employees
        .iter()
        .filter_map(|e| e.career_group_alias.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    aliases.sort();
    aliases
}

/// Number of employees for whom `code` is allowed on `day`.
pub fn eligible_count(input: &ScheduleInput, day: NaiveDate, code: &str) -> u32 {
    let holidays = input.holiday_set();
    input
        .employees
        .iter()
        .filter(|e| roster_core::shift_code::is_shift_allowed(e, day, code, &holidays))
        .count() as u32
}

/// Required off-day target per employee id, matching the original's
/// `_calculate_required_off_days`. Only three-shift and night-intensive
/// employees carry a target; weekday-only employees are structurally
/// forced onto `O` on non-working days instead.
pub fn required_off_days(input: &ScheduleInput) -> HashMap<String, u32> {
    let holidays = input.holiday_set();
    let weekend_holiday_count = input
        .date_range()
        .into_iter()
        .filter(|d| roster_core::shift_code::is_weekend_or_holiday(*d, &holidays))
        .count() as i64;
    let night_bonus = input.night_intensive_paid_leave_days.unwrap_or(0).max(0);

    let mut required = HashMap::new();
    for emp in &input.employees {
        let base = input.previous_off_carry(&emp.id);
        let target = match emp.work_pattern_type {
            WorkPatternType::ThreeShift => weekend_holiday_count + base,
            WorkPatternType::NightIntensive => weekend_holiday_count + base + night_bonus,
            WorkPatternType::WeekdayOnly => continue,
        };
        if target > 0 {
            required.insert(emp.id.clone(), target as u32);
        }
    }
    required
}

/// The window length (inclusive day count) of the schedule.
pub fn window_days(input: &ScheduleInput) -> u32 {
    input.date_range().len() as u32
}

pub fn employee_by_id<'a>(input: &'a ScheduleInput, id: &str) -> Option<&'a Employee> {
    input.employees.iter().find(|e| e.id == id)
}
