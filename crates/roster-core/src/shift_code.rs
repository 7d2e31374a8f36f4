//! Shift-code normalization and the allowed-shift relation.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

use crate::employee::{Employee, WorkPatternType};

/// Vacation / locked-off code, always allowed regardless of work pattern.
pub const VACATION: &str = "V";
/// Off code.
pub const OFF: &str = "O";
/// Administrative (weekday-only) code.
pub const ADMIN: &str = "A";
/// Day shift code.
pub const DAY: &str = "D";
/// Evening shift code.
pub const EVENING: &str = "E";
/// Night shift code.
pub const NIGHT: &str = "N";

/// Normalizes a raw shift-code string per `spec.md` §3: strip `^` markers,
/// upper-case, and fold the `OFF` alias onto `O`.
///
/// # Examples
///
/// ```
/// use roster_core::shift_code::normalize;
///
/// assert_eq!(normalize("^d"), "D");
/// assert_eq!(normalize("off"), "O");
/// assert_eq!(normalize(" n "), "N");
/// ```
pub fn normalize(raw: &str) -> String {
    let stripped = raw.replace('^', "");
    let upper = stripped.trim().to_uppercase();
    if upper == "OFF" {
        OFF.to_string()
    } else {
        upper
    }
}

/// True when `day` falls on a Saturday, Sunday, or a date in `holidays`.
pub fn is_weekend_or_holiday(day: NaiveDate, holidays: &HashSet<NaiveDate>) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun) || holidays.contains(&day)
}

/// The allowed-shift relation of `spec.md` §4.3.
///
/// `code` is normalized internally before the relation is evaluated.
pub fn is_shift_allowed(
    employee: &Employee,
    day: NaiveDate,
    code: &str,
    holidays: &HashSet<NaiveDate>,
) -> bool {
    let u = normalize(code);
    if u == VACATION {
        return true;
    }
    match employee.work_pattern_type {
        WorkPatternType::NightIntensive => matches!(u.as_str(), NIGHT | OFF | VACATION),
        WorkPatternType::WeekdayOnly => {
            if is_weekend_or_holiday(day, holidays) {
                matches!(u.as_str(), OFF | VACATION)
            } else {
                matches!(u.as_str(), ADMIN | VACATION)
            }
        }
        WorkPatternType::ThreeShift => u != ADMIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::Employee;
    use std::collections::HashMap;

    fn employee(pattern: WorkPatternType) -> Employee {
        Employee {
            id: "e1".into(),
            team_id: None,
            work_pattern_type: pattern,
            career_group_alias: None,
            preferred_shift_types: HashMap::new(),
            max_consecutive_days_preferred: None,
            max_consecutive_nights_preferred: None,
        }
    }

    #[test]
    fn normalize_strips_caret_and_uppercases() {
        assert_eq!(normalize("^e"), "E");
        assert_eq!(normalize("OFF"), "O");
        assert_eq!(normalize("off"), "O");
    }

    #[test]
    fn vacation_always_allowed() {
        let emp = employee(WorkPatternType::NightIntensive);
        let holidays = HashSet::new();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(is_shift_allowed(&emp, day, "V", &holidays));
    }

    #[test]
    fn night_intensive_restricted_to_n_o_v() {
        let emp = employee(WorkPatternType::NightIntensive);
        let holidays = HashSet::new();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(is_shift_allowed(&emp, day, "N", &holidays));
        assert!(is_shift_allowed(&emp, day, "O", &holidays));
        assert!(!is_shift_allowed(&emp, day, "D", &holidays));
        assert!(!is_shift_allowed(&emp, day, "E", &holidays));
        assert!(!is_shift_allowed(&emp, day, "A", &holidays));
    }

    #[test]
    fn weekday_only_follows_weekend_vs_weekday() {
        let emp = employee(WorkPatternType::WeekdayOnly);
        let holidays = HashSet::new();
        // 2024-01-06 is a Saturday.
        let saturday = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert!(is_shift_allowed(&emp, saturday, "O", &holidays));
        assert!(!is_shift_allowed(&emp, saturday, "A", &holidays));
        assert!(is_shift_allowed(&emp, monday, "A", &holidays));
        assert!(!is_shift_allowed(&emp, monday, "O", &holidays));
    }

    #[test]
    fn holiday_treated_as_weekend_for_weekday_only() {
        let emp = employee(WorkPatternType::WeekdayOnly);
        let holiday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let mut holidays = HashSet::new();
        holidays.insert(holiday);
        assert!(is_shift_allowed(&emp, holiday, "O", &holidays));
        assert!(!is_shift_allowed(&emp, holiday, "A", &holidays));
    }

    #[test]
    fn three_shift_disallows_admin_only() {
        let emp = employee(WorkPatternType::ThreeShift);
        let holidays = HashSet::new();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(is_shift_allowed(&emp, day, "D", &holidays));
        assert!(is_shift_allowed(&emp, day, "E", &holidays));
        assert!(is_shift_allowed(&emp, day, "N", &holidays));
        assert!(is_shift_allowed(&emp, day, "O", &holidays));
        assert!(!is_shift_allowed(&emp, day, "A", &holidays));
    }
}
