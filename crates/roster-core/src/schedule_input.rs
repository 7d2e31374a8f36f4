//! `ScheduleInput` — the root aggregate, immutable during a solve.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::employee::Employee;
use crate::options::Options;
use crate::shift::Shift;
use crate::special_request::{AliasMaps, CareerGroup, Holiday, SpecialRequest, TeamPattern};

/// Hard-coded default minimum headcount per shift code, used wherever
/// `requiredStaffPerShift` omits a code (`spec.md` §3).
pub fn default_required_staff() -> HashMap<String, u32> {
    HashMap::from([
        ("D".to_string(), 5),
        ("E".to_string(), 4),
        ("N".to_string(), 3),
    ])
}

/// The full, typed scheduling problem for one department/window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub department_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub employees: Vec<Employee>,
    pub shifts: Vec<Shift>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<Vec<SpecialRequest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holidays: Option<Vec<Holiday>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_pattern: Option<TeamPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_staff_per_shift: Option<HashMap<String, i64>>,
    #[serde(default)]
    pub previous_off_accruals: HashMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub night_intensive_paid_leave_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_groups: Option<Vec<CareerGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_maps: Option<AliasMaps>,
    #[serde(default)]
    pub options: Options,
}

impl ScheduleInput {
    /// The inclusive day range `[startDate, endDate]`.
    pub fn date_range(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut current = self.start_date;
        while current <= self.end_date {
            dates.push(current);
            current = current.succ_opt().expect("date range must not overflow");
        }
        dates
    }

    /// `requiredStaffPerShift`, upper-cased and merged with
    /// [`default_required_staff`] for any code left unspecified, matching
    /// the original implementation's `_build_required_staff_map`.
    pub fn required_staff_map(&self) -> HashMap<String, u32> {
        let mut required: HashMap<String, u32> = HashMap::new();
        if let Some(raw) = &self.required_staff_per_shift {
            for (code, value) in raw {
                if code.is_empty() {
                    continue;
                }
                required.insert(code.to_uppercase(), (*value).max(0) as u32);
            }
        }
        for (code, default_value) in default_required_staff() {
            required.entry(code).or_insert(default_value);
        }
        required
    }

    /// The set of dates treated as weekend-equivalent.
    pub fn holiday_set(&self) -> HashSet<NaiveDate> {
        self.holidays
            .as_ref()
            .map(|hs| hs.iter().map(|h| h.date).collect())
            .unwrap_or_default()
    }

    /// `previousOffAccruals` carry-over credit for `employee_id`, defaulting
    /// to zero.
    pub fn previous_off_carry(&self, employee_id: &str) -> i64 {
        self.previous_off_accruals
            .get(employee_id)
            .copied()
            .unwrap_or(0)
            .max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::WorkPatternType;

    fn base_employee() -> Employee {
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

    fn base_input() -> ScheduleInput {
        ScheduleInput {
            department_id: "dept".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            employees: vec![base_employee()],
            shifts: vec![],
            special_requests: None,
            holidays: None,
            team_pattern: None,
            required_staff_per_shift: None,
            previous_off_accruals: HashMap::new(),
            night_intensive_paid_leave_days: None,
            career_groups: None,
            alias_maps: None,
            options: Options::default(),
        }
    }

    #[test]
    fn date_range_is_inclusive() {
        let input = base_input();
        assert_eq!(input.date_range().len(), 3);
    }

    #[test]
    fn required_staff_merges_with_defaults() {
        let mut input = base_input();
        input.required_staff_per_shift = Some(HashMap::from([("d".to_string(), 7)]));
        let map = input.required_staff_map();
        assert_eq!(map.get("D"), Some(&7));
        assert_eq!(map.get("E"), Some(&4));
        assert_eq!(map.get("N"), Some(&3));
    }

    #[test]
    fn previous_off_carry_defaults_to_zero() {
        let input = base_input();
        assert_eq!(input.previous_off_carry("unknown"), 0);
    }
}
