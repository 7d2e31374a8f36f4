//! `Employee` and the work-pattern-type enum.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The three work-pattern families recognized by the allowed-shift relation
/// (`spec.md` §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkPatternType {
    ThreeShift,
    NightIntensive,
    WeekdayOnly,
}

impl Default for WorkPatternType {
    fn default() -> Self {
        WorkPatternType::ThreeShift
    }
}

/// An employee participating in the roster.
///
/// Fields beyond `spec.md` §3's minimal set (`name`, `role`, `departmentId`,
/// `guaranteedOffDays`, aliasing metadata, tenure) are carried because the
/// original implementation's `Employee` dataclass reports them back in
/// `offAccruals` and preflight guidance; they do not participate in any
/// constraint evaluated by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default)]
    pub work_pattern_type: WorkPatternType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_group_alias: Option<String>,
    #[serde(default)]
    pub preferred_shift_types: HashMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_consecutive_days_preferred: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_consecutive_nights_preferred: Option<u32>,
}

impl Employee {
    /// The preference weight for `code`, defaulting to 0.0 (no preference)
    /// when unspecified, clamped into `[0, 1]` per `spec.md` §3.
    pub fn preference_weight(&self, code: &str) -> f64 {
        self.preferred_shift_types
            .get(code)
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_work_pattern_is_three_shift() {
        assert_eq!(WorkPatternType::default(), WorkPatternType::ThreeShift);
    }

    #[test]
    fn preference_weight_defaults_to_zero() {
        let emp = Employee {
            id: "e1".into(),
            team_id: None,
            work_pattern_type: WorkPatternType::ThreeShift,
            career_group_alias: None,
            preferred_shift_types: HashMap::new(),
            max_consecutive_days_preferred: None,
            max_consecutive_nights_preferred: None,
        };
        assert_eq!(emp.preference_weight("D"), 0.0);
    }

    #[test]
    fn preference_weight_clamps() {
        let mut prefs = HashMap::new();
        prefs.insert("D".to_string(), 1.5);
        let emp = Employee {
            id: "e1".into(),
            team_id: None,
            work_pattern_type: WorkPatternType::ThreeShift,
            career_group_alias: None,
            preferred_shift_types: prefs,
            max_consecutive_days_preferred: None,
            max_consecutive_nights_preferred: None,
        };
        assert_eq!(emp.preference_weight("D"), 1.0);
    }

    #[test]
    fn deserializes_from_camel_case() {
        let json = r#"{
            "id": "e1",
            "teamId": "t1",
            "workPatternType": "night-intensive",
            "preferredShiftTypes": {"N": 0.9}
        }"#;
        let emp: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(emp.team_id.as_deref(), Some("t1"));
        assert_eq!(emp.work_pattern_type, WorkPatternType::NightIntensive);
        assert_eq!(emp.preference_weight("N"), 0.9);
    }
}
