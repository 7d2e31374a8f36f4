//! `Assignment` — the only mutable entity once solving begins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One `(employeeId, date)` slot's resolved shift (`spec.md` §3).
///
/// `is_locked` is true iff this assignment was produced by a special
/// request whose code matches, or carries a `V` code (I3/I4). Locked
/// assignments are immovable by the postprocessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub employee_id: String,
    pub date: NaiveDate,
    pub shift_id: String,
    pub shift_type: String,
    #[serde(default)]
    pub is_locked: bool,
}

impl Assignment {
    pub fn new(
        employee_id: impl Into<String>,
        date: NaiveDate,
        shift_id: impl Into<String>,
        shift_type: impl Into<String>,
        is_locked: bool,
    ) -> Self {
        Assignment {
            employee_id: employee_id.into(),
            date,
            shift_id: shift_id.into(),
            shift_type: shift_type.into(),
            is_locked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_with_given_fields() {
        let a = Assignment::new("e1", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), "s1", "D", true);
        assert_eq!(a.employee_id, "e1");
        assert_eq!(a.shift_type, "D");
        assert!(a.is_locked);
    }

    #[test]
    fn serializes_camel_case() {
        let a = Assignment::new("e1", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), "s1", "D", false);
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"employeeId\""));
        assert!(json.contains("\"shiftId\""));
        assert!(json.contains("\"shiftType\""));
        assert!(json.contains("\"isLocked\""));
    }
}
