//! `SpecialRequest`, `Holiday`, `TeamPattern`, `CareerGroup`, `AliasMaps`.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single employee's request for a particular date, usually a requested
/// shift code (`spec.md` §3: "request with a code establishes a soft
/// target"). `request_type` is carried through from the original format
/// (e.g. `"shift"`, `"off"`) but only `shift_type_code` drives model
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialRequest {
    pub employee_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub request_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_type_code: Option<String>,
}

impl SpecialRequest {
    /// The normalized shift code this request targets, if any.
    pub fn normalized_code(&self) -> Option<String> {
        self.shift_type_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(crate::shift_code::normalize)
    }
}

/// A date treated as weekend-equivalent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub date: NaiveDate,
    #[serde(default)]
    pub name: String,
}

/// The team rotation pattern and the sequences it must avoid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPattern {
    #[serde(default)]
    pub pattern: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avoid_patterns: Option<Vec<Vec<String>>>,
}

/// A career-group descriptor used for coverage and balance constraints and
/// for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerGroup {
    pub code: String,
    pub name: String,
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Alias lookup tables for reporting, unused by constraint evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasMaps {
    #[serde(default)]
    pub employee_alias_map: HashMap<String, String>,
    #[serde(default)]
    pub team_alias_map: HashMap<String, String>,
    #[serde(default)]
    pub career_group_alias_map: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_code_strips_and_upper_cases() {
        let req = SpecialRequest {
            employee_id: "e1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            request_type: "shift".into(),
            shift_type_code: Some("^d".into()),
        };
        assert_eq!(req.normalized_code().as_deref(), Some("D"));
    }

    #[test]
    fn blank_code_normalizes_to_none() {
        let req = SpecialRequest {
            employee_id: "e1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            request_type: "off".into(),
            shift_type_code: Some("  ".into()),
        };
        assert_eq!(req.normalized_code(), None);
    }
}
