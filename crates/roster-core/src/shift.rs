//! `Shift` descriptor.

use serde::{Deserialize, Serialize};

/// A shift descriptor from the input's `shifts` set.
///
/// `code` is the shift's normalized letter (`spec.md` §3); when absent the
/// model builder falls back to `name`, then `id`, matching the original
/// implementation's `(shift.code or shift.name or shift.id).upper()` rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub required_staff: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_staff: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_staff: Option<u32>,
}

impl Shift {
    /// The normalized code this shift resolves to for model-building
    /// purposes: `code`, else `name`, else `id`, upper-cased.
    pub fn resolved_code(&self) -> String {
        let raw = self
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| (!self.name.is_empty()).then_some(self.name.as_str()))
            .unwrap_or(self.id.as_str());
        crate::shift_code::normalize(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_code_prefers_explicit_code() {
        let shift = Shift {
            id: "shift-1".into(),
            code: Some("^d".into()),
            name: "Day".into(),
            r#type: None,
            color: None,
            required_staff: 5,
            min_staff: None,
            max_staff: None,
        };
        assert_eq!(shift.resolved_code(), "D");
    }

    #[test]
    fn resolved_code_falls_back_to_name_then_id() {
        let by_name = Shift {
            id: "shift-2".into(),
            code: None,
            name: "evening".into(),
            r#type: None,
            color: None,
            required_staff: 4,
            min_staff: None,
            max_staff: None,
        };
        assert_eq!(by_name.resolved_code(), "EVENING");

        let by_id = Shift {
            id: "n".into(),
            code: None,
            name: String::new(),
            r#type: None,
            color: None,
            required_staff: 3,
            min_staff: None,
            max_staff: None,
        };
        assert_eq!(by_id.resolved_code(), "N");
    }
}
