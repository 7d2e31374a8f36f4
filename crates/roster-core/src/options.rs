//! The tunable `options` envelope (`spec.md` §3 and §6 environment knobs).

use serde::{Deserialize, Serialize};

/// Floor applied to every constraint weight so a misconfigured zero weight
/// never fully disables a soft constraint (`spec.md` §4.2: "floored at
/// 0.1").
pub const WEIGHT_FLOOR: f64 = 0.1;

fn default_weight() -> f64 {
    1.0
}

/// Per-family penalty-weight multipliers. Defaults to 1.0, floored at
/// `WEIGHT_FLOOR` everywhere it is read (see [`ConstraintWeights::floored`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintWeights {
    #[serde(default = "default_weight")]
    pub staffing: f64,
    #[serde(default = "default_weight")]
    pub team_balance: f64,
    #[serde(default = "default_weight")]
    pub career_balance: f64,
    #[serde(default = "default_weight")]
    pub off_balance: f64,
    #[serde(default = "default_weight")]
    pub shift_pattern: f64,
}

impl Default for ConstraintWeights {
    fn default() -> Self {
        ConstraintWeights {
            staffing: default_weight(),
            team_balance: default_weight(),
            career_balance: default_weight(),
            off_balance: default_weight(),
            shift_pattern: default_weight(),
        }
    }
}

impl ConstraintWeights {
    /// Returns a copy with every weight floored at [`WEIGHT_FLOOR`].
    pub fn floored(&self) -> Self {
        ConstraintWeights {
            staffing: self.staffing.max(WEIGHT_FLOOR),
            team_balance: self.team_balance.max(WEIGHT_FLOOR),
            career_balance: self.career_balance.max(WEIGHT_FLOOR),
            off_balance: self.off_balance.max(WEIGHT_FLOOR),
            shift_pattern: self.shift_pattern.max(WEIGHT_FLOOR),
        }
    }

    /// Multiplies the four relaxation-ladder-eligible weights
    /// (`staffing, teamBalance, careerBalance, offBalance`) by `factor`,
    /// per `spec.md` §4.7's multi-run weight jitter.
    pub fn scale_jitter(&self, factor_staffing: f64, factor_team: f64, factor_career: f64, factor_off: f64) -> Self {
        ConstraintWeights {
            staffing: (self.staffing * factor_staffing).max(WEIGHT_FLOOR),
            team_balance: (self.team_balance * factor_team).max(WEIGHT_FLOOR),
            career_balance: (self.career_balance * factor_career).max(WEIGHT_FLOOR),
            off_balance: (self.off_balance * factor_off).max(WEIGHT_FLOOR),
            shift_pattern: self.shift_pattern,
        }
    }

    /// Multiplies every weight (including `shiftPattern`) by `factor`,
    /// floored at `floor`, per `spec.md` §4.7's relaxation ladder
    /// (`[0.8, 0.6, 0.4]`, floor `0.2`).
    pub fn relax(&self, factor: f64, floor: f64) -> Self {
        ConstraintWeights {
            staffing: (self.staffing * factor).max(floor),
            team_balance: (self.team_balance * factor).max(floor),
            career_balance: (self.career_balance * factor).max(floor),
            off_balance: (self.off_balance * factor).max(floor),
            shift_pattern: (self.shift_pattern * factor).max(floor),
        }
    }
}

fn default_off_tolerance() -> u32 {
    2
}

fn default_max_same_shift() -> u32 {
    2
}

fn default_tabu_size() -> usize {
    32
}

fn default_time_limit_ms() -> u64 {
    4000
}

fn default_max_iterations() -> u32 {
    400
}

fn default_shift_balance_tolerance() -> u32 {
    4
}

fn default_anneal_temperature() -> f64 {
    5.0
}

fn default_anneal_cooling_rate() -> f64 {
    0.92
}

/// Simulated-annealing parameters nested under `cspSettings.annealing`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnealingSettings {
    #[serde(default = "default_anneal_temperature")]
    pub temperature: f64,
    #[serde(default = "default_anneal_cooling_rate")]
    pub cooling_rate: f64,
}

impl Default for AnnealingSettings {
    fn default() -> Self {
        AnnealingSettings {
            temperature: default_anneal_temperature(),
            cooling_rate: default_anneal_cooling_rate(),
        }
    }
}

/// Construction/postprocessor tuning knobs (`spec.md` §3 `cspSettings`,
/// §4.6, §6 `MILP_POSTPROCESS_*` environment knobs).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CspSettings {
    #[serde(default = "default_off_tolerance")]
    pub off_tolerance: u32,
    #[serde(default = "default_max_same_shift")]
    pub max_same_shift: u32,
    #[serde(default = "default_tabu_size")]
    pub tabu_size: usize,
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: u64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_shift_balance_tolerance")]
    pub shift_balance_tolerance: u32,
    #[serde(default)]
    pub annealing: AnnealingSettings,
}

impl Default for CspSettings {
    fn default() -> Self {
        CspSettings {
            off_tolerance: default_off_tolerance(),
            max_same_shift: default_max_same_shift(),
            tabu_size: default_tabu_size(),
            time_limit_ms: default_time_limit_ms(),
            max_iterations: default_max_iterations(),
            shift_balance_tolerance: default_shift_balance_tolerance(),
            annealing: AnnealingSettings::default(),
        }
    }
}

impl CspSettings {
    /// Clamps `maxSameShift` into `[1, 10]`, matching the original
    /// implementation's `_get_max_same_shift`.
    pub fn clamped_max_same_shift(&self) -> u32 {
        self.max_same_shift.clamp(1, 10)
    }

    /// Clamps `shiftBalanceTolerance` into `[1, 20]`.
    pub fn clamped_shift_balance_tolerance(&self) -> u32 {
        self.shift_balance_tolerance.clamp(1, 20)
    }
}

/// `options.patternConstraints`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternConstraints {
    /// When positive, overrides `maxConsecutiveDaysPreferred` for every
    /// three-shift employee before cloning (`spec.md` §4.7 "Override").
    #[serde(default)]
    pub max_consecutive_days_three_shift: Option<u32>,
}

/// `options.multiRun`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiRunSettings {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default)]
    pub weight_jitter_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_attempts() -> u32 {
    1
}

impl Default for MultiRunSettings {
    fn default() -> Self {
        MultiRunSettings {
            attempts: default_attempts(),
            weight_jitter_pct: 0.0,
            seed: None,
        }
    }
}

impl MultiRunSettings {
    /// Attempts clamped into `[1, 10]` per `spec.md` §4.7.
    pub fn clamped_attempts(&self) -> u32 {
        self.attempts.clamp(1, 10)
    }
}

/// The full tunable envelope, `ScheduleInput.options`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default)]
    pub constraint_weights: ConstraintWeights,
    #[serde(default)]
    pub csp_settings: CspSettings,
    #[serde(default)]
    pub pattern_constraints: PatternConstraints,
    #[serde(default)]
    pub multi_run: MultiRunSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_solve_time_ms: Option<u64>,
    /// Preferred backend, carried for the "don't silently switch when one
    /// solver is explicitly requested" rule of §4.7.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let opts = Options::default();
        assert_eq!(opts.csp_settings.off_tolerance, 2);
        assert_eq!(opts.csp_settings.max_same_shift, 2);
        assert_eq!(opts.csp_settings.tabu_size, 32);
        assert_eq!(opts.csp_settings.time_limit_ms, 4000);
        assert_eq!(opts.csp_settings.max_iterations, 400);
        assert_eq!(opts.csp_settings.annealing.temperature, 5.0);
        assert_eq!(opts.csp_settings.annealing.cooling_rate, 0.92);
        assert_eq!(opts.multi_run.attempts, 1);
    }

    #[test]
    fn weight_floor_applies() {
        let weights = ConstraintWeights {
            staffing: 0.0,
            team_balance: -5.0,
            career_balance: 1.0,
            off_balance: 1.0,
            shift_pattern: 1.0,
        };
        let floored = weights.floored();
        assert_eq!(floored.staffing, WEIGHT_FLOOR);
        assert_eq!(floored.team_balance, WEIGHT_FLOOR);
    }

    #[test]
    fn max_same_shift_clamped_into_range() {
        let mut settings = CspSettings::default();
        settings.max_same_shift = 50;
        assert_eq!(settings.clamped_max_same_shift(), 10);
        settings.max_same_shift = 0;
        assert_eq!(settings.clamped_max_same_shift(), 1);
    }

    #[test]
    fn parses_partial_json_with_defaults() {
        let json = r#"{"cspSettings": {"maxSameShift": 3}}"#;
        let opts: Options = serde_json::from_str(json).unwrap();
        assert_eq!(opts.csp_settings.max_same_shift, 3);
        assert_eq!(opts.csp_settings.off_tolerance, 2);
        assert_eq!(opts.constraint_weights.staffing, 1.0);
    }
}
