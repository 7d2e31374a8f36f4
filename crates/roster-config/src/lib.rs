//! Loading and environment-variable overrides for the roster engine's
//! tunable [`Options`] envelope.
//!
//! `Options` itself (the `constraintWeights`/`cspSettings`/
//! `patternConstraints`/`multiRun` sub-structs) lives in `roster-core`
//! since it is part of `ScheduleInput`; this crate only adds the two ways
//! an operator tunes it without editing the request payload: a standalone
//! TOML/YAML file, and the `MILP_*` environment knobs of `spec.md` §6.
//!
//! # Examples
//!
//! ```
//! use roster_config::load_options_from_toml_str;
//!
//! let options = load_options_from_toml_str(r#"
//!     [cspSettings]
//!     maxIterations = 200
//!     timeLimitMs = 2000
//! "#).unwrap();
//!
//! assert_eq!(options.csp_settings.max_iterations, 200);
//! ```

use std::path::Path;

use roster_core::Options;
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Errors raised while loading or applying overrides to [`Options`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid environment override {name}={value}: {reason}")]
    InvalidEnvValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Loads `Options` from a TOML file, falling back to `Options::default()`
/// when the file does not exist.
pub fn load_options_from_toml_file(path: impl AsRef<Path>) -> Result<Options, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => load_options_from_toml_str(&contents),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Options::default()),
        Err(err) => Err(err.into()),
    }
}

/// Parses `Options` from a TOML string.
pub fn load_options_from_toml_str(s: &str) -> Result<Options, ConfigError> {
    Ok(toml::from_str(s)?)
}

/// Loads `Options` from a YAML file, falling back to `Options::default()`
/// when the file does not exist.
pub fn load_options_from_yaml_file(path: impl AsRef<Path>) -> Result<Options, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => load_options_from_yaml_str(&contents),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Options::default()),
        Err(err) => Err(err.into()),
    }
}

/// Parses `Options` from a YAML string.
pub fn load_options_from_yaml_str(s: &str) -> Result<Options, ConfigError> {
    Ok(serde_yaml::from_str(s)?)
}

/// The default backend preference, read from `MILP_DEFAULT_SOLVER` when
/// `options.solver` itself is unset. `spec.md` §6/§4.7: the orchestrator
/// must not silently switch when one solver is explicitly requested, so
/// this is only a fallback for an unset preference.
pub fn default_solver_from_env() -> Option<String> {
    std::env::var("MILP_DEFAULT_SOLVER").ok().filter(|s| !s.is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|err| ConfigError::InvalidEnvValue {
                name,
                value,
                reason: err.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Applies the `MILP_POSTPROCESS_*` environment overrides of `spec.md` §6
/// onto `options.csp_settings` in place. Unset variables leave the
/// existing value untouched; `options.solver` is left alone (see
/// [`default_solver_from_env`] for the solver-selection fallback).
pub fn apply_env_overrides(options: &mut Options) -> Result<(), ConfigError> {
    if let Some(v) = parse_env::<u32>("MILP_POSTPROCESS_MAX_ITERATIONS")? {
        options.csp_settings.max_iterations = v;
    }
    if let Some(v) = parse_env::<u64>("MILP_POSTPROCESS_TIME_LIMIT_MS")? {
        options.csp_settings.time_limit_ms = v;
    }
    if let Some(v) = parse_env::<usize>("MILP_POSTPROCESS_TABU_SIZE")? {
        options.csp_settings.tabu_size = v;
    }
    if let Some(v) = parse_env::<u32>("MILP_POSTPROCESS_MAX_SAME_SHIFT")? {
        options.csp_settings.max_same_shift = v;
    }
    if let Some(v) = parse_env::<u32>("MILP_POSTPROCESS_OFF_TOLERANCE")? {
        options.csp_settings.off_tolerance = v;
    }
    if let Some(v) = parse_env::<f64>("MILP_POSTPROCESS_ANNEAL_TEMP")? {
        options.csp_settings.annealing.temperature = v;
    }
    if let Some(v) = parse_env::<f64>("MILP_POSTPROCESS_ANNEAL_COOL")? {
        options.csp_settings.annealing.cooling_rate = v;
    }
    if options.solver.is_none() {
        options.solver = default_solver_from_env();
    }
    Ok(())
}
