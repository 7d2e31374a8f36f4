//! Tests for `Options` loading and environment overrides.

use super::*;

#[test]
fn toml_parsing_overrides_only_named_fields() {
    let toml = r#"
        [constraintWeights]
        staffing = 1.5

        [cspSettings]
        maxSameShift = 3
        timeLimitMs = 9000
    "#;

    let options = load_options_from_toml_str(toml).unwrap();
    assert_eq!(options.constraint_weights.staffing, 1.5);
    assert_eq!(options.constraint_weights.team_balance, 1.0);
    assert_eq!(options.csp_settings.max_same_shift, 3);
    assert_eq!(options.csp_settings.time_limit_ms, 9000);
    assert_eq!(options.csp_settings.off_tolerance, 2);
}

#[test]
fn yaml_parsing_round_trips_multi_run() {
    let yaml = r#"
        multiRun:
          attempts: 3
          weightJitterPct: 10.0
          seed: 42
    "#;

    let options = load_options_from_yaml_str(yaml).unwrap();
    assert_eq!(options.multi_run.attempts, 3);
    assert_eq!(options.multi_run.seed, Some(42));
}

#[test]
fn missing_toml_file_falls_back_to_defaults() {
    let options = load_options_from_toml_file("/nonexistent/path/options.toml").unwrap();
    assert_eq!(options.csp_settings.max_iterations, 400);
}

#[test]
fn env_overrides_apply_then_validate_then_restore() {
    // Env vars are process-global; this is the only test in this crate that
    // touches MILP_* keys, and it runs both the success and failure path
    // sequentially rather than as separate tests to avoid any interleaving.
    let keys = [
        "MILP_POSTPROCESS_MAX_ITERATIONS",
        "MILP_POSTPROCESS_TIME_LIMIT_MS",
        "MILP_POSTPROCESS_TABU_SIZE",
        "MILP_POSTPROCESS_MAX_SAME_SHIFT",
        "MILP_POSTPROCESS_OFF_TOLERANCE",
        "MILP_POSTPROCESS_ANNEAL_TEMP",
        "MILP_POSTPROCESS_ANNEAL_COOL",
        "MILP_DEFAULT_SOLVER",
    ];
    for key in keys {
        std::env::remove_var(key);
    }

    std::env::set_var("MILP_POSTPROCESS_MAX_ITERATIONS", "777");
    std::env::set_var("MILP_POSTPROCESS_ANNEAL_TEMP", "8.5");
    std::env::set_var("MILP_DEFAULT_SOLVER", "cpsat");

    let mut options = Options::default();
    apply_env_overrides(&mut options).unwrap();

    assert_eq!(options.csp_settings.max_iterations, 777);
    assert_eq!(options.csp_settings.annealing.temperature, 8.5);
    assert_eq!(options.csp_settings.tabu_size, 32); // untouched default
    assert_eq!(options.solver.as_deref(), Some("cpsat"));

    std::env::set_var("MILP_POSTPROCESS_MAX_ITERATIONS", "not-a-number");
    let mut options = Options::default();
    assert!(apply_env_overrides(&mut options).is_err());

    for key in keys {
        std::env::remove_var(key);
    }
}
