//! Optional process-wide `tracing` subscriber, gated behind the
//! `telemetry` feature so embedding the engine never hijacks a host
//! application's own logging setup (`spec.md` §5: "log file writes are
//! best-effort and never gate correctness").
//!
//! Reads `ROSTER_LOG` (falling back to `RUST_LOG`, then `info`) the same
//! way the teacher's own binaries configure `tracing-subscriber`.

#![cfg(feature = "telemetry")]

use tracing_subscriber::EnvFilter;

/// Installs a compact `fmt` subscriber as the global default. Safe to call
/// more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_env("ROSTER_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).compact().try_init();
}
