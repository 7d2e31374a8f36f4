//! Crate-wide error taxonomy.

use thiserror::Error;

use crate::diagnostics::Diagnostics;

/// Main error type returned by the roster engine's fallible operations.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The backend returned no feasible solution for an attempt. Carries
    /// whatever preflight issues and partial diagnostics were observed so
    /// the relaxation ladder and user-facing guidance can react.
    #[error("solver failed: {message}")]
    SolverFailure {
        message: String,
        diagnostics: Option<Box<Diagnostics>>,
    },

    /// Cancellation was observed before any feasible attempt completed.
    #[error("solver was cancelled")]
    SolverCancelled,

    /// A problem with `Options` or environment-variable overrides.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input violates a documented domain-model invariant (§3 I1-I5).
    #[error("invalid schedule input: {0}")]
    InvalidInput(String),

    /// Anything else, not expected during normal operation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RosterError {
    pub fn solver_failure(message: impl Into<String>, diagnostics: Option<Diagnostics>) -> Self {
        RosterError::SolverFailure {
            message: message.into(),
            diagnostics: diagnostics.map(Box::new),
        }
    }
}

/// Result type alias used throughout the roster engine.
pub type Result<T> = std::result::Result<T, RosterError>;
