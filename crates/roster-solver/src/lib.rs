//! Construction heuristic, primary solver driver, postprocessor, and
//! orchestrator for the roster engine (`spec.md` §4.2, §4.4, §4.6, §4.7).
//!
//! This crate owns everything downstream of a concrete [`roster_core::ScheduleInput`]:
//! the backend abstraction and its construction-plus-local-search
//! implementor, the sequence-dependent hard constraints the construction
//! heuristic enforces while it builds, the cooperative cancellation token
//! threaded through every phase (`spec.md` §5), the tabu/simulated-annealing
//! postprocessor, and the orchestrator tying solver selection, the
//! relaxation ladder, and the multi-run ensemble together. Callers that
//! only need "give me a schedule" should use [`orchestrator::solve`]; the
//! rest of the module tree is exposed for testing and for a future
//! alternate [`backend::SolverBackend`] implementor.

pub mod backend;
pub mod cancellation;
pub mod construction;
pub mod hard_constraints;
pub mod orchestrator;
pub mod postprocessor;

pub use backend::{BackendSolution, ConstructionLocalSearchBackend, Inequality, InequalityOp, SolverBackend, VarId};
pub use cancellation::CancellationToken;
pub use orchestrator::{solve, DEFAULT_SOLVER_NAME};
