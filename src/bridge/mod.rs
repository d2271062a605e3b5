//! The solver bridge (spec.md §4.7/§6.3): SMT-LIB-flavored serialization,
//! external-process invocation, and solver-result normalization.

pub mod invoke;
pub mod model;
pub mod serialize;

pub use invoke::{ExternalHornSolver, FixtureHornSolver, HornSolver, SolverConfig};
pub use model::{normalize_model, SolverOutcome};
pub use serialize::render_document;
