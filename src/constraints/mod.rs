//! Constraint generators realizing spec.md §4.5's implications, plus the
//! shared `SubConstraint`/`ConstraintImplication` object model in
//! [`model`].

pub mod controller_bounds;
pub mod invariant_inductive;
pub mod invariant_initial;
pub mod model;
pub mod non_negativity;
pub mod strict_decrease;
pub mod variable_sanity;

pub use controller_bounds::ControllerBounds;
pub use invariant_inductive::InvariantInductive;
pub use invariant_initial::InvariantInitial;
pub use model::{Aggregation, Constraint, ConstraintConstant, ConstraintImplication, SubConstraint};
pub use non_negativity::NonNegativity;
pub use strict_decrease::StrictExpectedDecrease;
pub use variable_sanity::{ReachAvoidSanity, ReachSanity};
