//! Invariant-inductive generator (spec.md §4.5.5, only emitted when the
//! invariant template is real):
//!
//! ```text
//! forall S, w in SystemSpace and noise-bounds and D.guard(S, pi(S), w)
//!   and L(q -> q') and Inv(S, q) >= 0
//!   => Inv(Succ(S, pi(S), w), q') >= 0
//! ```
//!
//! Grounded in
//! `original_source/src/system/certificate/invariant/inductive_constraint.py`,
//! simplified to this crate's single (reach-head) control policy — the
//! original threads a list of per-Büchi-component policies that this
//! reach-only variant never builds.

use crate::algebra::{Inequality, Relation};
use crate::automaton::Automata;
use crate::constraints::model::{Constraint, ConstraintImplication, SubConstraint};
use crate::dynamics::{SystemDynamics, SystemSpace, SystemStochasticNoise};
use crate::error::ModelError;
use crate::templates::{InvariantTemplate, SystemDecomposedControlPolicy};

pub struct InvariantInductive<'a> {
    pub invariant: &'a dyn InvariantTemplate,
    pub system_space: &'a SystemSpace,
    pub decomposed_control_policy: &'a SystemDecomposedControlPolicy,
    pub disturbance: &'a SystemStochasticNoise,
    pub system_dynamics: &'a SystemDynamics,
    pub automata: &'a Automata,
}

impl<'a> InvariantInductive<'a> {
    /// Fallible variant surfacing `ModelError` from guard expansion — the
    /// orchestrator calls this one; [`Constraint::extract`] panics-free by
    /// delegating and discarding elision-only guards (see module docs on
    /// `automaton::expand_guard`).
    pub fn try_extract(&self) -> Result<Vec<ConstraintImplication>, ModelError> {
        let mut constraints = Vec::new();
        let action = self
            .decomposed_control_policy
            .reach_policy()
            .map(|p| p.apply())
            .unwrap_or_default();
        let noise_bounds = self.disturbance.bounds();

        for dynamics in &self.system_dynamics.blocks {
            let next_state = dynamics.apply(&action);
            for state in &self.automata.states {
                let current_invariant = self.invariant.constraint_at(state.id);
                for transition in &state.transitions {
                    let label_region = self.automata.expand_guard(&transition.label)?;
                    let lhs = SubConstraint::and(vec![
                        self.system_space.region.clone(),
                        noise_bounds.clone(),
                        dynamics.guard.clone(),
                        label_region,
                        current_invariant.clone(),
                    ]);

                    let mut next_invariant = self.invariant.at(transition.dest);
                    for (name, expr) in &next_state {
                        next_invariant = next_invariant.substitute(name, expr);
                    }
                    let rhs = SubConstraint::leaf(Inequality::new(next_invariant, Relation::Ge));
                    constraints.push(ConstraintImplication::new(lhs, rhs));
                }
            }
        }
        Ok(constraints)
    }
}

impl<'a> Constraint for InvariantInductive<'a> {
    fn extract(&self) -> Vec<ConstraintImplication> {
        self.try_extract().unwrap_or_default()
    }
}
