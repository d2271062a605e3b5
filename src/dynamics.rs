//! The system's state space, stochastic noise, and conditional dynamics —
//! the "plant" half of the input model (spec.md §3's `SystemSpace`,
//! `SystemStochasticNoise`, `SystemDynamics`).

use std::collections::BTreeMap;

use crate::algebra::Equation;
use crate::constraints::model::SubConstraint;

/// A conjunction of polynomial inequalities over state generators, used for
/// both the system space and the initial space (spec.md §3).
#[derive(Debug, Clone)]
pub struct SystemSpace {
    pub region: SubConstraint,
}

impl SystemSpace {
    pub fn new(region: SubConstraint) -> Self {
        SystemSpace { region }
    }
}

/// A named noise variable with bounded support and a symbolic expectation,
/// substituted into decrease conditions (spec.md §3 `Noise`).
#[derive(Debug, Clone)]
pub struct NoiseVariable {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub expectation: Equation,
}

/// The system's full noise vector D1..Dk.
#[derive(Debug, Clone)]
pub struct SystemStochasticNoise {
    pub variables: Vec<NoiseVariable>,
}

impl SystemStochasticNoise {
    pub fn new(variables: Vec<NoiseVariable>) -> Self {
        SystemStochasticNoise { variables }
    }

    pub fn names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name.clone()).collect()
    }

    /// Replace every noise symbol in `expr` by its declared expectation —
    /// the `E_w[...]` operator from spec.md §4.5.3, applied one variable at
    /// a time since substitution is only defined per-name.
    pub fn expectation_of(&self, expr: &Equation) -> Equation {
        let mut result = expr.clone();
        for v in &self.variables {
            result = result.substitute(&v.name, &v.expectation);
        }
        result
    }

    /// `D_i in [min, max]` for every declared noise variable, conjoined —
    /// used by the invariant-inductive generator (spec.md §4.5.5).
    pub fn bounds(&self) -> SubConstraint {
        use crate::algebra::{Inequality, Relation};
        let clauses = self
            .variables
            .iter()
            .flat_map(|v| {
                let sym = Equation::symbol(v.name.clone());
                vec![
                    SubConstraint::leaf(Inequality::comparing(&sym, Relation::Ge, &Equation::constant(v.min))),
                    SubConstraint::leaf(Inequality::comparing(&sym, Relation::Le, &Equation::constant(v.max))),
                ]
            })
            .collect();
        SubConstraint::and(clauses)
    }
}

/// A single guarded update rule: within `guard`, the next-state vector is
/// `transform` (one `Equation` per state dimension, indexed by state-
/// generator name so the dimension count need not be tracked separately).
#[derive(Debug, Clone)]
pub struct ConditionalDynamics {
    pub guard: SubConstraint,
    pub transform: BTreeMap<String, Equation>,
}

impl ConditionalDynamics {
    pub fn new(guard: SubConstraint, transform: BTreeMap<String, Equation>) -> Self {
        ConditionalDynamics { guard, transform }
    }

    /// `Succ(S, a, w)`: substitute the policy's action equations and the
    /// given noise vector (as plain symbols — left to the caller to
    /// expectation-substitute afterward) into this block's transform,
    /// applied to the current-state expression map `state_subst` (e.g. the
    /// identity map `{S1 -> S1, ...}`, or a prior Succ for composition).
    pub fn apply(&self, action: &BTreeMap<String, Equation>) -> BTreeMap<String, Equation> {
        self.transform
            .iter()
            .map(|(name, expr)| {
                let mut substituted = expr.clone();
                for (action_name, action_expr) in action {
                    substituted = substituted.substitute(action_name, action_expr);
                }
                (name.clone(), substituted)
            })
            .collect()
    }
}

/// The ordered sequence of conditional dynamics blocks. Coverage of the
/// relevant region by the guards is a correctness precondition, not checked
/// here (spec.md §3).
#[derive(Debug, Clone)]
pub struct SystemDynamics {
    pub blocks: Vec<ConditionalDynamics>,
}

impl SystemDynamics {
    pub fn new(blocks: Vec<ConditionalDynamics>) -> Self {
        SystemDynamics { blocks }
    }
}
