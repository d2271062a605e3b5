//! Controller-bounds generator (spec.md §4.5.1).
//!
//! Grounded in `original_source/src/system/certificate/cbC.py`: for each
//! configured limit (min and/or max) and each policy transition, emit
//! `forall S in SystemSpace => (transition(S) >= min) and (transition(S) <= max)`.
//! No limits configured emits nothing.

use crate::algebra::{Equation, Inequality, Relation};
use crate::constraints::model::{Constraint, ConstraintImplication, SubConstraint};
use crate::dynamics::SystemSpace;
use crate::templates::{PolicyLimits, SystemDecomposedControlPolicy};

pub struct ControllerBounds<'a> {
    pub system_space: &'a SystemSpace,
    pub decomposed_control_policy: &'a SystemDecomposedControlPolicy,
}

impl<'a> ControllerBounds<'a> {
    pub fn new(system_space: &'a SystemSpace, decomposed_control_policy: &'a SystemDecomposedControlPolicy) -> Self {
        ControllerBounds { system_space, decomposed_control_policy }
    }

    fn bound_inequalities(transition: &Equation, limits: &PolicyLimits) -> Vec<Inequality> {
        let mut ineqs = Vec::new();
        if let Some(min) = limits.min {
            ineqs.push(Inequality::comparing(transition, Relation::Ge, &Equation::constant(min)));
        }
        if let Some(max) = limits.max {
            ineqs.push(Inequality::comparing(transition, Relation::Le, &Equation::constant(max)));
        }
        ineqs
    }
}

impl<'a> Constraint for ControllerBounds<'a> {
    fn extract(&self) -> Vec<ConstraintImplication> {
        let mut constraints = Vec::new();
        let limits = &self.decomposed_control_policy.limits;
        for policy in &self.decomposed_control_policy.policies {
            for transition in &policy.transitions {
                let ineqs = Self::bound_inequalities(transition, limits);
                if ineqs.is_empty() {
                    continue;
                }
                let rhs = SubConstraint::and(ineqs.into_iter().map(SubConstraint::leaf).collect());
                constraints.push(ConstraintImplication::new(self.system_space.region.clone(), rhs));
            }
        }
        constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::PolicyType;

    fn space() -> SystemSpace {
        SystemSpace::new(SubConstraint::leaf(Inequality::comparing(
            &Equation::symbol("S1"),
            Relation::Ge,
            &Equation::constant(0.0),
        )))
    }

    #[test]
    fn emits_one_implication_per_limit_per_transition() {
        let names = vec!["S1".to_string()];
        let policy = SystemDecomposedControlPolicy::synthesized(
            1,
            &names,
            1,
            PolicyLimits { min: Some(-1.0), max: Some(1.0) },
        );
        let space = space();
        let generator = ControllerBounds::new(&space, &policy);
        let out = generator.extract();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rhs.leaves().len(), 2);
    }

    #[test]
    fn no_limits_emits_nothing() {
        let names = vec!["S1".to_string()];
        let policy = SystemDecomposedControlPolicy::synthesized(1, &names, 1, PolicyLimits::default());
        let space = space();
        let generator = ControllerBounds::new(&space, &policy);
        assert!(generator.extract().is_empty());
    }

    #[test]
    fn zero_action_dimension_emits_nothing() {
        let names = vec!["S1".to_string()];
        let policy = SystemDecomposedControlPolicy::synthesized(
            0,
            &names,
            1,
            PolicyLimits { min: Some(-1.0), max: Some(1.0) },
        );
        let space = space();
        let generator = ControllerBounds::new(&space, &policy);
        assert!(generator.extract().is_empty());
        let _ = PolicyType::Reach;
    }
}
