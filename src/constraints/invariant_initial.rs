//! Invariant-initial generator (spec.md §4.5.4, only emitted when the
//! invariant template is real): `forall S in SystemSpace and InitialSpace
//! => Inv(S, q_start) >= 0`.
//!
//! Shape grounded in `original_source/src/system/certificate/initialC.py`
//! (which performs the analogous check for the reach-avoid `V_safe`
//! template); generalized here to the `Inv` invariant per spec.md §4.5.4.

use crate::automaton::Automata;
use crate::constraints::model::{Constraint, ConstraintImplication, SubConstraint};
use crate::dynamics::SystemSpace;
use crate::templates::InvariantTemplate;

pub struct InvariantInitial<'a> {
    pub invariant: &'a dyn InvariantTemplate,
    pub system_space: &'a SystemSpace,
    pub initial_space: &'a SystemSpace,
    pub automata: &'a Automata,
}

impl<'a> Constraint for InvariantInitial<'a> {
    fn extract(&self) -> Vec<ConstraintImplication> {
        let lhs = SubConstraint::and(vec![self.system_space.region.clone(), self.initial_space.region.clone()]);
        let rhs = self.invariant.constraint_at(self.automata.start_state);
        vec![ConstraintImplication::new(lhs, rhs)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Equation, Inequality, Relation};
    use crate::automaton::parse_hoa;
    use crate::templates::RealInvariantTemplate;
    use std::collections::BTreeMap;

    #[test]
    fn emits_exactly_one_implication_keyed_by_start_state() {
        let hoa = parse_hoa("HOA: v1\nStart: 1\nAP: 0\nAcceptance: 1 Inf(0)\n--BODY--\nState: 0\n[t] 0\nState: 1 {0}\n[t] 1\n--END--\n").unwrap();
        let automata = Automata::from_hoa(hoa, BTreeMap::new());
        let names = vec!["S1".to_string()];
        let invariant = RealInvariantTemplate::new(&names, 2, 1);
        let space = SystemSpace::new(SubConstraint::leaf(Inequality::new(Equation::symbol("S1"), Relation::Ge)));
        let initial = SystemSpace::new(SubConstraint::leaf(Inequality::comparing(
            &Equation::symbol("S1"),
            Relation::Le,
            &Equation::constant(1.0),
        )));
        let generator = InvariantInitial {
            invariant: &invariant,
            system_space: &space,
            initial_space: &initial,
            automata: &automata,
        };
        let out = generator.extract();
        assert_eq!(out.len(), 1);
        let expected_names = invariant.at(1).free_names();
        for name in expected_names {
            assert!(out[0].rhs.free_names().contains(&name));
        }
    }
}
