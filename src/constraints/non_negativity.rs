//! Non-negativity generator (spec.md §4.5.2): `forall S in SystemSpace and
//! Inv(S,q) => V_reach_q(S) >= 0`, for every automaton state q.
//!
//! Grounded in `original_source/src/system/certificate/nnC.py`.

use crate::algebra::{Inequality, Relation};
use crate::automaton::Automata;
use crate::constraints::model::{Constraint, ConstraintImplication, SubConstraint};
use crate::dynamics::SystemSpace;
use crate::templates::{InvariantTemplate, ReachCertificateTemplates};

pub struct NonNegativity<'a> {
    pub template_manager: &'a ReachCertificateTemplates,
    pub invariant: &'a dyn InvariantTemplate,
    pub system_space: &'a SystemSpace,
    pub automata: &'a Automata,
}

impl<'a> Constraint for NonNegativity<'a> {
    fn extract(&self) -> Vec<ConstraintImplication> {
        self.automata
            .states
            .iter()
            .map(|state| {
                let lhs = SubConstraint::and(vec![
                    self.system_space.region.clone(),
                    self.invariant.constraint_at(state.id),
                ]);
                let rhs = SubConstraint::leaf(Inequality::new(
                    self.template_manager.template.for_state(state.id).clone(),
                    Relation::Ge,
                ));
                ConstraintImplication::new(lhs, rhs)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Equation;
    use crate::automaton::parse_hoa;
    use crate::templates::{InvariantFakeTemplate, ReachVariables};
    use std::collections::BTreeMap;

    #[test]
    fn emits_one_implication_per_automaton_state() {
        let hoa = parse_hoa("HOA: v1\nStart: 0\nAP: 0\nAcceptance: 1 Inf(0)\n--BODY--\nState: 0\n[t] 1\nState: 1 {0}\n[t] 1\n--END--\n").unwrap();
        let automata = Automata::from_hoa(hoa, BTreeMap::new());
        let names = vec!["S1".to_string()];
        let template_manager = ReachCertificateTemplates::new(&names, 2, 1, ReachVariables::new(0.9));
        let space = SystemSpace::new(SubConstraint::leaf(Inequality::new(Equation::symbol("S1"), Relation::Ge)));
        let fake = InvariantFakeTemplate::default();
        let generator = NonNegativity {
            template_manager: &template_manager,
            invariant: &fake,
            system_space: &space,
            automata: &automata,
        };
        assert_eq!(generator.extract().len(), 2);
    }
}
