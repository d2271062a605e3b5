//! Strict expected decrease generator (spec.md §4.5.3).
//!
//! Grounded in `original_source/src/system/certificate/sedC_simple.py`.
//! **Mirrors a documented ambiguity, not fixed:** for a non-accepting,
//! non-rejecting state `q`, the generator iterates over *every* accepting
//! component id `q_acc` and keys the invariant consulted on the
//! implication's left-hand side by `q_acc` — not by `q`, the state the
//! decrease inequality is actually about. spec.md §9 names this explicitly
//! ("an implementer should mirror the literal behavior and surface a test
//! case"); the decrease inequality itself still correctly uses `V_reach_q`
//! and `V_reach_q'`, only the invariant guard is cross-wired this way.

use crate::algebra::{Inequality, Relation};
use crate::automaton::Automata;
use crate::constraints::model::{Constraint, ConstraintImplication, SubConstraint};
use crate::dynamics::{ConditionalDynamics, SystemDynamics, SystemStochasticNoise};
use crate::templates::{InvariantTemplate, ReachCertificateTemplates, SystemDecomposedControlPolicy};

pub struct StrictExpectedDecrease<'a> {
    pub template_manager: &'a ReachCertificateTemplates,
    pub invariant: &'a dyn InvariantTemplate,
    pub decomposed_control_policy: &'a SystemDecomposedControlPolicy,
    pub disturbance: &'a SystemStochasticNoise,
    pub system_dynamics: &'a SystemDynamics,
    pub automata: &'a Automata,
}

impl<'a> StrictExpectedDecrease<'a> {
    fn extract_for_dynamics(&self, dynamics: &ConditionalDynamics, constraints: &mut Vec<ConstraintImplication>) {
        for q in self.automata.live_non_accepting_ids() {
            self.extract_for_state_and_dynamics(q, dynamics, constraints);
        }
    }

    fn extract_for_state_and_dynamics(
        &self,
        q: usize,
        dynamics: &ConditionalDynamics,
        constraints: &mut Vec<ConstraintImplication>,
    ) {
        let action = self
            .decomposed_control_policy
            .reach_policy()
            .map(|p| p.apply())
            .unwrap_or_default();
        let next_state = dynamics.apply(&action);
        let current_v_reach = self.template_manager.template.for_state(q).clone();

        for acc_state_id in self.automata.accepting_component_ids() {
            // Deliberately keyed by `acc_state_id`, not `q` — see module docs.
            let lhs = SubConstraint::and(vec![dynamics.guard.clone(), self.invariant.constraint_at(acc_state_id)]);

            for transition in self.automata.transitions_from(q) {
                let next_v_reach = self.template_manager.template.for_state(transition.dest).clone();
                let mut next_v_reach_at_succ = next_v_reach;
                for (name, expr) in &next_state {
                    next_v_reach_at_succ = next_v_reach_at_succ.substitute(name, expr);
                }
                let expected_next = self.disturbance.expectation_of(&next_v_reach_at_succ);

                let decrease = current_v_reach
                    .sub(&self.template_manager.variables.epsilon_reach)
                    .sub(&expected_next);

                let rhs = SubConstraint::leaf(Inequality::new(decrease, Relation::Ge));
                constraints.push(ConstraintImplication::new(lhs.clone(), rhs));
            }
        }
    }
}

impl<'a> Constraint for StrictExpectedDecrease<'a> {
    fn extract(&self) -> Vec<ConstraintImplication> {
        let mut constraints = Vec::new();
        for dynamics in &self.system_dynamics.blocks {
            self.extract_for_dynamics(dynamics, &mut constraints);
        }
        constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Equation;
    use crate::automaton::parse_hoa;
    use crate::dynamics::NoiseVariable;
    use crate::templates::{InvariantFakeTemplate, PolicyLimits, ReachVariables};
    use std::collections::BTreeMap;

    const TWO_STATE_HOA: &str = "HOA: v1\nStart: 0\nAP: 0\nAcceptance: 1 Inf(0)\n--BODY--\nState: 0\n[t] 1\nState: 1 {0}\n[t] 1\n--END--\n";

    fn setup() -> (ReachCertificateTemplates, Automata, SystemDecomposedControlPolicy, SystemStochasticNoise, SystemDynamics) {
        let hoa = parse_hoa(TWO_STATE_HOA).unwrap();
        let automata = Automata::from_hoa(hoa, BTreeMap::new());
        let names = vec!["S1".to_string()];
        let template_manager = ReachCertificateTemplates::new(&names, 2, 1, ReachVariables::new(0.9));
        let policy = SystemDecomposedControlPolicy::synthesized(1, &names, 1, PolicyLimits::default());
        let noise = SystemStochasticNoise::new(vec![NoiseVariable {
            name: "D1".to_string(),
            min: -0.1,
            max: 0.1,
            expectation: Equation::constant(0.0),
        }]);
        let mut transform = BTreeMap::new();
        transform.insert("S1".to_string(), Equation::symbol("S1").add(&Equation::symbol("D1")));
        let dynamics = SystemDynamics::new(vec![ConditionalDynamics::new(SubConstraint::True, transform)]);
        (template_manager, automata, policy, noise, dynamics)
    }

    #[test]
    fn emits_one_implication_per_live_state_transition_and_accepting_component() {
        let (template_manager, automata, policy, noise, dynamics) = setup();
        let fake = InvariantFakeTemplate::default();
        let generator = StrictExpectedDecrease {
            template_manager: &template_manager,
            invariant: &fake,
            decomposed_control_policy: &policy,
            disturbance: &noise,
            system_dynamics: &dynamics,
            automata: &automata,
        };
        // 1 live state (state 0) * 1 accepting component (state 1) * 1 transition from state 0.
        assert_eq!(generator.extract().len(), 1);
    }

    #[test]
    fn lhs_invariant_is_keyed_by_accepting_component_not_current_state() {
        use crate::templates::RealInvariantTemplate;
        let (template_manager, automata, policy, noise, dynamics) = setup();
        let names = vec!["S1".to_string()];
        let real = RealInvariantTemplate::new(&names, 2, 1);
        let generator = StrictExpectedDecrease {
            template_manager: &template_manager,
            invariant: &real,
            decomposed_control_policy: &policy,
            disturbance: &noise,
            system_dynamics: &dynamics,
            automata: &automata,
        };
        let out = generator.extract();
        // The current (live) state is 0 but the invariant in lhs must reference state 1's coefficients.
        let lhs_names = out[0].lhs.free_names();
        let state_1_invariant = real.at(1);
        for name in state_1_invariant.free_names() {
            assert!(lhs_names.contains(&name), "expected lhs to reference {name}");
        }
    }
}
