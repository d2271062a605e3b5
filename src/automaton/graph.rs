//! The in-memory LDBA: states, transitions, accepting components, and the
//! predicate lookup table used to expand transition labels into polynomial
//! regions. Built from a [`ParsedHoa`] plus the predicate lookup parsed out
//! of the input configuration.

use std::collections::BTreeMap;

use crate::constraints::model::SubConstraint;
use crate::error::ModelError;

use super::hoa::{HoaState, LabelExpr, ParsedHoa};

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub label: LabelExpr,
    pub dest: usize,
    pub acc_sets: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutomatonState {
    pub id: usize,
    pub acc_sets: Vec<u32>,
    pub transitions: Vec<Transition>,
}

impl AutomatonState {
    /// A state "participates in Büchi acceptance" (is part of an accepting
    /// component) iff some outgoing transition carries a non-empty
    /// acceptance-set marking — the Inf(0) condition is satisfied by
    /// infinitely often traversing such a transition.
    pub fn is_accepting(&self) -> bool {
        self.transitions.iter().any(|t| !t.acc_sets.is_empty())
    }

    /// A rejecting (trap) state: every outgoing transition is a self-loop
    /// and the state is not accepting — a run that enters it can never
    /// satisfy the specification.
    pub fn is_rejecting(&self) -> bool {
        !self.is_accepting() && !self.transitions.is_empty() && self.transitions.iter().all(|t| t.dest == self.id)
    }
}

/// The LDBA: states indexed by id 0..N-1, a start state, and the predicate
/// lookup table used by [`Automata::expand_guard`].
#[derive(Debug, Clone)]
pub struct Automata {
    pub states: Vec<AutomatonState>,
    pub start_state: usize,
    pub atomic_propositions: Vec<String>,
    predicate_lookup: BTreeMap<String, SubConstraint>,
}

impl Automata {
    /// Build from a parsed HOA document and a predicate lookup table
    /// (atomic proposition name → the region, already built as a
    /// `SubConstraint`, where it holds).
    pub fn from_hoa(hoa: ParsedHoa, predicate_lookup: BTreeMap<String, SubConstraint>) -> Self {
        let states = hoa
            .states
            .into_iter()
            .map(|s: HoaState| AutomatonState {
                id: s.id,
                acc_sets: s.acc_sets,
                transitions: s
                    .transitions
                    .into_iter()
                    .map(|t| Transition {
                        label: t.label,
                        dest: t.dest,
                        acc_sets: t.acc_sets,
                    })
                    .collect(),
            })
            .collect();
        Automata {
            states,
            start_state: hoa.start_state,
            atomic_propositions: hoa.atomic_propositions,
            predicate_lookup,
        }
    }

    pub fn state(&self, id: usize) -> Option<&AutomatonState> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn is_accepting(&self, id: usize) -> bool {
        self.state(id).map(AutomatonState::is_accepting).unwrap_or(false)
    }

    pub fn is_rejecting(&self, id: usize) -> bool {
        self.state(id).map(AutomatonState::is_rejecting).unwrap_or(false)
    }

    pub fn transitions_from(&self, id: usize) -> &[Transition] {
        self.state(id).map(|s| s.transitions.as_slice()).unwrap_or(&[])
    }

    /// Ids of every state that participates in an accepting component, in
    /// ascending order.
    pub fn accepting_component_ids(&self) -> Vec<usize> {
        self.states.iter().filter(|s| s.is_accepting()).map(|s| s.id).collect()
    }

    /// Ids of every non-accepting, non-rejecting state, ascending — the
    /// iteration set for the strict-expected-decrease generator
    /// (spec.md §4.5.3).
    pub fn live_non_accepting_ids(&self) -> Vec<usize> {
        self.states
            .iter()
            .filter(|s| !s.is_accepting() && !s.is_rejecting())
            .map(|s| s.id)
            .collect()
    }

    /// Expand a transition label into a polynomial region: an atomic
    /// proposition substitutes its looked-up region; `And`/`Or` distribute
    /// into conjunction/disjunction; `True` is the trivially-true region.
    /// Negation is only supported directly on an atomic proposition —
    /// negating a compound sub-expression is rejected, per spec.md §4.2's
    /// "negation of a region is not supported" restriction on non-atomic
    /// regions.
    pub fn expand_guard(&self, label: &LabelExpr) -> Result<SubConstraint, ModelError> {
        match label {
            LabelExpr::True => Ok(SubConstraint::True),
            LabelExpr::Ap(idx) => self.lookup_ap(*idx),
            LabelExpr::And(terms) => {
                let expanded: Result<Vec<_>, _> = terms.iter().map(|t| self.expand_guard(t)).collect();
                Ok(SubConstraint::and(expanded?))
            }
            LabelExpr::Or(terms) => {
                let expanded: Result<Vec<_>, _> = terms.iter().map(|t| self.expand_guard(t)).collect();
                Ok(SubConstraint::or(expanded?))
            }
            LabelExpr::Not(inner) => match inner.as_ref() {
                LabelExpr::Ap(idx) => self.negate_ap(*idx),
                LabelExpr::True => Ok(SubConstraint::or(vec![])), // !true: unsatisfiable region, no solutions
                other => Err(ModelError::UnsupportedNegatedLabel {
                    label: format!("{other:?}"),
                }),
            },
        }
    }

    fn lookup_ap(&self, idx: usize) -> Result<SubConstraint, ModelError> {
        let name = self
            .atomic_propositions
            .get(idx)
            .ok_or_else(|| ModelError::UnknownPredicate(format!("AP index {idx}")))?;
        self.predicate_lookup
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownPredicate(name.clone()))
    }

    fn negate_ap(&self, idx: usize) -> Result<SubConstraint, ModelError> {
        let region = self.lookup_ap(idx)?;
        match region {
            SubConstraint::True => Ok(SubConstraint::or(vec![])),
            SubConstraint::Leaf(ineq) => Ok(SubConstraint::leaf(ineq.negate())),
            SubConstraint::Clause { aggregation, terms } => {
                use crate::constraints::model::Aggregation;
                let negated_terms: Vec<SubConstraint> = terms
                    .into_iter()
                    .map(|t| match t {
                        SubConstraint::Leaf(ineq) => SubConstraint::leaf(ineq.negate()),
                        other => other,
                    })
                    .collect();
                match aggregation {
                    Aggregation::And => Ok(SubConstraint::or(negated_terms)),
                    Aggregation::Or => Ok(SubConstraint::and(negated_terms)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Equation, Inequality, Relation};
    use crate::automaton::hoa::parse_hoa;

    const SAMPLE: &str = r#"HOA: v1
Start: 0
AP: 1 "target"
Acceptance: 1 Inf(0)
--BODY--
State: 0
[!0] 0
[0] 1
State: 1 {0}
[t] 1
--END--
"#;

    fn sample_automata() -> Automata {
        let hoa = parse_hoa(SAMPLE).unwrap();
        let mut lookup = BTreeMap::new();
        lookup.insert(
            "target".to_string(),
            SubConstraint::leaf(Inequality::comparing(&Equation::symbol("S1"), Relation::Ge, &Equation::constant(9.0))),
        );
        Automata::from_hoa(hoa, lookup)
    }

    #[test]
    fn state_one_is_accepting_state_zero_is_not() {
        let automata = sample_automata();
        assert!(!automata.is_accepting(0));
        assert!(automata.is_accepting(1));
    }

    #[test]
    fn no_state_is_rejecting_in_this_two_state_example() {
        let automata = sample_automata();
        assert!(!automata.is_rejecting(0));
        assert!(!automata.is_rejecting(1));
    }

    #[test]
    fn live_non_accepting_ids_excludes_the_accepting_state() {
        let automata = sample_automata();
        assert_eq!(automata.live_non_accepting_ids(), vec![0]);
    }

    #[test]
    fn expand_guard_substitutes_atomic_proposition_region() {
        let automata = sample_automata();
        let label = automata.transitions_from(0)[1].label.clone();
        let region = automata.expand_guard(&label).unwrap();
        assert_eq!(region.leaves().len(), 1);
    }

    #[test]
    fn expand_guard_negates_an_atomic_region_via_de_morgan() {
        let automata = sample_automata();
        let label = automata.transitions_from(0)[0].label.clone();
        let region = automata.expand_guard(&label).unwrap();
        let leaf = &region.leaves()[0];
        assert_eq!(leaf.relation, Relation::Le);
    }

    #[test]
    fn expand_guard_rejects_negation_of_a_compound_region() {
        let automata = sample_automata();
        let compound = LabelExpr::Not(Box::new(LabelExpr::And(vec![LabelExpr::Ap(0), LabelExpr::Ap(0)])));
        assert!(matches!(automata.expand_guard(&compound), Err(ModelError::UnsupportedNegatedLabel { .. })));
    }
}
