//! Invariant templates: an auxiliary non-negative polynomial per automaton
//! state, strengthening the Positivstellensatz deduction (spec.md §3, §4.5).
//! Can be disabled (`InvariantFakeTemplate`) via `enable_linear_invariants`,
//! in which case it contributes the trivially-true constraint everywhere
//! and mints no coefficients (spec.md §8 scenario S5).

use std::collections::BTreeSet;

use crate::algebra::Equation;
use crate::constraints::model::SubConstraint;

use super::certificate::{CertificateTemplate, CertificateTemplateType};

/// `Inv(S, q) >= 0` for a given automaton state, behind a shared interface
/// so generators don't need to know whether invariants are enabled.
pub trait InvariantTemplate {
    fn at(&self, state: usize) -> Equation;
    fn generated_constants(&self) -> &BTreeSet<String>;

    /// `Inv(S, q) >= 0` as a ready-to-use `SubConstraint` leaf/true value.
    fn constraint_at(&self, state: usize) -> SubConstraint {
        use crate::algebra::{Inequality, Relation};
        let eq = self.at(state);
        if eq.is_zero() {
            return SubConstraint::True;
        }
        SubConstraint::leaf(Inequality::new(eq, Relation::Ge))
    }
}

/// Disabled invariants: `⊤` for every state, zero coefficients —
/// `original_source`'s `InvariantFakeTemplate`.
#[derive(Debug, Clone, Default)]
pub struct InvariantFakeTemplate {
    empty: BTreeSet<String>,
}

impl InvariantTemplate for InvariantFakeTemplate {
    fn at(&self, _state: usize) -> Equation {
        Equation::zero()
    }

    fn generated_constants(&self) -> &BTreeSet<String> {
        &self.empty
    }
}

/// Enabled invariants: one real polynomial per automaton state, built with
/// the same per-state template machinery as the certificate
/// (`CertificateTemplateType::Safe`'s shape reused for `Inv`, since both are
/// "one polynomial per state" — the original's `InvariantTemplate` mirrors
/// `CertificateTemplate` structurally).
#[derive(Debug, Clone)]
pub struct RealInvariantTemplate {
    inner: CertificateTemplate,
}

impl RealInvariantTemplate {
    pub fn new(variable_generators: &[String], abstraction_dimension: usize, maximal_polynomial_degree: u32) -> Self {
        RealInvariantTemplate {
            inner: CertificateTemplate::new(
                CertificateTemplateType::Safe,
                variable_generators,
                abstraction_dimension,
                maximal_polynomial_degree,
            ),
        }
    }
}

impl InvariantTemplate for RealInvariantTemplate {
    fn at(&self, state: usize) -> Equation {
        self.inner.for_state(state).clone()
    }

    fn generated_constants(&self) -> &BTreeSet<String> {
        &self.inner.generated_constants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_template_contributes_no_coefficients_and_is_trivially_true() {
        let fake = InvariantFakeTemplate::default();
        assert!(fake.generated_constants().is_empty());
        assert!(fake.constraint_at(0).is_trivially_true());
    }

    #[test]
    fn real_template_has_one_polynomial_per_state() {
        let names = vec!["S1".to_string()];
        let real = RealInvariantTemplate::new(&names, 2, 1);
        assert!(!real.at(0).is_zero() || !real.generated_constants().is_empty());
        assert_ne!(real.at(0), real.at(1));
    }
}
