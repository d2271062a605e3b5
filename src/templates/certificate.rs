//! Certificate template construction: one polynomial per automaton state,
//! fresh coefficients named `<signature>_<state>_<k>`.
//!
//! Grounded in `original_source/src/system/certificate/template.py`'s
//! `CertificateTemplate._initialize_templates`: a coefficient is just
//! another factor (power 1) appended to the state-generator list inside
//! each monomial, enumerated in the same fixed order the solver will see
//! them again at `declare-const` time.

use std::collections::BTreeSet;

use crate::algebra::{monomials_up_to_degree, Equation, Monomial};

/// Which certificate shape a [`CertificateTemplate`] was built for — mirrors
/// `CertificateTemplateType` (`REACH`/`SAFE`); only `Reach` has any active
/// constraint generator in this crate (see spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateTemplateType {
    Reach,
    Safe,
}

impl CertificateTemplateType {
    pub fn signature(self) -> &'static str {
        match self {
            CertificateTemplateType::Reach => "V_reach",
            CertificateTemplateType::Safe => "V_safe",
        }
    }
}

/// One polynomial template per automaton state (0..abstraction_dimension-1),
/// all sharing `variable_generators` (the state dimensions) and the
/// template's fresh coefficient names.
#[derive(Debug, Clone)]
pub struct CertificateTemplate {
    pub template_type: CertificateTemplateType,
    pub sub_templates: Vec<Equation>,
    pub generated_constants: BTreeSet<String>,
}

impl CertificateTemplate {
    pub fn new(
        template_type: CertificateTemplateType,
        variable_generators: &[String],
        abstraction_dimension: usize,
        maximal_polynomial_degree: u32,
    ) -> Self {
        let signature = template_type.signature();
        let power_tuples = monomials_up_to_degree(variable_generators, maximal_polynomial_degree);

        let mut sub_templates = Vec::with_capacity(abstraction_dimension);
        let mut generated_constants = BTreeSet::new();

        for state in 0..abstraction_dimension {
            let prefix = format!("{signature}_{state}");
            let mut monomials = Vec::with_capacity(power_tuples.len());
            for (k, tuple) in power_tuples.iter().enumerate() {
                let coeff_name = format!("{prefix}_{k}");
                generated_constants.insert(coeff_name.clone());
                let mut factors = tuple.clone();
                factors.push((coeff_name, 1));
                monomials.push(Monomial::new(1.0, factors));
            }
            sub_templates.push(Equation::new(monomials));
        }

        CertificateTemplate {
            template_type,
            sub_templates,
            generated_constants,
        }
    }

    pub fn for_state(&self, state: usize) -> &Equation {
        &self.sub_templates[state]
    }
}

/// The reach-variant scalar synthesis constants: `epsilon_reach` only
/// (spec.md §3; `original_source`'s `ReachCertificateVariables`, with every
/// reach-avoid-only field commented out upstream).
#[derive(Debug, Clone)]
pub struct ReachVariables {
    pub probability_threshold: f64,
    pub epsilon_reach: Equation,
    pub generated_constants: BTreeSet<String>,
}

impl ReachVariables {
    pub fn new(probability_threshold: f64) -> Self {
        let mut generated_constants = BTreeSet::new();
        generated_constants.insert("Epsilon_reach".to_string());
        ReachVariables {
            probability_threshold,
            epsilon_reach: Equation::symbol("Epsilon_reach"),
            generated_constants,
        }
    }
}

/// The reach-avoid-variant scalar synthesis constants, including the
/// eagerly-evaluated bound `eta_epsilon_upper = 1e-15 + delta_safe^2 *
/// ln(1 - tau) / 8` (spec.md §9's "evaluate eagerly in double precision"
/// design note — this is a plain `f64`, never a symbolic log/pow).
#[derive(Debug, Clone)]
pub struct ReachAvoidVariables {
    pub probability_threshold: f64,
    pub delta_safe: f64,
    pub epsilon_reach: Equation,
    pub epsilon_safe: Equation,
    pub beta_safe: Equation,
    pub eta_safe: Equation,
    pub eta_epsilon_upper_bound: f64,
    pub generated_constants: BTreeSet<String>,
}

impl ReachAvoidVariables {
    pub fn new(probability_threshold: f64, delta_safe: f64) -> Self {
        let eta_epsilon_upper_bound =
            1e-15 + delta_safe.powi(2) * (1.0 - probability_threshold).ln() / 8.0;
        let mut generated_constants = BTreeSet::new();
        for name in ["Epsilon_reach", "Epsilon_safe", "Beta_safe", "Eta_safe"] {
            generated_constants.insert(name.to_string());
        }
        ReachAvoidVariables {
            probability_threshold,
            delta_safe,
            epsilon_reach: Equation::symbol("Epsilon_reach"),
            epsilon_safe: Equation::symbol("Epsilon_safe"),
            beta_safe: Equation::symbol("Beta_safe"),
            eta_safe: Equation::symbol("Eta_safe"),
            eta_epsilon_upper_bound,
            generated_constants,
        }
    }
}

/// The reach variant's full template bundle — always constructed, since
/// `V_reach` is part of the core pipeline regardless of which variable
/// bundle is selected.
#[derive(Debug, Clone)]
pub struct ReachCertificateTemplates {
    pub variables: ReachVariables,
    pub template: CertificateTemplate,
    pub generated_constants: BTreeSet<String>,
}

impl ReachCertificateTemplates {
    pub fn new(
        variable_generators: &[String],
        abstraction_dimension: usize,
        maximal_polynomial_degree: u32,
        variables: ReachVariables,
    ) -> Self {
        let template = CertificateTemplate::new(
            CertificateTemplateType::Reach,
            variable_generators,
            abstraction_dimension,
            maximal_polynomial_degree,
        );
        let mut generated_constants = variables.generated_constants.clone();
        generated_constants.extend(template.generated_constants.clone());
        ReachCertificateTemplates {
            variables,
            template,
            generated_constants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_sub_template_per_automaton_state() {
        let names = vec!["S1".to_string()];
        let template = CertificateTemplate::new(CertificateTemplateType::Reach, &names, 3, 1);
        assert_eq!(template.sub_templates.len(), 3);
    }

    #[test]
    fn coefficient_names_are_disjoint_across_states() {
        let names = vec!["S1".to_string()];
        let template = CertificateTemplate::new(CertificateTemplateType::Reach, &names, 2, 2);
        assert_eq!(template.generated_constants.len(), 6); // 2 states * 3 monomials (deg <=2, 1 var)
    }

    #[test]
    fn reach_avoid_bound_is_evaluated_eagerly_as_a_plain_number() {
        let vars = ReachAvoidVariables::new(0.9, 1.0);
        let expected = 1e-15 + (1.0f64).powi(2) * (0.1f64).ln() / 8.0;
        assert!((vars.eta_epsilon_upper_bound - expected).abs() < 1e-20);
    }

    #[test]
    fn reach_variant_only_declares_epsilon_reach() {
        let vars = ReachVariables::new(0.9);
        assert_eq!(vars.generated_constants.len(), 1);
        assert!(vars.generated_constants.contains("Epsilon_reach"));
    }
}
