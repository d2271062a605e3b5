//! Control-policy templates.
//!
//! Grounded in `original_source/src/system/action.py`'s
//! `SystemControlPolicy`/`SystemDecomposedControlPolicy`: synthesis mode
//! builds one fresh polynomial per action dimension (coefficients named
//! `<prefix>_<dimension>_<k>`); verification mode parses caller-supplied
//! transition strings and mints no fresh coefficients at all.

use std::collections::{BTreeMap, BTreeSet};

use crate::algebra::{monomials_up_to_degree, parse_equation, Equation, Monomial};
use crate::error::ParseError;

/// Whether a policy's coefficients are being solved for (`Synthesis`) or
/// were supplied up front for checking a fixed controller (`Verification`,
/// spec.md §8 scenario S3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMode {
    Synthesis,
    Verification,
}

/// Which "reach/Büchi head" a policy belongs to. This crate implements the
/// reach-only variant (`original_source`'s commented-out Büchi-per-
/// accepting-component heads are not built — out of this crate's scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyType {
    Reach,
}

impl PolicyType {
    pub fn prefix(self) -> &'static str {
        match self {
            PolicyType::Reach => "Pa",
        }
    }
}

/// Optional action-value bounds feeding the controller-bounds generator
/// (spec.md §4.5.1).
#[derive(Debug, Clone, Default)]
pub struct PolicyLimits {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// A single policy: one `Equation` per action dimension (1-indexed as `A1`,
/// `A2`, ... to match the dynamics/transform naming convention).
#[derive(Debug, Clone)]
pub struct SystemControlPolicy {
    pub action_dimension: usize,
    pub policy_type: PolicyType,
    pub mode: PolicyMode,
    pub transitions: Vec<Equation>,
    pub generated_constants: BTreeSet<String>,
}

impl SystemControlPolicy {
    /// Synthesis mode: build a fresh degree-`maximal_degree` polynomial per
    /// action dimension over `variable_generators`.
    pub fn synthesized(
        action_dimension: usize,
        variable_generators: &[String],
        maximal_degree: u32,
        policy_type: PolicyType,
    ) -> Self {
        let prefix = policy_type.prefix();
        let power_tuples = monomials_up_to_degree(variable_generators, maximal_degree);
        let mut transitions = Vec::with_capacity(action_dimension);
        let mut generated_constants = BTreeSet::new();

        for dim in 1..=action_dimension {
            let dim_prefix = format!("{prefix}_{dim}");
            let mut monomials = Vec::with_capacity(power_tuples.len());
            for (k, tuple) in power_tuples.iter().enumerate() {
                let coeff_name = format!("{dim_prefix}_{k}");
                generated_constants.insert(coeff_name.clone());
                let mut factors = tuple.clone();
                factors.push((coeff_name, 1));
                monomials.push(Monomial::new(1.0, factors));
            }
            transitions.push(Equation::new(monomials));
        }

        SystemControlPolicy {
            action_dimension,
            policy_type,
            mode: PolicyMode::Synthesis,
            transitions,
            generated_constants,
        }
    }

    /// Verification mode: parse caller-supplied transition strings, one per
    /// action dimension, minting no fresh coefficients.
    pub fn verified(
        action_dimension: usize,
        policy_type: PolicyType,
        transition_strings: &[String],
    ) -> Result<Self, ParseError> {
        let transitions = transition_strings
            .iter()
            .map(|s| parse_equation(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SystemControlPolicy {
            action_dimension,
            policy_type,
            mode: PolicyMode::Verification,
            transitions,
            generated_constants: BTreeSet::new(),
        })
    }

    /// Apply the policy at a given state, producing `A1 -> eq, A2 -> eq,
    /// ...`. Action dimension 0 yields the empty map.
    pub fn apply(&self) -> BTreeMap<String, Equation> {
        self.transitions
            .iter()
            .enumerate()
            .map(|(i, eq)| (format!("A{}", i + 1), eq.clone()))
            .collect()
    }
}

/// Groups one [`SystemControlPolicy`] per reach/Büchi head; this crate's
/// reach-only variant always has exactly one (`PolicyType::Reach`).
#[derive(Debug, Clone)]
pub struct SystemDecomposedControlPolicy {
    pub policies: Vec<SystemControlPolicy>,
    pub limits: PolicyLimits,
    pub generated_constants: BTreeSet<String>,
}

impl SystemDecomposedControlPolicy {
    pub fn synthesized(
        action_dimension: usize,
        variable_generators: &[String],
        maximal_degree: u32,
        limits: PolicyLimits,
    ) -> Self {
        if action_dimension == 0 {
            return SystemDecomposedControlPolicy {
                policies: Vec::new(),
                limits,
                generated_constants: BTreeSet::new(),
            };
        }
        let reach_policy = SystemControlPolicy::synthesized(
            action_dimension,
            variable_generators,
            maximal_degree,
            PolicyType::Reach,
        );
        let mut generated_constants = BTreeSet::new();
        generated_constants.extend(reach_policy.generated_constants.clone());
        SystemDecomposedControlPolicy {
            policies: vec![reach_policy],
            limits,
            generated_constants,
        }
    }

    pub fn verified(
        action_dimension: usize,
        transition_strings: &[String],
        limits: PolicyLimits,
    ) -> Result<Self, ParseError> {
        if action_dimension == 0 {
            return Ok(SystemDecomposedControlPolicy {
                policies: Vec::new(),
                limits,
                generated_constants: BTreeSet::new(),
            });
        }
        let reach_policy = SystemControlPolicy::verified(action_dimension, PolicyType::Reach, transition_strings)?;
        Ok(SystemDecomposedControlPolicy {
            policies: vec![reach_policy],
            limits,
            generated_constants: BTreeSet::new(),
        })
    }

    /// The sole reach-head policy, per `get_policy(PolicyType::REACH)` in
    /// the original (there is no Büchi-per-component head in this variant).
    pub fn reach_policy(&self) -> Option<&SystemControlPolicy> {
        self.policies.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_mode_mints_one_coefficient_set_per_action_dimension() {
        let names = vec!["S1".to_string()];
        let policy = SystemControlPolicy::synthesized(2, &names, 1, PolicyType::Reach);
        assert_eq!(policy.transitions.len(), 2);
        assert_eq!(policy.generated_constants.len(), 4); // 2 dims * 2 monomials (deg<=1, 1 var)
    }

    #[test]
    fn zero_action_dimension_yields_empty_policy_list() {
        let names = vec!["S1".to_string()];
        let decomposed = SystemDecomposedControlPolicy::synthesized(0, &names, 1, PolicyLimits::default());
        assert!(decomposed.policies.is_empty());
        assert!(decomposed.generated_constants.is_empty());
    }

    #[test]
    fn verification_mode_parses_transitions_without_minting_constants() {
        let policy = SystemControlPolicy::verified(1, PolicyType::Reach, &["0.5".to_string()]).unwrap();
        assert!(policy.generated_constants.is_empty());
        assert_eq!(policy.apply()["A1"], Equation::constant(0.5));
    }

    #[test]
    fn apply_yields_empty_map_when_action_dimension_is_zero() {
        let decomposed =
            SystemDecomposedControlPolicy::synthesized(0, &["S1".to_string()], 1, PolicyLimits::default());
        assert!(decomposed.reach_policy().is_none());
    }
}
