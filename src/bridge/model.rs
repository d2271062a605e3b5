//! The solver's output: `{ "is_sat": "sat"|"unsat"|"unknown", "model": {...}
//! }`, plus the `Pa_<suffix>` → `P_<q>_<suffix>` coefficient-name
//! normalization every non-accepting automaton state needs applied to it.
//!
//! Grounded verbatim in `original_source/src/system/runner_reach.py`'s
//! `fix_model_output`: the synthesized policy is a single shared polynomial
//! (`Pa_<dim>_<k>`), but the certificate/invariant construction treats each
//! automaton state's controller as though it had its own copy, so every
//! solved `Pa_` coefficient is re-emitted once per non-accepting state under
//! the `P_<q>_` prefix before being handed back to the caller.

use std::collections::BTreeMap;

use serde::Deserialize;

/// The solver's verdict: `sat`, `unsat`, or `unknown` — spec.md §7 treats
/// `unsat`/`unknown` as ordinary completed outcomes, never a
/// [`crate::error::PipelineError`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SolverOutcome {
    pub is_sat: String,
    #[serde(default)]
    pub model: BTreeMap<String, f64>,
}

impl SolverOutcome {
    pub fn is_satisfiable(&self) -> bool {
        self.is_sat == "sat"
    }
}

/// Rewrite every `Pa_<suffix>` key in `model` into `P_<q>_<suffix>` for each
/// id in `non_accepting_states`, leaving every other key untouched. Matches
/// `fix_model_output`'s behavior exactly: the original `Pa_` keys are
/// dropped from the output, not kept alongside the rewritten ones.
pub fn normalize_model(model: &BTreeMap<String, f64>, non_accepting_states: &[usize]) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    for (name, value) in model {
        match name.strip_prefix("Pa_") {
            Some(suffix) => {
                for &q in non_accepting_states {
                    out.insert(format!("P_{q}_{suffix}"), *value);
                }
            }
            None => {
                out.insert(name.clone(), *value);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_sat_result() {
        let json = r#"{"is_sat": "sat", "model": {"V_reach_0_0": 1.0}}"#;
        let outcome: SolverOutcome = serde_json::from_str(json).unwrap();
        assert!(outcome.is_satisfiable());
        assert_eq!(outcome.model["V_reach_0_0"], 1.0);
    }

    #[test]
    fn unsat_result_has_no_model_and_is_not_satisfiable() {
        let json = r#"{"is_sat": "unsat"}"#;
        let outcome: SolverOutcome = serde_json::from_str(json).unwrap();
        assert!(!outcome.is_satisfiable());
        assert!(outcome.model.is_empty());
    }

    #[test]
    fn normalize_model_rewrites_pa_keys_per_non_accepting_state() {
        let mut model = BTreeMap::new();
        model.insert("Pa_1_0".to_string(), 0.5);
        model.insert("V_reach_0_0".to_string(), 1.0);
        let normalized = normalize_model(&model, &[0, 2]);
        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized["P_0_1_0"], 0.5);
        assert_eq!(normalized["P_2_1_0"], 0.5);
        assert_eq!(normalized["V_reach_0_0"], 1.0);
        assert!(!normalized.contains_key("Pa_1_0"));
    }

    #[test]
    fn normalize_model_leaves_non_pa_keys_untouched_when_no_non_accepting_states() {
        let mut model = BTreeMap::new();
        model.insert("Epsilon_reach".to_string(), 1e-10);
        let normalized = normalize_model(&model, &[]);
        assert_eq!(normalized, model);
    }
}
