//! Input configuration (spec.md §6): YAML or JSON describing dimensions,
//! dynamics, noise, the LTL specification, and synthesis parameters.
//!
//! Grounded in `original_source/src/system/runner_reach.py`'s `IOParser`
//! stage (directory-or-file input, `*.yaml`/`*.yml`/`*.json` glob) and the
//! pack's ambient `serde`-derived config-loading idiom (the teacher's
//! `ProofHeader`/`ProveParams`, `tinyzkp_api`'s request bodies). Every
//! string field here (`"S1 >= 0"`, `"S1 + A1 + D1"`) is parsed into the
//! algebra layer's structural types exactly once, at the `PARSE_INPUT`/
//! `PREPARE_REQS`/`CONSTRUCT_STATES` boundary — downstream stages never see
//! raw strings again (spec.md §9's "cut these hops" design note).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::algebra::{parse_equation, parse_inequality};
use crate::constraints::model::SubConstraint;
use crate::dynamics::{ConditionalDynamics, NoiseVariable, SystemDynamics, SystemSpace, SystemStochasticNoise};
use crate::error::ConfigError;
use crate::templates::PolicyLimits;

/// One noise variable as it appears in the input file.
#[derive(Debug, Clone, Deserialize)]
pub struct NoiseSpec {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub expectation: String,
}

/// One conditional-dynamics block: a guard (conjunction of inequality
/// strings, empty meaning unconditionally active) and a transform mapping
/// each state generator to its next-state expression string.
#[derive(Debug, Clone, Deserialize)]
pub struct DynamicsBlockSpec {
    #[serde(default)]
    pub guard: Vec<String>,
    pub transform: BTreeMap<String, String>,
}

/// The control-policy section: synthesis mode when `transitions` is absent,
/// verification mode when present (spec.md §8 scenario S3).
#[derive(Debug, Clone, Deserialize)]
pub struct PolicySpec {
    pub action_dimension: usize,
    #[serde(default)]
    pub transitions: Option<Vec<String>>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// The LTL specification: the formula string plus the predicate lookup
/// (atomic proposition name → conjunction of inequality strings).
#[derive(Debug, Clone, Deserialize)]
pub struct LtlSpec {
    pub formula: String,
    #[serde(default)]
    pub predicate_lookup: BTreeMap<String, Vec<String>>,
}

/// Synthesis parameters (spec.md §3's distinguished scalar constants, the
/// reach-variant subset this crate wires into the orchestrator).
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisSpec {
    pub probability_threshold: f64,
    pub maximal_polynomial_degree: u32,
    #[serde(default)]
    pub solver_degree_cap: Option<u32>,
    #[serde(default)]
    pub enable_linear_invariants: bool,
    #[serde(default)]
    pub positivstellensatz_mode: Option<String>,
}

/// The full input configuration, as deserialized directly from YAML/JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub state_generators: Vec<String>,
    pub system_space: Vec<String>,
    pub initial_space: Vec<String>,
    #[serde(default)]
    pub noise: Vec<NoiseSpec>,
    pub dynamics: Vec<DynamicsBlockSpec>,
    pub policy: PolicySpec,
    pub ltl: LtlSpec,
    pub synthesis: SynthesisSpec,
}

impl InputConfig {
    /// Load a single input file, or the lexicographically-first
    /// `*.yaml`/`*.yml`/`*.json` file in a directory (spec.md §6 / the
    /// directory-glob parity noted in SPEC_FULL.md §6.1 — a directory of
    /// many files is the out-of-scope benchmark harness's concern; this
    /// crate only ever resolves to one).
    pub fn load(path: &Path) -> Result<InputConfig, ConfigError> {
        let file_path = resolve_input_file(path)?;
        let text = fs::read_to_string(&file_path).map_err(|source| ConfigError::Io {
            path: file_path.clone(),
            source,
        })?;
        let is_json = file_path.extension().and_then(|e| e.to_str()) == Some("json");
        if is_json {
            serde_json::from_str(&text).map_err(|source| ConfigError::Deserialize {
                path: file_path.clone(),
                source: Box::new(source),
            })
        } else {
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Deserialize {
                path: file_path,
                source: Box::new(source),
            })
        }
    }

    /// Parse every string field into the algebra/dynamics structural types
    /// and validate cross-field dimensions, producing the [`InputModel`]
    /// the rest of the pipeline consumes.
    pub fn into_model(self) -> Result<InputModel, ConfigError> {
        if self.state_generators.is_empty() {
            return Err(ConfigError::MissingField("state_generators"));
        }
        if !(0.0..1.0).contains(&self.synthesis.probability_threshold) {
            return Err(ConfigError::BadProbabilityThreshold(self.synthesis.probability_threshold));
        }

        let state_names: std::collections::BTreeSet<&str> =
            self.state_generators.iter().map(String::as_str).collect();

        let system_space = SystemSpace::new(parse_region(&self.system_space)?);
        let initial_space = SystemSpace::new(parse_region(&self.initial_space)?);

        let noise_vars = self
            .noise
            .iter()
            .map(|n| {
                Ok(NoiseVariable {
                    name: n.name.clone(),
                    min: n.min,
                    max: n.max,
                    expectation: parse_equation(&n.expectation)
                        .map_err(|_| ConfigError::MissingField("noise.expectation"))?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let noise = SystemStochasticNoise::new(noise_vars);

        let mut blocks = Vec::with_capacity(self.dynamics.len());
        for block in &self.dynamics {
            let has_unknown_key = block.transform.keys().any(|k| !state_names.contains(k.as_str()));
            if has_unknown_key {
                return Err(ConfigError::DimensionMismatch {
                    field: "dynamics.transform",
                    expected: state_names.len(),
                    got: block.transform.len(),
                });
            }
            let guard = parse_region(&block.guard)?;
            let mut transform = BTreeMap::new();
            for (name, expr) in &block.transform {
                let parsed = parse_equation(expr).map_err(|_| ConfigError::DimensionMismatch {
                    field: "dynamics.transform",
                    expected: state_names.len(),
                    got: block.transform.len(),
                })?;
                transform.insert(name.clone(), parsed);
            }
            blocks.push(ConditionalDynamics::new(guard, transform));
        }
        let dynamics = SystemDynamics::new(blocks);

        let policy_mode = match &self.policy.transitions {
            Some(transitions) => {
                if transitions.len() != self.policy.action_dimension {
                    return Err(ConfigError::DimensionMismatch {
                        field: "policy.transitions",
                        expected: self.policy.action_dimension,
                        got: transitions.len(),
                    });
                }
                PolicyConfigMode::Verification { transitions: transitions.clone() }
            }
            None => PolicyConfigMode::Synthesis,
        };
        let policy_limits = PolicyLimits { min: self.policy.min, max: self.policy.max };

        let mut predicate_lookup = BTreeMap::new();
        for (name, ineqs) in &self.ltl.predicate_lookup {
            predicate_lookup.insert(name.clone(), parse_region(ineqs)?);
        }

        Ok(InputModel {
            state_generators: self.state_generators,
            system_space,
            initial_space,
            noise,
            dynamics,
            action_dimension: self.policy.action_dimension,
            policy_mode,
            policy_limits,
            ltl_formula: self.ltl.formula,
            predicate_lookup,
            synthesis: SynthesisParams {
                probability_threshold: self.synthesis.probability_threshold,
                maximal_polynomial_degree: self.synthesis.maximal_polynomial_degree,
                solver_degree_cap: self.synthesis.solver_degree_cap,
                enable_linear_invariants: self.synthesis.enable_linear_invariants,
                positivstellensatz_mode: self.synthesis.positivstellensatz_mode,
            },
        })
    }
}

fn resolve_input_file(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_dir() {
        let mut candidates: Vec<PathBuf> = fs::read_dir(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml") | Some("json")
                )
            })
            .collect();
        candidates.sort();
        candidates.into_iter().next().ok_or_else(|| ConfigError::EmptyDirectory(path.to_path_buf()))
    } else if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(ConfigError::NotFound(path.to_path_buf()))
    }
}

fn parse_region(inequalities: &[String]) -> Result<SubConstraint, ConfigError> {
    let leaves = inequalities
        .iter()
        .map(|s| parse_inequality(s).map(SubConstraint::leaf))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ConfigError::MissingField("inequality"))?;
    Ok(SubConstraint::and(leaves))
}

/// Which mode the control-policy template should be built in.
#[derive(Debug, Clone)]
pub enum PolicyConfigMode {
    Synthesis,
    Verification { transitions: Vec<String> },
}

/// Synthesis parameters, parsed and validated.
#[derive(Debug, Clone)]
pub struct SynthesisParams {
    pub probability_threshold: f64,
    pub maximal_polynomial_degree: u32,
    pub solver_degree_cap: Option<u32>,
    pub enable_linear_invariants: bool,
    pub positivstellensatz_mode: Option<String>,
}

/// The fully-parsed, validated input: everything downstream pipeline stages
/// need, with no more string parsing left to do.
#[derive(Debug, Clone)]
pub struct InputModel {
    pub state_generators: Vec<String>,
    pub system_space: SystemSpace,
    pub initial_space: SystemSpace,
    pub noise: SystemStochasticNoise,
    pub dynamics: SystemDynamics,
    pub action_dimension: usize,
    pub policy_mode: PolicyConfigMode,
    pub policy_limits: PolicyLimits,
    pub ltl_formula: String,
    pub predicate_lookup: BTreeMap<String, SubConstraint>,
    pub synthesis: SynthesisParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
state_generators: ["S1"]
system_space: ["S1 >= 0", "S1 <= 10"]
initial_space: ["S1 >= 0", "S1 <= 1"]
noise:
  - name: D1
    min: -0.1
    max: 0.1
    expectation: "0"
dynamics:
  - guard: []
    transform:
      S1: "S1 + A1 + D1"
policy:
  action_dimension: 1
  min: -1.0
  max: 1.0
ltl:
  formula: "F target"
  predicate_lookup:
    target: ["S1 >= 9"]
synthesis:
  probability_threshold: 0.9
  maximal_polynomial_degree: 2
  enable_linear_invariants: false
"#;

    #[test]
    fn loads_and_converts_a_full_yaml_document() {
        let raw: InputConfig = serde_yaml::from_str(YAML).unwrap();
        let model = raw.into_model().unwrap();
        assert_eq!(model.state_generators, vec!["S1".to_string()]);
        assert_eq!(model.system_space.region.leaves().len(), 2);
        assert_eq!(model.noise.names(), vec!["D1".to_string()]);
        assert_eq!(model.dynamics.blocks.len(), 1);
        assert!(matches!(model.policy_mode, PolicyConfigMode::Synthesis));
        assert_eq!(model.predicate_lookup.len(), 1);
    }

    #[test]
    fn rejects_probability_threshold_out_of_range() {
        let mut raw: InputConfig = serde_yaml::from_str(YAML).unwrap();
        raw.synthesis.probability_threshold = 1.0;
        let err = raw.into_model().unwrap_err();
        assert!(matches!(err, ConfigError::BadProbabilityThreshold(_)));
    }

    #[test]
    fn verification_mode_requires_matching_transition_count() {
        let mut raw: InputConfig = serde_yaml::from_str(YAML).unwrap();
        raw.policy.transitions = Some(vec!["0.5".to_string(), "0.2".to_string()]);
        let err = raw.into_model().unwrap_err();
        assert!(matches!(err, ConfigError::DimensionMismatch { .. }));
    }

    #[test]
    fn verification_mode_with_matching_count_succeeds() {
        let mut raw: InputConfig = serde_yaml::from_str(YAML).unwrap();
        raw.policy.transitions = Some(vec!["0.5".to_string()]);
        let model = raw.into_model().unwrap();
        assert!(matches!(model.policy_mode, PolicyConfigMode::Verification { .. }));
    }

    #[test]
    fn rejects_a_dynamics_transform_key_outside_state_generators() {
        let mut raw: InputConfig = serde_yaml::from_str(YAML).unwrap();
        raw.dynamics[0].transform.insert("S2".to_string(), "0".to_string());
        let err = raw.into_model().unwrap_err();
        assert!(matches!(err, ConfigError::DimensionMismatch { .. }));
    }
}
