//! The linear staging pipeline (spec.md §4.7): `PARSE_INPUT → PREPARE_REQS →
//! CONSTRUCT_STATES → POLICY_PREP → SYNTHESIZE_INVARIANTS →
//! SYNTHESIZE_TEMPLATE → GENERATE_CONSTRAINTS → PREPARE_SOLVER_INPUTS →
//! RUN_SOLVER → DONE`, each phase executed exactly once in order.
//!
//! Grounded in `original_source/src/system/runner_reach.py`'s `Runner`
//! dataclass, with the two redesigns spec.md §9 calls for: the Python
//! `stage_runners` dict (dynamic attribute dispatch keyed by a `RunningStage`
//! enum) becomes a fixed sequence of plain functions dispatched by a `match`
//! over [`Stage`]; the Python `history` dict (mutated in place by every
//! stage) becomes [`RunContext`], a record where each stage sets exactly the
//! fields it owns and nothing already set is ever overwritten.
//!
//! One deliberate deviation from the Python stage boundaries: the original's
//! `SYNTHESIZE_INVARIANTS` stage both builds the invariant template *and*
//! runs the initial/inductive invariant constraint generators. Since
//! `ModelError` (raised only by `InvariantInductive::try_extract`, via
//! `Automata::expand_guard`) is fatal at `GENERATE_CONSTRAINTS` per spec.md
//! §7, this crate builds the template at `SYNTHESIZE_INVARIANTS` and defers
//! running its constraint generators to `GENERATE_CONSTRAINTS`, alongside
//! every other generator — so the one stage that can raise `ModelError` is
//! the one spec.md names.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::algebra::Equation;
use crate::automaton::{parse_hoa, Automata};
use crate::bridge::{render_document, HornSolver, SolverConfig, SolverOutcome};
use crate::config::{InputConfig, InputModel, PolicyConfigMode};
use crate::constraints::{
    Constraint, ConstraintConstant, ConstraintImplication, ControllerBounds, InvariantInductive, InvariantInitial,
    NonNegativity, ReachSanity, StrictExpectedDecrease,
};
use crate::error::PipelineError;
use crate::ltl::LdbaTranslator;
use crate::templates::{
    InvariantFakeTemplate, InvariantTemplate, PolicyType, ReachCertificateTemplates, ReachVariables,
    RealInvariantTemplate, SystemControlPolicy, SystemDecomposedControlPolicy,
};

/// The ten phases of spec.md §4.7, in the order they execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParseInput,
    PrepareReqs,
    ConstructStates,
    PolicyPrep,
    SynthesizeInvariants,
    SynthesizeTemplate,
    GenerateConstraints,
    PrepareSolverInputs,
    RunSolver,
    Done,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Stage::ParseInput => "PARSE_INPUT",
            Stage::PrepareReqs => "PREPARE_REQS",
            Stage::ConstructStates => "CONSTRUCT_STATES",
            Stage::PolicyPrep => "POLICY_PREP",
            Stage::SynthesizeInvariants => "SYNTHESIZE_INVARIANTS",
            Stage::SynthesizeTemplate => "SYNTHESIZE_TEMPLATE",
            Stage::GenerateConstraints => "GENERATE_CONSTRAINTS",
            Stage::PrepareSolverInputs => "PREPARE_SOLVER_INPUTS",
            Stage::RunSolver => "RUN_SOLVER",
            Stage::Done => "DONE",
        }
    }
}

/// `PREPARE_REQS`'s lightweight output: the atomic-proposition universe the
/// LTL translator needs, read off the already-parsed predicate lookup.
#[derive(Debug, Clone)]
pub struct PreparedRequirements {
    pub atomic_propositions: Vec<String>,
}

/// `CONSTRUCT_STATES`'s output: the raw HOA text (persisted to
/// `ltl2ldba.hoa`) and the in-memory automaton built from it.
#[derive(Debug, Clone)]
pub struct ConstructedStates {
    pub hoa_text: String,
    pub automata: Automata,
}

/// `GENERATE_CONSTRAINTS`'s output: every universally-quantified implication
/// and bare constant emitted by the active generator set (spec.md §4.5),
/// in the fixed, deterministic order spec.md §5 requires.
#[derive(Debug, Clone, Default)]
pub struct GeneratedConstraints {
    pub implications: Vec<ConstraintImplication>,
    pub constants: Vec<ConstraintConstant>,
}

/// `PREPARE_SOLVER_INPUTS`'s output: the rendered SMT-LIB text and the
/// solver configuration record, ready to hand to a [`HornSolver`].
#[derive(Debug, Clone)]
pub struct PreparedSolverInputs {
    pub coefficient_names: BTreeSet<String>,
    pub smt2_text: String,
    pub solver_config: SolverConfig,
}

/// `RUN_SOLVER`'s output: the solver's raw verdict plus the normalized
/// coefficient map (spec.md §4.6's `Pa_` → `P_<q>_` rewrite).
#[derive(Debug, Clone)]
pub struct SolverRun {
    pub outcome: SolverOutcome,
    pub normalized_model: BTreeMap<String, f64>,
}

/// The append-only record threaded through every stage. Each field is set by
/// exactly one stage and is never mutated afterward (spec.md §9's "typed
/// record" redesign) — a stage failure leaves every field set so far intact
/// and readable for diagnostics (spec.md §4.7).
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub input: Option<InputModel>,
    pub requirements: Option<PreparedRequirements>,
    pub states: Option<ConstructedStates>,
    pub control_policy: Option<SystemDecomposedControlPolicy>,
    pub invariant_generated_constants: BTreeSet<String>,
    pub template: Option<ReachCertificateTemplates>,
    pub constraints: Option<GeneratedConstraints>,
    pub solver_inputs: Option<PreparedSolverInputs>,
    pub solver_run: Option<SolverRun>,
}

/// Drives the ten-phase pipeline over a single input document.
///
/// Single-threaded and sequential (spec.md §5): `RUN_SOLVER` is the only
/// phase that blocks on a child process, via whichever [`HornSolver`] was
/// configured (the real external binary, or [`crate::bridge::FixtureHornSolver`]
/// under the `fixture-collaborators` feature).
pub struct Runner {
    pub output_dir: PathBuf,
    pub translator: Box<dyn LdbaTranslator>,
    pub solver: Box<dyn HornSolver>,
    pub context: RunContext,
}

impl Runner {
    pub fn new(output_dir: impl Into<PathBuf>, translator: Box<dyn LdbaTranslator>, solver: Box<dyn HornSolver>) -> Self {
        Runner {
            output_dir: output_dir.into(),
            translator,
            solver,
            context: RunContext::default(),
        }
    }

    /// Run every phase in order, terminal-on-error: the first failing stage
    /// returns immediately, leaving `self.context` populated up to (not
    /// including) the failing phase.
    pub fn run(&mut self, input_path: &Path) -> Result<&RunContext, PipelineError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| crate::error::ConfigError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        self.run_parse_input(input_path)?;
        self.run_prepare_reqs()?;
        self.run_construct_states()?;
        self.run_policy_prep()?;
        self.run_synthesize_invariants()?;
        self.run_synthesize_template()?;
        let invariant = self.take_invariant_for_constraints()?;
        self.run_generate_constraints(invariant.as_ref())?;
        self.run_prepare_solver_inputs(invariant.as_ref())?;
        self.run_run_solver()?;

        info!(stage = Stage::Done.name(), "pipeline complete");
        Ok(&self.context)
    }

    fn run_parse_input(&mut self, input_path: &Path) -> Result<(), PipelineError> {
        info!(stage = Stage::ParseInput.name(), path = %input_path.display(), "stage started");
        let raw = InputConfig::load(input_path)?;
        let model = raw.into_model()?;
        debug!(
            stage = Stage::ParseInput.name(),
            state_dim = model.state_generators.len(),
            action_dim = model.action_dimension,
            "parsed input model"
        );
        self.context.input = Some(model);
        info!(stage = Stage::ParseInput.name(), "stage completed");
        Ok(())
    }

    fn run_prepare_reqs(&mut self) -> Result<(), PipelineError> {
        info!(stage = Stage::PrepareReqs.name(), "stage started");
        let model = self.input()?;
        let atomic_propositions: Vec<String> = model.predicate_lookup.keys().cloned().collect();
        debug!(
            stage = Stage::PrepareReqs.name(),
            atomic_propositions = atomic_propositions.len(),
            "derived atomic proposition universe"
        );
        self.context.requirements = Some(PreparedRequirements { atomic_propositions });
        info!(stage = Stage::PrepareReqs.name(), "stage completed");
        Ok(())
    }

    fn run_construct_states(&mut self) -> Result<(), PipelineError> {
        info!(stage = Stage::ConstructStates.name(), "stage started");
        let model = self.input()?;
        let requirements = self
            .context
            .requirements
            .as_ref()
            .expect("PrepareReqs always runs before ConstructStates");

        let hoa_text = self
            .translator
            .translate(&model.ltl_formula, &requirements.atomic_propositions)?;
        fs::write(self.output_dir.join("ltl2ldba.hoa"), &hoa_text).map_err(|source| crate::error::ConfigError::Io {
            path: self.output_dir.join("ltl2ldba.hoa"),
            source,
        })?;

        let parsed = parse_hoa(&hoa_text).map_err(|source| PipelineError::Parse {
            stage: "ConstructStates",
            source,
        })?;
        let automata = Automata::from_hoa(parsed, model.predicate_lookup.clone());
        info!(stage = Stage::ConstructStates.name(), detail = %automata.to_detailed_string(), "constructed LDBA");

        self.context.states = Some(ConstructedStates { hoa_text, automata });
        info!(stage = Stage::ConstructStates.name(), "stage completed");
        Ok(())
    }

    fn run_policy_prep(&mut self) -> Result<(), PipelineError> {
        info!(stage = Stage::PolicyPrep.name(), "stage started");
        let model = self.input()?;
        let policy = match &model.policy_mode {
            PolicyConfigMode::Synthesis => SystemDecomposedControlPolicy::synthesized(
                model.action_dimension,
                &model.state_generators,
                model.synthesis.maximal_polynomial_degree,
                model.policy_limits.clone(),
            ),
            PolicyConfigMode::Verification { transitions } => SystemDecomposedControlPolicy::verified(
                model.action_dimension,
                transitions,
                model.policy_limits.clone(),
            )
            .map_err(|source| PipelineError::Parse {
                stage: "PolicyPrep",
                source,
            })?,
        };
        debug!(
            stage = Stage::PolicyPrep.name(),
            coefficients = policy.generated_constants.len(),
            "prepared control policy"
        );
        self.context.control_policy = Some(policy);
        info!(stage = Stage::PolicyPrep.name(), "stage completed");
        Ok(())
    }

    fn run_synthesize_invariants(&mut self) -> Result<(), PipelineError> {
        info!(stage = Stage::SynthesizeInvariants.name(), "stage started");
        let model = self.input()?;
        if !model.synthesis.enable_linear_invariants {
            info!(stage = Stage::SynthesizeInvariants.name(), "linear invariants disabled, using fake template");
            self.context.invariant_generated_constants = BTreeSet::new();
            info!(stage = Stage::SynthesizeInvariants.name(), "stage completed");
            return Ok(());
        }
        let abstraction_dimension = self.states()?.automata.states.len();
        let invariant = RealInvariantTemplate::new(
            &model.state_generators,
            abstraction_dimension,
            model.synthesis.maximal_polynomial_degree,
        );
        debug!(
            stage = Stage::SynthesizeInvariants.name(),
            coefficients = invariant.generated_constants().len(),
            "synthesized real invariant template"
        );
        self.context.invariant_generated_constants = invariant.generated_constants().clone();
        info!(stage = Stage::SynthesizeInvariants.name(), "stage completed");
        Ok(())
    }

    /// Rebuilds the concrete [`InvariantTemplate`] `GENERATE_CONSTRAINTS` and
    /// `PREPARE_SOLVER_INPUTS` need, from the flag already validated at
    /// `SYNTHESIZE_INVARIANTS`. Cheap: the fake template is a unit struct,
    /// and the real one is pure functions of data already on the context.
    fn take_invariant_for_constraints(&self) -> Result<Box<dyn InvariantTemplate>, PipelineError> {
        let model = self.input()?;
        if !model.synthesis.enable_linear_invariants {
            return Ok(Box::new(InvariantFakeTemplate::default()));
        }
        let abstraction_dimension = self.states()?.automata.states.len();
        Ok(Box::new(RealInvariantTemplate::new(
            &model.state_generators,
            abstraction_dimension,
            model.synthesis.maximal_polynomial_degree,
        )))
    }

    fn run_synthesize_template(&mut self) -> Result<(), PipelineError> {
        info!(stage = Stage::SynthesizeTemplate.name(), "stage started");
        let model = self.input()?;
        let abstraction_dimension = self.states()?.automata.states.len();
        let variables = ReachVariables::new(model.synthesis.probability_threshold);
        let template = ReachCertificateTemplates::new(
            &model.state_generators,
            abstraction_dimension,
            model.synthesis.maximal_polynomial_degree,
            variables,
        );
        debug!(
            stage = Stage::SynthesizeTemplate.name(),
            coefficients = template.generated_constants.len(),
            "synthesized certificate templates"
        );
        self.context.template = Some(template);
        info!(stage = Stage::SynthesizeTemplate.name(), "stage completed");
        Ok(())
    }

    fn run_generate_constraints(&mut self, invariant: &dyn InvariantTemplate) -> Result<(), PipelineError> {
        info!(stage = Stage::GenerateConstraints.name(), "stage started");
        let model = self.input()?;
        let states = self.states()?;
        let policy = self.control_policy()?;
        let template = self.template()?;

        let mut implications = Vec::new();

        let non_negativity = NonNegativity {
            template_manager: template,
            invariant,
            system_space: &model.system_space,
            automata: &states.automata,
        };
        implications.extend(non_negativity.extract());

        let strict_decrease = StrictExpectedDecrease {
            template_manager: template,
            invariant,
            decomposed_control_policy: policy,
            disturbance: &model.noise,
            system_dynamics: &model.dynamics,
            automata: &states.automata,
        };
        implications.extend(strict_decrease.extract());

        let controller_bounds = ControllerBounds::new(&model.system_space, policy);
        implications.extend(controller_bounds.extract());

        let invariant_initial = InvariantInitial {
            invariant,
            system_space: &model.system_space,
            initial_space: &model.initial_space,
            automata: &states.automata,
        };
        implications.extend(invariant_initial.extract());

        let invariant_inductive = InvariantInductive {
            invariant,
            system_space: &model.system_space,
            decomposed_control_policy: policy,
            disturbance: &model.noise,
            system_dynamics: &model.dynamics,
            automata: &states.automata,
        };
        implications.extend(invariant_inductive.try_extract()?);

        let reach_sanity = ReachSanity {
            variables: &template.variables,
        };
        let constants = reach_sanity.extract();

        debug!(
            stage = Stage::GenerateConstraints.name(),
            implications = implications.len(),
            constants = constants.len(),
            "generated constraints"
        );
        self.context.constraints = Some(GeneratedConstraints { implications, constants });
        info!(stage = Stage::GenerateConstraints.name(), "stage completed");
        Ok(())
    }

    fn run_prepare_solver_inputs(&mut self, invariant: &dyn InvariantTemplate) -> Result<(), PipelineError> {
        info!(stage = Stage::PrepareSolverInputs.name(), "stage started");
        let model = self.input()?;
        let policy = self.control_policy()?;
        let template = self.template()?;
        let constraints = self
            .context
            .constraints
            .as_ref()
            .expect("GenerateConstraints always runs before PrepareSolverInputs");

        let mut coefficient_names = BTreeSet::new();
        coefficient_names.extend(policy.generated_constants.iter().cloned());
        coefficient_names.extend(template.generated_constants.iter().cloned());
        coefficient_names.extend(invariant.generated_constants().iter().cloned());

        let smt2_text = render_document(&coefficient_names, &constraints.implications, &constraints.constants);
        let solver_config = SolverConfig {
            solver_degree_cap: model.synthesis.solver_degree_cap,
            positivstellensatz_mode: model.synthesis.positivstellensatz_mode.clone(),
        };

        debug!(
            stage = Stage::PrepareSolverInputs.name(),
            coefficients = coefficient_names.len(),
            smt2_bytes = smt2_text.len(),
            "rendered solver input"
        );
        self.context.solver_inputs = Some(PreparedSolverInputs {
            coefficient_names,
            smt2_text,
            solver_config,
        });
        info!(stage = Stage::PrepareSolverInputs.name(), "stage completed");
        Ok(())
    }

    fn run_run_solver(&mut self) -> Result<(), PipelineError> {
        info!(stage = Stage::RunSolver.name(), "stage started");
        let states = self.states()?;
        let solver_inputs = self
            .context
            .solver_inputs
            .as_ref()
            .expect("PrepareSolverInputs always runs before RunSolver");

        let outcome = self
            .solver
            .solve(&self.output_dir, &solver_inputs.smt2_text, &solver_inputs.solver_config)?;
        info!(stage = Stage::RunSolver.name(), is_sat = %outcome.is_sat, "solver completed");

        let non_accepting_ids: Vec<usize> = states
            .automata
            .states
            .iter()
            .filter(|s| !s.is_accepting())
            .map(|s| s.id)
            .collect();
        let normalized_model = crate::bridge::normalize_model(&outcome.model, &non_accepting_ids);
        for (name, value) in &normalized_model {
            debug!(stage = Stage::RunSolver.name(), %name, %value, "solver coefficient");
        }

        self.context.solver_run = Some(SolverRun { outcome, normalized_model });
        info!(stage = Stage::RunSolver.name(), "stage completed");
        Ok(())
    }

    fn input(&self) -> Result<&InputModel, PipelineError> {
        Ok(self
            .context
            .input
            .as_ref()
            .expect("ParseInput always runs before any stage that calls Runner::input"))
    }

    fn states(&self) -> Result<&ConstructedStates, PipelineError> {
        Ok(self
            .context
            .states
            .as_ref()
            .expect("ConstructStates always runs before any stage that calls Runner::states"))
    }

    fn control_policy(&self) -> Result<&SystemDecomposedControlPolicy, PipelineError> {
        Ok(self
            .context
            .control_policy
            .as_ref()
            .expect("PolicyPrep always runs before any stage that calls Runner::control_policy"))
    }

    fn template(&self) -> Result<&ReachCertificateTemplates, PipelineError> {
        Ok(self
            .context
            .template
            .as_ref()
            .expect("SynthesizeTemplate always runs before any stage that calls Runner::template"))
    }
}

/// `A1 -> eq, A2 -> eq, ...` for the verification-mode fixed policy passed in
/// as raw strings (spec.md §8 scenario S3) — exposed for callers that want
/// to report the applied policy without re-deriving it from `RunContext`.
pub fn applied_reach_policy(policy: &SystemDecomposedControlPolicy) -> BTreeMap<String, Equation> {
    policy
        .reach_policy()
        .filter(|p| p.policy_type == PolicyType::Reach)
        .map(SystemControlPolicy::apply)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::FixtureHornSolver;
    use crate::ltl::FixtureLdbaTranslator;

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

    const HOA: &str = "HOA: v1\nStart: 0\nAP: 1 \"target\"\nAcceptance: 1 Inf(0)\n--BODY--\nState: 0\n[!0] 0\n[0] 1\nState: 1 {0}\n[t] 1\n--END--\n";

    fn write_fixtures(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
        let input_path = dir.join("input.yaml");
        fs::write(&input_path, YAML).unwrap();
        let hoa_path = dir.join("spec.hoa");
        fs::write(&hoa_path, HOA).unwrap();
        let result_path = dir.join("solver_result.json");
        fs::write(&result_path, r#"{"is_sat": "sat", "model": {"Epsilon_reach": 0.01, "Pa_1_0": 0.5}}"#).unwrap();
        (input_path, hoa_path, result_path)
    }

    #[test]
    fn runs_every_stage_and_normalizes_the_solver_model() {
        let dir = tempfile::tempdir().unwrap();
        let (input_path, hoa_path, result_path) = write_fixtures(dir.path());

        let mut runner = Runner::new(
            dir.path().join("out"),
            Box::new(FixtureLdbaTranslator::new(hoa_path)),
            Box::new(FixtureHornSolver::new(result_path)),
        );
        let context = runner.run(&input_path).unwrap();

        assert!(context.input.is_some());
        let states = context.states.as_ref().unwrap();
        assert_eq!(states.automata.states.len(), 2);

        let solver_run = context.solver_run.as_ref().unwrap();
        assert!(solver_run.outcome.is_satisfiable());
        // Pa_1_0 must have been rewritten into P_<q>_1_0 for the single
        // non-accepting state (state 0), and Epsilon_reach left untouched.
        assert_eq!(solver_run.normalized_model.get("P_0_1_0"), Some(&0.5));
        assert_eq!(solver_run.normalized_model.get("Epsilon_reach"), Some(&0.01));
        assert!(!solver_run.normalized_model.contains_key("Pa_1_0"));

        assert!(dir.path().join("out").join("ltl2ldba.hoa").exists());
        assert!(dir.path().join("out").join("solver_input.smt2").exists());
    }

    #[test]
    fn enable_linear_invariants_false_contributes_no_invariant_coefficients() {
        let dir = tempfile::tempdir().unwrap();
        let (input_path, hoa_path, result_path) = write_fixtures(dir.path());

        let mut runner = Runner::new(
            dir.path().join("out"),
            Box::new(FixtureLdbaTranslator::new(hoa_path)),
            Box::new(FixtureHornSolver::new(result_path)),
        );
        let context = runner.run(&input_path).unwrap();
        assert!(context.invariant_generated_constants.is_empty());
    }
}
