//! The Horn-clause solver boundary (spec.md §6.3, unchanged): this crate
//! only serializes the constraint system and invokes an external
//! collaborator — it never solves a polynomial constraint itself.
//!
//! `ExternalHornSolver` writes `solver_input.smt2`/`solver_config.json` under
//! the run's output directory and spawns the configured solver binary,
//! mirroring the subprocess pattern in
//! `other_examples/bea34180_maackle-polestar-rs__src-model_checker-buchi.rs.rs`
//! and the script-invocation shape in
//! `other_examples/6e510b6d_meyerphi-strix__tests-integration.rs.rs`.
//! `FixtureHornSolver` reads a pre-baked `solver_result.json`, mirroring the
//! teacher's `dev-srs` production/fixture seam in `srs_setup.rs`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use super::model::SolverOutcome;
use crate::error::SolverFailure;

/// The degree-cap / mode knobs the solver process is configured with,
/// written alongside the SMT-LIB input as `solver_config.json`.
#[derive(Debug, Clone, Serialize)]
pub struct SolverConfig {
    pub solver_degree_cap: Option<u32>,
    pub positivstellensatz_mode: Option<String>,
}

pub trait HornSolver {
    /// Persist `smt2_text`/`config` under `output_dir` and run the solver,
    /// returning its parsed, un-normalized [`SolverOutcome`].
    fn solve(&self, output_dir: &Path, smt2_text: &str, config: &SolverConfig) -> Result<SolverOutcome, SolverFailure>;
}

/// Spawns the configured solver binary: `<binary> solver_input.smt2
/// solver_config.json solver_result.json`, invoked with `output_dir` as the
/// working directory, then reads back `solver_result.json`.
pub struct ExternalHornSolver {
    pub binary: String,
}

impl ExternalHornSolver {
    pub fn new(binary: impl Into<String>) -> Self {
        ExternalHornSolver { binary: binary.into() }
    }
}

impl HornSolver for ExternalHornSolver {
    fn solve(&self, output_dir: &Path, smt2_text: &str, config: &SolverConfig) -> Result<SolverOutcome, SolverFailure> {
        let input_path = output_dir.join("solver_input.smt2");
        let config_path = output_dir.join("solver_config.json");
        let result_path = output_dir.join("solver_result.json");

        write_file(&input_path, smt2_text)?;
        let config_text = serde_json::to_string_pretty(config)?;
        write_file(&config_path, &config_text)?;

        let status = Command::new(&self.binary)
            .arg(&input_path)
            .arg(&config_path)
            .arg(&result_path)
            .current_dir(output_dir)
            .status()
            .map_err(|source| SolverFailure::Spawn {
                binary: self.binary.clone(),
                source,
            })?;
        if !status.success() {
            return Err(SolverFailure::NonZeroExit {
                status: status.code().unwrap_or(-1),
                stderr: String::new(),
            });
        }

        let result_text = fs::read_to_string(&result_path).map_err(|source| SolverFailure::Io {
            path: result_path,
            source,
        })?;
        Ok(serde_json::from_str(&result_text)?)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), SolverFailure> {
    fs::write(path, contents).map_err(|source| SolverFailure::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a pre-baked `solver_result.json` fixture instead of spawning a real
/// solver binary, still writing the SMT-LIB input/config for inspection (so
/// the `.smt2`/`.json` artifacts exist the same way in tests as in
/// production runs).
pub struct FixtureHornSolver {
    pub fixture_path: PathBuf,
}

impl FixtureHornSolver {
    pub fn new(fixture_path: impl Into<PathBuf>) -> Self {
        FixtureHornSolver { fixture_path: fixture_path.into() }
    }
}

impl HornSolver for FixtureHornSolver {
    fn solve(&self, output_dir: &Path, smt2_text: &str, config: &SolverConfig) -> Result<SolverOutcome, SolverFailure> {
        write_file(&output_dir.join("solver_input.smt2"), smt2_text)?;
        let config_text = serde_json::to_string_pretty(config)?;
        write_file(&output_dir.join("solver_config.json"), &config_text)?;

        let result_text = fs::read_to_string(&self.fixture_path).map_err(|source| SolverFailure::Io {
            path: self.fixture_path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&result_text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_solver_writes_inputs_and_returns_the_fixture_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let fixture_path = dir.path().join("fixture_result.json");
        fs::write(&fixture_path, r#"{"is_sat": "sat", "model": {"Epsilon_reach": 1e-10}}"#).unwrap();

        let solver = FixtureHornSolver::new(&fixture_path);
        let config = SolverConfig { solver_degree_cap: Some(4), positivstellensatz_mode: None };
        let outcome = solver.solve(dir.path(), "(declare-const Epsilon_reach Real)\n", &config).unwrap();

        assert!(outcome.is_satisfiable());
        assert!(dir.path().join("solver_input.smt2").exists());
        assert!(dir.path().join("solver_config.json").exists());
    }

    #[test]
    fn external_solver_reports_spawn_failure_for_a_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let solver = ExternalHornSolver::new("definitely-not-a-real-binary-xyz");
        let config = SolverConfig { solver_degree_cap: None, positivstellensatz_mode: None };
        let err = solver.solve(dir.path(), "(assert true)\n", &config).unwrap_err();
        assert!(matches!(err, SolverFailure::Spawn { .. }));
    }
}
