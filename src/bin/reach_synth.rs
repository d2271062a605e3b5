//! Minimal CLI driver for the reach-certificate synthesis pipeline.
//!
//! Usage:
//!   reach_synth --input <path> --output <dir> [--ltl-translator <bin>]
//!               [--solver <bin>] [--ltl-fixture <path>] [--solver-fixture <path>]
//!
//! `--ltl-translator`/`--solver` select the external collaborator binaries
//! (spec.md §6.2/§6.3); `--ltl-fixture`/`--solver-fixture` select pre-baked
//! fixtures instead (only meaningful when built with `--features
//! fixture-collaborators`). Exit code is 0 when the solver reports `sat`,
//! 1 when it reports anything else, grounded in the teacher's `prover.rs`/
//! `verifier.rs` plain-flag-parsing style (`parse_flag`) rather than a CLI
//! framework.

use std::path::{Path, PathBuf};

use reach_synth::bridge::{ExternalHornSolver, HornSolver};
use reach_synth::ltl::{ExternalLdbaTranslator, LdbaTranslator};
use reach_synth::orchestrator::Runner;

#[cfg(feature = "fixture-collaborators")]
use reach_synth::bridge::FixtureHornSolver;
#[cfg(feature = "fixture-collaborators")]
use reach_synth::ltl::FixtureLdbaTranslator;

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn build_translator(args: &[String]) -> anyhow::Result<Box<dyn LdbaTranslator>> {
    if let Some(fixture) = parse_flag(args, "--ltl-fixture") {
        #[cfg(feature = "fixture-collaborators")]
        {
            return Ok(Box::new(FixtureLdbaTranslator::new(PathBuf::from(fixture))));
        }
        #[cfg(not(feature = "fixture-collaborators"))]
        {
            anyhow::bail!("--ltl-fixture requires the `fixture-collaborators` feature (got {fixture})");
        }
    }
    let binary = parse_flag(args, "--ltl-translator").unwrap_or_else(|| "ltl2ldba".to_string());
    Ok(Box::new(ExternalLdbaTranslator::new(binary)))
}

fn build_solver(args: &[String]) -> anyhow::Result<Box<dyn HornSolver>> {
    if let Some(fixture) = parse_flag(args, "--solver-fixture") {
        #[cfg(feature = "fixture-collaborators")]
        {
            return Ok(Box::new(FixtureHornSolver::new(PathBuf::from(fixture))));
        }
        #[cfg(not(feature = "fixture-collaborators"))]
        {
            anyhow::bail!("--solver-fixture requires the `fixture-collaborators` feature (got {fixture})");
        }
    }
    let binary = parse_flag(args, "--solver").unwrap_or_else(|| "polyhorn".to_string());
    Ok(Box::new(ExternalHornSolver::new(binary)))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "reach_synth=info".into()))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let input = parse_flag(&args, "--input").ok_or_else(|| anyhow::anyhow!("missing required --input <path>"))?;
    let output = parse_flag(&args, "--output").unwrap_or_else(|| "reach_synth_out".to_string());

    let translator = build_translator(&args)?;
    let solver = build_solver(&args)?;

    let mut runner = Runner::new(PathBuf::from(&output), translator, solver);
    let context = runner.run(Path::new(&input))?;

    let solver_run = context
        .solver_run
        .as_ref()
        .expect("Runner::run only returns Ok after every stage, including RunSolver, completes");

    tracing::info!(is_sat = %solver_run.outcome.is_sat, "synthesis finished");
    for (name, value) in &solver_run.normalized_model {
        println!("{name} = {value}");
    }

    if solver_run.outcome.is_satisfiable() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
