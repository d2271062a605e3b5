//! Crate-wide error categories.
//!
//! Each stage of the pipeline owns a narrow `thiserror` enum (mirroring the
//! teacher's per-module `DomainError`/`QuotientError`/`StreamError` style);
//! [`PipelineError`] unifies them at the orchestrator boundary the same way
//! the teacher re-exports `StreamError` at the crate root.

use std::path::PathBuf;

/// Malformed input configuration: missing field, bad dimension, unreadable file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("input path not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} as YAML/JSON: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("no input files found under {0}")]
    EmptyDirectory(PathBuf),
    #[error("dimension mismatch in `{field}`: expected {expected}, got {got}")]
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("probability threshold must be in [0, 1), got {0}")]
    BadProbabilityThreshold(f64),
}

/// A polynomial or HOA text fragment could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token `{token}` at byte offset {offset} in `{source_text}`")]
    UnexpectedToken {
        token: String,
        offset: usize,
        source_text: String,
    },
    #[error("unexpected end of input while parsing `{0}`")]
    UnexpectedEof(String),
    #[error("division is only supported when one operand is a numeric constant: `{0}`")]
    UnsupportedDivision(String),
    #[error("malformed HOA text: {0}")]
    Hoa(String),
}

/// A constraint generator detected a precondition violation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("transition label `{label}` negates a non-atomic region; not representable")]
    UnsupportedNegatedLabel { label: String },
    #[error("unknown atomic proposition `{0}` in transition label")]
    UnknownPredicate(String),
}

/// The external solver process failed or returned unparseable output.
#[derive(Debug, thiserror::Error)]
pub enum SolverFailure {
    #[error("solver process exited with status {status}: {stderr}")]
    NonZeroExit { status: i32, stderr: String },
    #[error("failed to launch solver binary `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read solver result {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse solver output as JSON: {0}")]
    UnparseableOutput(#[from] serde_json::Error),
}

/// The external LTL→LDBA translator failed to run or produced nothing.
#[derive(Debug, thiserror::Error)]
pub enum TranslatorFailure {
    #[error("translator process exited with status {status}: {stderr}")]
    NonZeroExit { status: i32, stderr: String },
    #[error("failed to launch translator binary `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read HOA fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error unifying every stage, carrying the stage name that failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("[ParseInput] {0}")]
    Config(#[from] ConfigError),
    #[error("[{stage}] {source}")]
    Parse {
        stage: &'static str,
        #[source]
        source: ParseError,
    },
    #[error("[ConstructStates] {0}")]
    Translator(#[from] TranslatorFailure),
    #[error("[GenerateConstraints] {0}")]
    Model(#[from] ModelError),
    #[error("[RunSolver] {0}")]
    Solver(#[from] SolverFailure),
}
