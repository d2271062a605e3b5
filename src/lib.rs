//! `reach-synth`: polynomial reach-certificate and control-policy synthesis
//! for discrete-time stochastic systems against LTL reach specifications.
//!
//! ## Pipeline
//!
//! [`orchestrator::Runner`] drives the ten-phase pipeline spec.md §4.7
//! describes: it loads an [`config::InputConfig`], translates the LTL
//! formula to an LDBA via an external [`ltl::LdbaTranslator`], builds the
//! control-policy and certificate/invariant [`templates`], generates the
//! [`constraints`] those templates must satisfy, and hands the result to an
//! external [`bridge::HornSolver`].
//!
//! ## Module map
//!
//! - [`algebra`] — symbolic multivariate polynomials: parsing, substitution,
//!   canonical printing.
//! - [`automaton`] — HOA 1.0 parsing and the in-memory LDBA graph.
//! - [`dynamics`] — the system's state space, stochastic noise, and
//!   conditional dynamics.
//! - [`templates`] — certificate, invariant, and control-policy polynomial
//!   templates.
//! - [`constraints`] — the generators that turn templates into
//!   universally-quantified implications.
//! - [`config`] — input-file deserialization and validation.
//! - [`ltl`] — the external LTL-to-LDBA translator boundary.
//! - [`bridge`] — the external Horn-clause solver boundary: serialization,
//!   invocation, and model normalization.
//! - [`orchestrator`] — the staging pipeline tying every module together.
//! - [`error`] — crate-wide error categories.

#![forbid(unsafe_code)]

pub mod algebra;
pub mod automaton;
pub mod bridge;
pub mod config;
pub mod constraints;
pub mod dynamics;
pub mod error;
pub mod ltl;
pub mod orchestrator;
pub mod templates;
