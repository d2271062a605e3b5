//! The LTL→LDBA translator boundary (spec.md §6.2, unchanged from spec.md):
//! this crate never implements LTL-to-automaton translation itself, only the
//! narrow interface to an external collaborator that does.
//!
//! Grounded in the subprocess-invocation shape of
//! `other_examples/bea34180_maackle-polestar-rs__src-model_checker-buchi.rs.rs`
//! (spawn an external automaton-producing tool, read its stdout) and in the
//! teacher's own production/fixture seam (`srs_setup.rs`'s `dev-srs`
//! feature): [`ExternalLdbaTranslator`] is the production path,
//! [`FixtureLdbaTranslator`] is the `fixture-collaborators` test path.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::error::TranslatorFailure;

/// Translates an LTL formula plus its atomic-proposition universe into HOA
/// 1.0 text (an LDBA over that proposition universe). The crate only ever
/// consumes the returned text through [`crate::automaton::parse_hoa`].
pub trait LdbaTranslator {
    fn translate(&self, ltl: &str, atomic_propositions: &[String]) -> Result<String, TranslatorFailure>;
}

/// Spawns a configurable external binary: `<binary> --formula <ltl> --ap
/// <name> --ap <name> ...`, returning its stdout as HOA text. The binary
/// itself (an LTL-to-LDBA translator such as owl or spot's `ltl2tgba`) is an
/// out-of-scope collaborator — this crate only establishes the calling
/// convention.
pub struct ExternalLdbaTranslator {
    pub binary: String,
}

impl ExternalLdbaTranslator {
    pub fn new(binary: impl Into<String>) -> Self {
        ExternalLdbaTranslator { binary: binary.into() }
    }
}

impl LdbaTranslator for ExternalLdbaTranslator {
    fn translate(&self, ltl: &str, atomic_propositions: &[String]) -> Result<String, TranslatorFailure> {
        let mut command = Command::new(&self.binary);
        command.arg("--formula").arg(ltl);
        for ap in atomic_propositions {
            command.arg("--ap").arg(ap);
        }
        let output = command.output().map_err(|source| TranslatorFailure::Spawn {
            binary: self.binary.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(TranslatorFailure::NonZeroExit {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Reads a pre-baked `.hoa` fixture file instead of spawning a real
/// translator binary, ignoring the formula/proposition arguments — used
/// under the `fixture-collaborators` feature so tests never depend on an
/// installed LTL toolchain.
pub struct FixtureLdbaTranslator {
    pub fixture_path: PathBuf,
}

impl FixtureLdbaTranslator {
    pub fn new(fixture_path: impl Into<PathBuf>) -> Self {
        FixtureLdbaTranslator { fixture_path: fixture_path.into() }
    }
}

impl LdbaTranslator for FixtureLdbaTranslator {
    fn translate(&self, _ltl: &str, _atomic_propositions: &[String]) -> Result<String, TranslatorFailure> {
        fs::read_to_string(&self.fixture_path).map_err(|source| TranslatorFailure::Io {
            path: self.fixture_path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_translator_reads_the_configured_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.hoa");
        fs::write(&path, "HOA: v1\n--BODY--\n--END--\n").unwrap();
        let translator = FixtureLdbaTranslator::new(&path);
        let text = translator.translate("F target", &["target".to_string()]).unwrap();
        assert_eq!(text, "HOA: v1\n--BODY--\n--END--\n");
    }

    #[test]
    fn fixture_translator_surfaces_io_errors() {
        let translator = FixtureLdbaTranslator::new("/nonexistent/path.hoa");
        let err = translator.translate("F target", &[]).unwrap_err();
        assert!(matches!(err, TranslatorFailure::Io { .. }));
    }

    #[test]
    fn external_translator_reports_spawn_failure_for_a_missing_binary() {
        let translator = ExternalLdbaTranslator::new("definitely-not-a-real-binary-xyz");
        let err = translator.translate("F target", &["target".to_string()]).unwrap_err();
        assert!(matches!(err, TranslatorFailure::Spawn { .. }));
    }
}
