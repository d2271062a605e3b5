//! The LDBA model: HOA text parsing and the in-memory automaton graph.

pub mod graph;
pub mod hoa;

pub use graph::{Automata, AutomatonState, Transition};
pub use hoa::{parse_hoa, LabelExpr, ParsedHoa};

use std::fmt::Write as _;

impl Automata {
    /// A short human/log-facing summary: state count, accepting-component
    /// count, and start state — grounded in `original_source`'s
    /// `ldba.to_detailed_string()`, used as a `tracing::info!` payload
    /// instead of a `print` at stage completion.
    pub fn to_detailed_string(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "{} states, {} accepting component(s), start={}",
            self.states.len(),
            self.accepting_component_ids().len(),
            self.start_state
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::model::SubConstraint;
    use std::collections::BTreeMap;

    #[test]
    fn detailed_string_reports_state_and_component_counts() {
        let hoa = parse_hoa(
            "HOA: v1\nStart: 0\nAP: 0\nAcceptance: 1 Inf(0)\n--BODY--\nState: 0 {0}\n[t] 0\n--END--\n",
        )
        .unwrap();
        let automata = Automata::from_hoa(hoa, BTreeMap::<String, SubConstraint>::new());
        assert_eq!(automata.to_detailed_string(), "1 states, 1 accepting component(s), start=0");
    }
}
