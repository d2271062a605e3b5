//! Parser for the HOA 1.0 text format, restricted to the fields this crate
//! consumes: header `Start:`, `AP:`, `Acceptance:`, `acc-name:`, and a body
//! of `State:` blocks with `[guard] dest {acc-sets}` transitions.
//!
//! The input is assumed well-formed, as produced by the external LTL→LDBA
//! translator (spec's out-of-scope collaborator) — this parser does not
//! attempt to validate the full HOA grammar, only to extract what
//! [`super::graph::Automata`] needs. Grounded in the regex-based line
//! scanning of `other_examples/bea34180_maackle-polestar-rs__src-model_checker-buchi.rs.rs`,
//! adapted from Promela/never-claim syntax to HOA's bracketed label syntax.

use crate::error::ParseError;

/// A Boolean label over atomic-proposition indices, as it appears inside
/// `[...]` on a transition line.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelExpr {
    True,
    Ap(usize),
    Not(Box<LabelExpr>),
    And(Vec<LabelExpr>),
    Or(Vec<LabelExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoaTransition {
    pub label: LabelExpr,
    pub dest: usize,
    pub acc_sets: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoaState {
    pub id: usize,
    pub acc_sets: Vec<u32>,
    pub transitions: Vec<HoaTransition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHoa {
    pub start_state: usize,
    pub atomic_propositions: Vec<String>,
    pub acceptance: String,
    pub acc_name: Option<String>,
    pub states: Vec<HoaState>,
}

/// Parse a full HOA document (header + `--BODY--` ... `--END--`).
pub fn parse_hoa(text: &str) -> Result<ParsedHoa, ParseError> {
    let mut start_state = None;
    let mut atomic_propositions = Vec::new();
    let mut acceptance = String::new();
    let mut acc_name = None;

    let mut lines = text.lines();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_body = false;

    for line in &mut lines {
        let trimmed = line.trim();
        if trimmed == "--BODY--" {
            in_body = true;
            continue;
        }
        if trimmed == "--END--" {
            break;
        }
        if in_body {
            body_lines.push(line);
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        let (key, rest) = trimmed
            .split_once(':')
            .ok_or_else(|| ParseError::Hoa(format!("malformed header line: `{trimmed}`")))?;
        let rest = rest.trim();
        match key {
            "Start" => {
                let id_str = rest.split(|c: char| !c.is_ascii_digit()).next().unwrap_or("");
                start_state = Some(id_str.parse::<usize>().map_err(|_| {
                    ParseError::Hoa(format!("malformed Start field: `{rest}`"))
                })?);
            }
            "AP" => {
                atomic_propositions = parse_quoted_list(rest);
            }
            "Acceptance" => acceptance = rest.to_string(),
            "acc-name" => acc_name = Some(rest.to_string()),
            _ => {}
        }
    }

    let start_state = start_state.ok_or_else(|| ParseError::Hoa("missing Start: header".into()))?;
    let states = parse_body(&body_lines)?;

    Ok(ParsedHoa {
        start_state,
        atomic_propositions,
        acceptance,
        acc_name,
        states,
    })
}

/// `AP: 2 "a" "b"` → `["a", "b"]`; the leading count is ignored (the list length is authoritative).
fn parse_quoted_list(rest: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            let mut name = String::new();
            for c2 in chars.by_ref() {
                if c2 == '"' {
                    break;
                }
                name.push(c2);
            }
            names.push(name);
        }
    }
    names
}

fn parse_body(lines: &[&str]) -> Result<Vec<HoaState>, ParseError> {
    let mut states: Vec<HoaState> = Vec::new();
    let mut current: Option<HoaState> = None;

    for raw_line in lines {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("State:") {
            if let Some(state) = current.take() {
                states.push(state);
            }
            let rest = rest.trim();
            let (id_part, acc_part) = split_braces(rest);
            let id = id_part
                .split_whitespace()
                .next()
                .unwrap_or("")
                .parse::<usize>()
                .map_err(|_| ParseError::Hoa(format!("malformed State line: `{line}`")))?;
            current = Some(HoaState {
                id,
                acc_sets: acc_part,
                transitions: Vec::new(),
            });
        } else if let Some(stripped) = line.strip_prefix('[') {
            let close = stripped
                .find(']')
                .ok_or_else(|| ParseError::Hoa(format!("unterminated label in `{line}`")))?;
            let label_text = &stripped[..close];
            let label = parse_label(label_text)?;
            let remainder = stripped[close + 1..].trim();
            let (dest_part, acc_part) = split_braces(remainder);
            let dest = dest_part
                .split_whitespace()
                .next()
                .ok_or_else(|| ParseError::Hoa(format!("missing destination in `{line}`")))?
                .parse::<usize>()
                .map_err(|_| ParseError::Hoa(format!("malformed destination in `{line}`")))?;
            let state = current
                .as_mut()
                .ok_or_else(|| ParseError::Hoa(format!("transition before any State: line: `{line}`")))?;
            let acc_sets = if acc_part.is_empty() {
                state.acc_sets.clone()
            } else {
                acc_part
            };
            state.transitions.push(HoaTransition {
                label,
                dest,
                acc_sets,
            });
        } else {
            return Err(ParseError::Hoa(format!("unrecognized body line: `{line}`")));
        }
    }
    if let Some(state) = current.take() {
        states.push(state);
    }
    states.sort_by_key(|s| s.id);
    Ok(states)
}

/// Split `"3 {0 1}"` into `("3 ", [0, 1])`; returns an empty vec if there is no `{...}`.
fn split_braces(s: &str) -> (&str, Vec<u32>) {
    match s.find('{') {
        None => (s, Vec::new()),
        Some(open) => {
            let close = s[open..].find('}').map(|i| open + i).unwrap_or(s.len());
            let sets = s[open + 1..close]
                .split_whitespace()
                .filter_map(|t| t.parse::<u32>().ok())
                .collect();
            (&s[..open], sets)
        }
    }
}

fn parse_label(text: &str) -> Result<LabelExpr, ParseError> {
    let tokens = lex_label(text)?;
    let mut pos = 0;
    let expr = parse_label_or(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err(ParseError::Hoa(format!("trailing tokens in label `{text}`")));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum LabelToken {
    True,
    False,
    Ap(usize),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

fn lex_label(text: &str) -> Result<Vec<LabelToken>, ParseError> {
    let mut tokens = Vec::new();
    let bytes: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            ' ' | '\t' => i += 1,
            '!' => {
                tokens.push(LabelToken::Not);
                i += 1;
            }
            '&' => {
                tokens.push(LabelToken::And);
                i += 1;
            }
            '|' => {
                tokens.push(LabelToken::Or);
                i += 1;
            }
            '(' => {
                tokens.push(LabelToken::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(LabelToken::RParen);
                i += 1;
            }
            't' => {
                tokens.push(LabelToken::True);
                i += 1;
            }
            'f' => {
                tokens.push(LabelToken::False);
                i += 1;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let n: String = bytes[start..i].iter().collect();
                tokens.push(LabelToken::Ap(n.parse().unwrap()));
            }
            other => {
                return Err(ParseError::Hoa(format!(
                    "unexpected character `{other}` in label `{text}`"
                )))
            }
        }
    }
    Ok(tokens)
}

fn parse_label_or(tokens: &[LabelToken], pos: &mut usize) -> Result<LabelExpr, ParseError> {
    let mut terms = vec![parse_label_and(tokens, pos)?];
    while matches!(tokens.get(*pos), Some(LabelToken::Or)) {
        *pos += 1;
        terms.push(parse_label_and(tokens, pos)?);
    }
    Ok(if terms.len() == 1 { terms.pop().unwrap() } else { LabelExpr::Or(terms) })
}

fn parse_label_and(tokens: &[LabelToken], pos: &mut usize) -> Result<LabelExpr, ParseError> {
    let mut terms = vec![parse_label_not(tokens, pos)?];
    while matches!(tokens.get(*pos), Some(LabelToken::And)) {
        *pos += 1;
        terms.push(parse_label_not(tokens, pos)?);
    }
    Ok(if terms.len() == 1 { terms.pop().unwrap() } else { LabelExpr::And(terms) })
}

fn parse_label_not(tokens: &[LabelToken], pos: &mut usize) -> Result<LabelExpr, ParseError> {
    if matches!(tokens.get(*pos), Some(LabelToken::Not)) {
        *pos += 1;
        return Ok(LabelExpr::Not(Box::new(parse_label_not(tokens, pos)?)));
    }
    parse_label_atom(tokens, pos)
}

fn parse_label_atom(tokens: &[LabelToken], pos: &mut usize) -> Result<LabelExpr, ParseError> {
    match tokens.get(*pos) {
        Some(LabelToken::True) => {
            *pos += 1;
            Ok(LabelExpr::True)
        }
        Some(LabelToken::False) => {
            *pos += 1;
            Ok(LabelExpr::Not(Box::new(LabelExpr::True)))
        }
        Some(LabelToken::Ap(n)) => {
            let n = *n;
            *pos += 1;
            Ok(LabelExpr::Ap(n))
        }
        Some(LabelToken::LParen) => {
            *pos += 1;
            let inner = parse_label_or(tokens, pos)?;
            match tokens.get(*pos) {
                Some(LabelToken::RParen) => {
                    *pos += 1;
                    Ok(inner)
                }
                _ => Err(ParseError::Hoa("unmatched `(` in label".into())),
            }
        }
        other => Err(ParseError::Hoa(format!("unexpected label token {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"HOA: v1
States: 2
Start: 0
AP: 2 "target" "safe"
acc-name: Buchi
Acceptance: 1 Inf(0)
--BODY--
State: 0
[!0] 0
[0] 1
State: 1 {0}
[t] 1
--END--
"#;

    #[test]
    fn parses_header_fields() {
        let parsed = parse_hoa(SAMPLE).unwrap();
        assert_eq!(parsed.start_state, 0);
        assert_eq!(parsed.atomic_propositions, vec!["target".to_string(), "safe".to_string()]);
        assert_eq!(parsed.acc_name.as_deref(), Some("Buchi"));
    }

    #[test]
    fn parses_states_and_transitions() {
        let parsed = parse_hoa(SAMPLE).unwrap();
        assert_eq!(parsed.states.len(), 2);
        assert_eq!(parsed.states[0].transitions.len(), 2);
        assert_eq!(parsed.states[0].transitions[0].label, LabelExpr::Not(Box::new(LabelExpr::Ap(0))));
        assert_eq!(parsed.states[1].acc_sets, vec![0]);
    }

    #[test]
    fn transitions_inherit_state_level_acc_sets_when_unlabeled() {
        let parsed = parse_hoa(SAMPLE).unwrap();
        assert_eq!(parsed.states[1].transitions[0].acc_sets, vec![0]);
    }

    #[test]
    fn parses_conjunctive_and_disjunctive_labels() {
        assert_eq!(
            parse_label("0 & !1").unwrap(),
            LabelExpr::And(vec![LabelExpr::Ap(0), LabelExpr::Not(Box::new(LabelExpr::Ap(1)))])
        );
        assert_eq!(
            parse_label("0 | 1").unwrap(),
            LabelExpr::Or(vec![LabelExpr::Ap(0), LabelExpr::Ap(1)])
        );
    }

    #[test]
    fn missing_start_header_is_a_parse_error() {
        let bad = "HOA: v1\n--BODY--\nState: 0\n[t] 0\n--END--\n";
        assert!(parse_hoa(bad).is_err());
    }
}
