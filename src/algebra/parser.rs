//! Recursive-descent parser for the `+ - * /` polynomial grammar.
//!
//! Division is only accepted when the divisor is a bare numeric literal
//! (`x / 2`), since a symbolic divisor would leave the grammar's algebra
//! outside the polynomial ring. This mirrors the printer in
//! [`super::monomial`], which never emits a divisor at all, and exists
//! purely so hand-authored templates (policy strings in verification mode)
//! can use the convenient `/2` shorthand.

use crate::error::ParseError;

use super::equation::Equation;
use super::inequality::{Inequality, Relation};
use super::monomial::Monomial;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            if self.pos >= self.bytes.len() {
                break;
            }
            let start = self.pos;
            let c = self.bytes[self.pos] as char;
            let tok = match c {
                '+' => {
                    self.pos += 1;
                    Token::Plus
                }
                '-' => {
                    self.pos += 1;
                    Token::Minus
                }
                '*' => {
                    self.pos += 1;
                    Token::Star
                }
                '/' => {
                    self.pos += 1;
                    Token::Slash
                }
                '(' => {
                    self.pos += 1;
                    Token::LParen
                }
                ')' => {
                    self.pos += 1;
                    Token::RParen
                }
                c if c.is_ascii_digit() || c == '.' => self.lex_number()?,
                c if c.is_alphabetic() || c == '_' => self.lex_ident(),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        token: other.to_string(),
                        offset: start,
                        source_text: self.src.to_string(),
                    })
                }
            };
            tokens.push((tok, start));
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && (self.bytes[self.pos] as char).is_whitespace() {
            self.pos += 1;
        }
    }

    fn lex_number(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos] as char;
            if c.is_ascii_digit() || c == '.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        // Scientific-notation suffix: `e`/`E` optionally signed, then digits
        // (spec.md §4.1 requires scientific-notation literals).
        if self.pos < self.bytes.len() && matches!(self.bytes[self.pos] as char, 'e' | 'E') {
            let mark = self.pos;
            let mut probe = self.pos + 1;
            if probe < self.bytes.len() && matches!(self.bytes[probe] as char, '+' | '-') {
                probe += 1;
            }
            let digits_start = probe;
            while probe < self.bytes.len() && (self.bytes[probe] as char).is_ascii_digit() {
                probe += 1;
            }
            if probe > digits_start {
                self.pos = probe;
            } else {
                self.pos = mark;
            }
        }
        let text = &self.src[start..self.pos];
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ParseError::UnexpectedToken {
                token: text.to_string(),
                offset: start,
                source_text: self.src.to_string(),
            })
    }

    fn lex_ident(&mut self) -> Token {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos] as char;
            if c.is_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Token::Ident(self.src[start..self.pos].to_string())
    }
}

/// Parse a polynomial expression into its canonical [`Equation`] form.
pub fn parse_equation(src: &str) -> Result<Equation, ParseError> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        source_text: src,
    };
    let eq = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        let (tok, offset) = &parser.tokens[parser.pos];
        return Err(ParseError::UnexpectedToken {
            token: format!("{:?}", tok),
            offset: *offset,
            source_text: src.to_string(),
        });
    }
    Ok(eq)
}

/// Parse a relational string (`"S1 >= 0"`, `"(S1 + S2) <= 10"`) into an
/// [`Inequality`], used to read the inequality lists the input configuration
/// carries as plain strings (spec.md §6: `system_space`/`initial_space`,
/// predicate-lookup regions). Strict `<`/`>` are accepted on input and
/// folded into their non-strict counterpart, matching `Relation`'s
/// non-strict-only representation (see `inequality.rs`'s module doc).
pub fn parse_inequality(src: &str) -> Result<Inequality, ParseError> {
    const OPERATORS: &[(&str, Relation)] = &[
        (">=", Relation::Ge),
        ("<=", Relation::Le),
        ("==", Relation::Eq),
        ("=", Relation::Eq),
        (">", Relation::Ge),
        ("<", Relation::Le),
    ];
    for (op, relation) in OPERATORS {
        if let Some(idx) = src.find(op) {
            let lhs = parse_equation(&src[..idx])?;
            let rhs = parse_equation(&src[idx + op.len()..])?;
            return Ok(Inequality::comparing(&lhs, *relation, &rhs));
        }
    }
    Err(ParseError::UnexpectedEof(format!(
        "no relational operator found in `{src}`"
    )))
}

struct Parser<'a> {
    tokens: &'a [(Token, usize)],
    pos: usize,
    source_text: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos).map(|(t, _)| t);
        self.pos += 1;
        tok
    }

    fn eof_err(&self) -> ParseError {
        ParseError::UnexpectedEof(self.source_text.to_string())
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Equation, ParseError> {
        let mut acc = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    acc = acc.add(&self.parse_term()?);
                }
                Some(Token::Minus) => {
                    self.advance();
                    acc = acc.sub(&self.parse_term()?);
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    // term := unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<Equation, ParseError> {
        let mut acc = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    acc = acc.mul(&self.parse_unary()?);
                }
                Some(Token::Slash) => {
                    self.advance();
                    let divisor = self.parse_unary()?;
                    let terms = divisor.terms();
                    if terms.len() != 1 || !terms[0].key().is_empty() {
                        return Err(ParseError::UnsupportedDivision(self.source_text.to_string()));
                    }
                    acc = acc.scale(1.0 / terms[0].coefficient);
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    // unary := '-' unary | primary
    fn parse_unary(&mut self) -> Result<Equation, ParseError> {
        if let Some(Token::Minus) = self.peek() {
            self.advance();
            return Ok(self.parse_unary()?.negate());
        }
        self.parse_primary()
    }

    // primary := number | ident | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Equation, ParseError> {
        match self.advance().cloned().ok_or_else(|| self.eof_err())? {
            Token::Number(n) => Ok(Equation::new([Monomial::constant(n)])),
            Token::Ident(name) => Ok(Equation::new([Monomial::symbol(name)])),
            Token::LParen => {
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(ParseError::UnexpectedToken {
                        token: format!("{:?}", other),
                        offset: self.tokens[self.pos - 1].1,
                        source_text: self.source_text.to_string(),
                    }),
                    None => Err(self.eof_err()),
                }
            }
            other => Err(ParseError::UnexpectedToken {
                token: format!("{:?}", other),
                offset: self.tokens[self.pos - 1].1,
                source_text: self.source_text.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_print_and_parse() {
        let src = "2*S1*S1 + 3*S2 - 5";
        let parsed = parse_equation(src).unwrap();
        let printed = parsed.to_string();
        let reparsed = parse_equation(&printed).unwrap();
        assert_eq!(parsed, reparsed);
    }

    #[test]
    fn parses_negative_leading_term() {
        let e = parse_equation("-S1 + 2").unwrap();
        assert_eq!(e.to_string(), "-S1 + 2");
    }

    #[test]
    fn parses_parenthesized_products() {
        let e = parse_equation("(S1 + S2) * (S1 - S2)").unwrap();
        let expected = Equation::symbol("S1")
            .mul(&Equation::symbol("S1"))
            .sub(&Equation::symbol("S2").mul(&Equation::symbol("S2")));
        assert_eq!(e, expected);
    }

    #[test]
    fn numeric_division_scales_coefficients() {
        let e = parse_equation("S1 / 2").unwrap();
        assert_eq!(e, Equation::symbol("S1").scale(0.5));
    }

    #[test]
    fn symbolic_division_is_rejected() {
        let err = parse_equation("S1 / S2").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedDivision(_)));
    }

    #[test]
    fn unexpected_token_reports_offset() {
        let err = parse_equation("S1 + @").unwrap_err();
        match err {
            ParseError::UnexpectedToken { offset, .. } => assert_eq!(offset, 5),
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn truncated_input_reports_eof() {
        let err = parse_equation("S1 + (S2").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof(_)));
    }

    #[test]
    fn parses_scientific_notation_literals() {
        let e = parse_equation("1e-5 + 2.5E+3").unwrap();
        assert_eq!(e, Equation::constant(1e-5).add(&Equation::constant(2.5e3)));
    }

    #[test]
    fn parse_inequality_normalizes_rhs_and_relation() {
        let ineq = parse_inequality("S1 >= 9").unwrap();
        assert_eq!(ineq.relation, Relation::Ge);
        assert_eq!(ineq.lhs, Equation::symbol("S1").sub(&Equation::constant(9.0)));
    }

    #[test]
    fn parse_inequality_folds_strict_into_non_strict() {
        let ineq = parse_inequality("S1 < 5").unwrap();
        assert_eq!(ineq.relation, Relation::Le);
    }

    #[test]
    fn parse_inequality_picks_ge_before_gt() {
        let ineq = parse_inequality("S1 >= 0").unwrap();
        assert_eq!(ineq.relation, Relation::Ge);
    }
}
