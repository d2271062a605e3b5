//! Equations: sums of [`Monomial`] terms with like terms combined.

use super::monomial::Monomial;
use std::collections::BTreeSet;
use std::fmt;

/// A sum of monomials, canonicalized so every term has a distinct key and
/// zero-coefficient terms are dropped. An empty equation prints as `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    terms: Vec<Monomial>,
}

impl Equation {
    /// Build an equation, combining like terms and dropping zero coefficients.
    pub fn new<I: IntoIterator<Item = Monomial>>(terms: I) -> Self {
        let mut combined: Vec<Monomial> = Vec::new();
        for term in terms {
            if let Some(existing) = combined.iter_mut().find(|t: &&mut Monomial| t.is_like_term(&term)) {
                existing.coefficient += term.coefficient;
            } else {
                combined.push(term);
            }
        }
        combined.retain(|t| t.coefficient != 0.0);
        combined.sort_by(|a, b| a.key().cmp(b.key()));
        Equation { terms: combined }
    }

    pub fn zero() -> Self {
        Equation { terms: Vec::new() }
    }

    pub fn constant(c: f64) -> Self {
        Equation::new([Monomial::constant(c)])
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Equation::new([Monomial::symbol(name)])
    }

    pub fn terms(&self) -> &[Monomial] {
        &self.terms
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Highest total degree among this equation's terms (0 for the zero equation).
    pub fn degree(&self) -> u32 {
        self.terms.iter().map(Monomial::degree).max().unwrap_or(0)
    }

    pub fn add(&self, other: &Equation) -> Equation {
        Equation::new(self.terms.iter().chain(other.terms.iter()).cloned())
    }

    pub fn sub(&self, other: &Equation) -> Equation {
        self.add(&other.negate())
    }

    pub fn negate(&self) -> Equation {
        Equation {
            terms: self.terms.iter().map(Monomial::negate).collect(),
        }
    }

    pub fn scale(&self, c: f64) -> Equation {
        Equation::new(self.terms.iter().map(|t| t.scale(c)))
    }

    pub fn mul(&self, other: &Equation) -> Equation {
        let mut terms = Vec::with_capacity(self.terms.len() * other.terms.len());
        for a in &self.terms {
            for b in &other.terms {
                terms.push(a.mul(b));
            }
        }
        Equation::new(terms)
    }

    /// Raise to a non-negative integer power by repeated multiplication.
    pub fn pow(&self, exponent: u32) -> Equation {
        let mut result = Equation::constant(1.0);
        for _ in 0..exponent {
            result = result.mul(self);
        }
        result
    }

    /// Substitute `name` with `replacement` throughout, splitting each
    /// affected monomial's power of `name` out and reassembling via `mul`.
    pub fn substitute(&self, name: &str, replacement: &Equation) -> Equation {
        let mut result = Equation::zero();
        for term in &self.terms {
            let power = term.power_of(name);
            if power == 0 {
                result = result.add(&Equation::new([term.clone()]));
                continue;
            }
            let remainder_factors: Vec<(String, u32)> = term
                .key()
                .iter()
                .filter(|(n, _)| n != name)
                .cloned()
                .collect();
            let remainder = Equation::new([Monomial::new(term.coefficient, remainder_factors)]);
            result = result.add(&remainder.mul(&replacement.pow(power)));
        }
        result
    }

    /// Every free name satisfying `is_coeff`, generic over what counts as a
    /// "coefficient" in the caller's context — both state/noise/action
    /// generators and template coefficients are ordinary factors in the
    /// same namespace (spec.md §4.1's "symbolic-constant extraction";
    /// grounded in `Monomial.get_symbolic_constant` in
    /// `original_source/src/system/action.py`, which walks
    /// `variable_generators` the same way).
    pub fn symbolic_constants(&self, is_coeff: impl Fn(&str) -> bool) -> BTreeSet<String> {
        self.free_names().into_iter().filter(|n| is_coeff(n)).collect()
    }

    /// Every distinct generator name appearing anywhere in this equation, sorted.
    pub fn free_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .terms
            .iter()
            .flat_map(|t| t.names().map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        let mut out = String::new();
        for (i, term) in self.terms.iter().enumerate() {
            let rendered = term.to_string();
            if i == 0 {
                out.push_str(&rendered);
            } else if let Some(stripped) = rendered.strip_prefix('-') {
                out.push_str(" - ");
                out.push_str(stripped);
            } else {
                out.push_str(" + ");
                out.push_str(&rendered);
            }
        }
        write!(f, "{}", out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_terms_combine() {
        let e = Equation::new([
            Monomial::new(2.0, [("S1".to_string(), 1)]),
            Monomial::new(3.0, [("S1".to_string(), 1)]),
        ]);
        assert_eq!(e.terms().len(), 1);
        assert_eq!(e.terms()[0].coefficient, 5.0);
    }

    #[test]
    fn zero_coefficient_terms_drop_out() {
        let e = Equation::new([
            Monomial::new(1.0, [("S1".to_string(), 1)]),
            Monomial::new(-1.0, [("S1".to_string(), 1)]),
        ]);
        assert!(e.is_zero());
    }

    #[test]
    fn substitute_commutes_with_addition() {
        let a = Equation::symbol("S1").add(&Equation::constant(2.0));
        let b = Equation::symbol("S2");
        let repl = Equation::constant(3.0);
        let lhs = a.add(&b).substitute("S1", &repl);
        let rhs = a.substitute("S1", &repl).add(&b.substitute("S1", &repl));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn substitute_replaces_symbol_with_equation() {
        let e = Equation::symbol("S1").mul(&Equation::symbol("S1"));
        let out = e.substitute("S1", &Equation::constant(2.0));
        assert_eq!(out, Equation::constant(4.0));
    }

    #[test]
    fn symbolic_constants_filters_by_predicate() {
        let e = Equation::symbol("S1").add(&Equation::symbol("V_reach_0_0"));
        let coeffs = e.symbolic_constants(|n| n.starts_with("V_reach"));
        assert_eq!(coeffs.len(), 1);
        assert!(coeffs.contains("V_reach_0_0"));
    }

    #[test]
    fn display_uses_plus_minus_no_caret() {
        let e = Equation::new([
            Monomial::new(1.0, [("S1".to_string(), 2)]),
            Monomial::new(-3.0, [("S2".to_string(), 1)]),
        ]);
        assert_eq!(e.to_string(), "S1*S1 - 3*S2");
    }
}
