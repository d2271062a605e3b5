//! Monomials: a numeric coefficient times a product of named generators.
//!
//! Every named quantity in the pipeline — state `S_i`, action `A_i`, noise
//! `D_i`, and every synthesized template coefficient — lives in the same flat
//! namespace of generator names. A template coefficient is therefore not a
//! special case: it is simply one more factor with power 1, exactly as the
//! original Python template builder encodes it (`variable_generators + [coeff_name]`,
//! `power = powers + (1,)`).

use std::collections::BTreeMap;
use std::fmt;

/// A single monomial term: `coefficient * g_1^p_1 * g_2^p_2 * ...`.
///
/// Invariant: `factors` is sorted by generator name, has no duplicate names,
/// and never contains a zero power (normalized away on construction).
#[derive(Debug, Clone, PartialEq)]
pub struct Monomial {
    pub coefficient: f64,
    factors: Vec<(String, u32)>,
}

impl Monomial {
    /// Build a monomial, normalizing duplicate/zero-power factors.
    pub fn new<I>(coefficient: f64, factors: I) -> Self
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        let mut map: BTreeMap<String, u32> = BTreeMap::new();
        for (name, power) in factors {
            if power == 0 {
                continue;
            }
            *map.entry(name).or_insert(0) += power;
        }
        map.retain(|_, power| *power != 0);
        Monomial {
            coefficient,
            factors: map.into_iter().collect(),
        }
    }

    /// The constant monomial `c`.
    pub fn constant(coefficient: f64) -> Self {
        Monomial {
            coefficient,
            factors: Vec::new(),
        }
    }

    /// The monomial `name` with coefficient 1 and power 1.
    pub fn symbol(name: impl Into<String>) -> Self {
        Monomial::new(1.0, [(name.into(), 1)])
    }

    /// The sorted `(name, power)` key shared by all "like terms" of this monomial.
    pub fn key(&self) -> &[(String, u32)] {
        &self.factors
    }

    /// Whether `self` and `other` share the same variable-power multiset.
    pub fn is_like_term(&self, other: &Monomial) -> bool {
        self.factors == other.factors
    }

    /// Total degree (sum of all factor powers).
    pub fn degree(&self) -> u32 {
        self.factors.iter().map(|(_, p)| *p).sum()
    }

    /// Power of `name` in this monomial (0 if absent).
    pub fn power_of(&self, name: &str) -> u32 {
        self.factors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| *p)
            .unwrap_or(0)
    }

    /// Every generator name appearing in this monomial.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factors.iter().map(|(n, _)| n.as_str())
    }

    /// Multiply two monomials: coefficients multiply, factor powers add.
    pub fn mul(&self, other: &Monomial) -> Monomial {
        let mut map: BTreeMap<String, u32> = BTreeMap::new();
        for (n, p) in &self.factors {
            *map.entry(n.clone()).or_insert(0) += p;
        }
        for (n, p) in &other.factors {
            *map.entry(n.clone()).or_insert(0) += p;
        }
        Monomial {
            coefficient: self.coefficient * other.coefficient,
            factors: map.into_iter().filter(|(_, p)| *p != 0).collect(),
        }
    }

    pub fn negate(&self) -> Monomial {
        Monomial {
            coefficient: -self.coefficient,
            factors: self.factors.clone(),
        }
    }

    pub fn scale(&self, c: f64) -> Monomial {
        Monomial {
            coefficient: self.coefficient * c,
            factors: self.factors.clone(),
        }
    }
}

impl fmt::Display for Monomial {
    /// Canonical printer: numeric literal factors print with up to 12
    /// significant digits; each `(name, power)` prints as `name` repeated
    /// `power` times, joined by `*` — this keeps the reparse grammar to
    /// `+ - * /` with no exponent operator, matching the round-trip
    /// invariant against the parser in [`super::parser`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.factors.is_empty() {
            return write!(f, "{}", format_literal(self.coefficient));
        }
        let mut parts: Vec<String> = Vec::new();
        if (self.coefficient - 1.0).abs() > f64::EPSILON {
            parts.push(format_literal(self.coefficient));
        }
        for (name, power) in &self.factors {
            for _ in 0..*power {
                parts.push(name.clone());
            }
        }
        write!(f, "{}", parts.join("*"))
    }
}

/// Format a literal the way the parser can re-read it: plain decimal, no
/// trailing `.0` ambiguity beyond what `f64`'s `{}` already produces.
pub(crate) fn format_literal(x: f64) -> String {
    if x == x.trunc() && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_powers_are_normalized_away() {
        let m = Monomial::new(2.0, [("S1".to_string(), 0), ("S2".to_string(), 1)]);
        assert_eq!(m.key(), &[("S2".to_string(), 1)]);
    }

    #[test]
    fn duplicate_names_accumulate_power() {
        let m = Monomial::new(1.0, [("S1".to_string(), 2), ("S1".to_string(), 1)]);
        assert_eq!(m.power_of("S1"), 3);
    }

    #[test]
    fn mul_adds_powers_and_multiplies_coefficients() {
        let a = Monomial::new(2.0, [("S1".to_string(), 1)]);
        let b = Monomial::new(3.0, [("S1".to_string(), 2), ("S2".to_string(), 1)]);
        let c = a.mul(&b);
        assert_eq!(c.coefficient, 6.0);
        assert_eq!(c.power_of("S1"), 3);
        assert_eq!(c.power_of("S2"), 1);
    }

    #[test]
    fn display_repeats_factors_instead_of_using_exponents() {
        let m = Monomial::new(1.0, [("S1".to_string(), 2)]);
        assert_eq!(m.to_string(), "S1*S1");
    }
}
