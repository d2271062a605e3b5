//! Polynomial inequalities/equalities: an [`Equation`] compared to zero.

use std::fmt;

use super::equation::Equation;

/// The comparison relation of an [`Inequality`], matching the comparison
/// operators the bridge grammar accepts (`=`, `<=`, `>=`; strict `<`/`>` are
/// normalized away during constraint generation, never emitted directly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Eq => "=",
            Relation::Le => "<=",
            Relation::Ge => ">=",
        }
    }

    /// Flip the relation's sense, as happens when multiplying both sides by -1.
    pub fn flipped(self) -> Relation {
        match self {
            Relation::Eq => Relation::Eq,
            Relation::Le => Relation::Ge,
            Relation::Ge => Relation::Le,
        }
    }
}

/// `lhs <relation> 0`, the normalized form every generator produces: instead
/// of carrying both sides of a comparison, the right-hand side is folded
/// into `lhs` at construction time (`lhs - rhs`), matching the single
/// `Inequality(equation, relation)` shape in the original certificate
/// generators.
#[derive(Debug, Clone, PartialEq)]
pub struct Inequality {
    pub lhs: Equation,
    pub relation: Relation,
}

impl Inequality {
    pub fn new(lhs: Equation, relation: Relation) -> Self {
        Inequality { lhs, relation }
    }

    /// Build `lhs <relation> rhs`, normalizing to `(lhs - rhs) <relation> 0`.
    pub fn comparing(lhs: &Equation, relation: Relation, rhs: &Equation) -> Self {
        Inequality::new(lhs.sub(rhs), relation)
    }

    pub fn negate(&self) -> Inequality {
        Inequality::new(self.lhs.negate(), self.relation.flipped())
    }

    pub fn substitute(&self, name: &str, replacement: &Equation) -> Inequality {
        Inequality::new(self.lhs.substitute(name, replacement), self.relation)
    }
}

impl fmt::Display for Inequality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} 0", self.lhs, self.relation.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparing_normalizes_rhs_into_lhs() {
        let ineq = Inequality::comparing(&Equation::symbol("S1"), Relation::Ge, &Equation::constant(3.0));
        assert_eq!(ineq.lhs, Equation::symbol("S1").sub(&Equation::constant(3.0)));
    }

    #[test]
    fn negate_flips_relation_and_sign() {
        let ineq = Inequality::new(Equation::symbol("S1"), Relation::Le);
        let negated = ineq.negate();
        assert_eq!(negated.relation, Relation::Ge);
        assert_eq!(negated.lhs, Equation::symbol("S1").negate());
    }

    #[test]
    fn display_matches_bridge_grammar() {
        let ineq = Inequality::new(Equation::symbol("S1"), Relation::Le);
        assert_eq!(ineq.to_string(), "S1 <= 0");
    }
}
