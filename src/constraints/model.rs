//! Constraint primitives shared by every generator in `src/constraints/`.
//!
//! Mirrors the small object model spelled out by the original generators
//! (`original_source/src/system/certificate/*.py`): a `SubConstraint`
//! aggregates inequalities by AND/OR, a `ConstraintImplication` is a
//! universally-quantified `lhs => rhs` over those aggregates, and a
//! `ConstraintConstant` is a bare inequality over synthesis scalars with no
//! quantified variables at all (e.g. `epsilon_reach >= 1e-15`).

use std::collections::BTreeSet;

use crate::algebra::Inequality;

/// How a list of inequalities combines: conjunctively or disjunctively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    And,
    Or,
}

/// A (possibly nested) Boolean combination of [`Inequality`] values.
#[derive(Debug, Clone, PartialEq)]
pub enum SubConstraint {
    /// The trivially-true constraint (an empty conjunction); used by
    /// `InvariantFakeTemplate` and by guard expansion when a label is
    /// unconditionally satisfied.
    True,
    Clause {
        aggregation: Aggregation,
        terms: Vec<SubConstraint>,
    },
    Leaf(Inequality),
}

impl SubConstraint {
    pub fn leaf(ineq: Inequality) -> Self {
        SubConstraint::Leaf(ineq)
    }

    pub fn and(terms: Vec<SubConstraint>) -> Self {
        SubConstraint::flatten(Aggregation::And, terms)
    }

    pub fn or(terms: Vec<SubConstraint>) -> Self {
        SubConstraint::flatten(Aggregation::Or, terms)
    }

    fn flatten(aggregation: Aggregation, terms: Vec<SubConstraint>) -> Self {
        let terms: Vec<SubConstraint> = terms.into_iter().filter(|t| *t != SubConstraint::True).collect();
        if terms.is_empty() {
            return SubConstraint::True;
        }
        if terms.len() == 1 {
            return terms.into_iter().next().unwrap();
        }
        SubConstraint::Clause { aggregation, terms }
    }

    pub fn is_trivially_true(&self) -> bool {
        matches!(self, SubConstraint::True)
    }

    /// Every leaf inequality in this tree, in left-to-right order.
    pub fn leaves(&self) -> Vec<&Inequality> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Inequality>) {
        match self {
            SubConstraint::True => {}
            SubConstraint::Leaf(ineq) => out.push(ineq),
            SubConstraint::Clause { terms, .. } => {
                for t in terms {
                    t.collect_leaves(out);
                }
            }
        }
    }

    /// Every distinct generator name (state/noise/coefficient) free in this subtree.
    pub fn free_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for leaf in self.leaves() {
            names.extend(leaf.lhs.free_names());
        }
        names
    }
}

/// `forall <vars>. lhs => rhs`, the shape every constraint generator emits.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintImplication {
    pub variables: BTreeSet<String>,
    pub lhs: SubConstraint,
    pub rhs: SubConstraint,
}

impl ConstraintImplication {
    /// Build an implication, inferring `variables` as every free name in
    /// `lhs` and `rhs` combined — matching `Constraint.extract`'s
    /// convention of quantifying over exactly the variables it touches.
    pub fn new(lhs: SubConstraint, rhs: SubConstraint) -> Self {
        let mut variables = lhs.free_names();
        variables.extend(rhs.free_names());
        ConstraintImplication { variables, lhs, rhs }
    }
}

/// An inequality over synthesis scalars only (no quantified state/noise variables).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintConstant {
    pub inequality: Inequality,
}

impl ConstraintConstant {
    pub fn new(inequality: Inequality) -> Self {
        ConstraintConstant { inequality }
    }
}

/// Common interface every constraint generator implements.
pub trait Constraint {
    fn extract(&self) -> Vec<ConstraintImplication>;
}
