//! Renders the constraint system to the solver's SMT-LIB-flavored prefix
//! grammar: `(declare-const <name> Real)` per coefficient, one
//! `(assert (forall ((<v> Real) ...) (=> lhs rhs)))` per
//! [`ConstraintImplication`], and a bare `(assert (<rel> lhs 0))` per
//! [`ConstraintConstant`].
//!
//! This is a distinct printer from [`crate::algebra::equation::Equation`]'s
//! own `Display` (spec.md §4.1's canonical infix form, used for the algebra
//! layer's own round-trip contract): the solver boundary needs prefix
//! S-expressions, so monomials and sums are rendered as `(* ...)`/`(+ ...)`
//! here instead of reusing `Display`. Grounded in the grammar
//! `original_source/src/smt_formula_make_readable.py` consumes (that script
//! itself is the named out-of-scope pretty-printer; only its grammar is
//! ground truth).

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::algebra::monomial::format_literal;
use crate::algebra::{Equation, Monomial};
use crate::constraints::model::{Aggregation, ConstraintConstant, ConstraintImplication, SubConstraint};

/// Render a full SMT-LIB document: one `declare-const` per coefficient name
/// (sorted, so output is byte-reproducible across runs — spec.md §8
/// property 6), followed by one `assert` per implication, then one `assert`
/// per bare constant.
pub fn render_document(
    coefficient_names: &BTreeSet<String>,
    implications: &[ConstraintImplication],
    constants: &[ConstraintConstant],
) -> String {
    let mut out = String::new();
    for name in coefficient_names {
        let _ = writeln!(out, "(declare-const {name} Real)");
    }
    for implication in implications {
        let _ = writeln!(out, "{}", render_implication(implication));
    }
    for constant in constants {
        let _ = writeln!(out, "{}", render_constant(constant));
    }
    out
}

fn render_implication(implication: &ConstraintImplication) -> String {
    let bindings: Vec<String> = implication.variables.iter().map(|v| format!("({v} Real)")).collect();
    let lhs = render_subconstraint(&implication.lhs);
    let rhs = render_subconstraint(&implication.rhs);
    if bindings.is_empty() {
        format!("(assert (=> {lhs} {rhs}))")
    } else {
        format!("(assert (forall ({}) (=> {lhs} {rhs})))", bindings.join(" "))
    }
}

fn render_constant(constant: &ConstraintConstant) -> String {
    let ineq = &constant.inequality;
    format!("(assert ({} {} 0))", ineq.relation.symbol(), render_equation(&ineq.lhs))
}

fn render_subconstraint(sc: &SubConstraint) -> String {
    match sc {
        SubConstraint::True => "true".to_string(),
        SubConstraint::Leaf(ineq) => format!("({} {} 0)", ineq.relation.symbol(), render_equation(&ineq.lhs)),
        SubConstraint::Clause { aggregation, terms } => {
            let op = match aggregation {
                Aggregation::And => "and",
                Aggregation::Or => "or",
            };
            let parts: Vec<String> = terms.iter().map(render_subconstraint).collect();
            format!("({op} {})", parts.join(" "))
        }
    }
}

fn render_equation(eq: &Equation) -> String {
    if eq.is_zero() {
        return "0".to_string();
    }
    let terms: Vec<String> = eq.terms().iter().map(render_monomial).collect();
    if terms.len() == 1 {
        terms.into_iter().next().unwrap()
    } else {
        format!("(+ {})", terms.join(" "))
    }
}

fn render_monomial(m: &Monomial) -> String {
    if m.key().is_empty() {
        return format_literal(m.coefficient);
    }
    let mut factors = Vec::new();
    if (m.coefficient - 1.0).abs() > f64::EPSILON {
        factors.push(format_literal(m.coefficient));
    }
    for (name, power) in m.key() {
        for _ in 0..*power {
            factors.push(name.clone());
        }
    }
    if factors.len() == 1 {
        factors.into_iter().next().unwrap()
    } else {
        format!("(* {})", factors.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Inequality, Relation};

    #[test]
    fn declare_const_lines_are_sorted_by_name() {
        let mut names = BTreeSet::new();
        names.insert("V_reach_1_0".to_string());
        names.insert("V_reach_0_0".to_string());
        let doc = render_document(&names, &[], &[]);
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines[0], "(declare-const V_reach_0_0 Real)");
        assert_eq!(lines[1], "(declare-const V_reach_1_0 Real)");
    }

    #[test]
    fn implication_renders_forall_and_implication_arrow() {
        let lhs = SubConstraint::leaf(Inequality::new(Equation::symbol("S1"), Relation::Ge));
        let rhs = SubConstraint::leaf(Inequality::new(Equation::symbol("V_reach_0_0"), Relation::Ge));
        let implication = ConstraintImplication::new(lhs, rhs);
        let rendered = render_implication(&implication);
        assert!(rendered.starts_with("(assert (forall ("));
        assert!(rendered.contains("(=> (>= S1 0) (>= V_reach_0_0 0))"));
    }

    #[test]
    fn constant_renders_without_forall() {
        let constant = ConstraintConstant::new(Inequality::new(Equation::symbol("Epsilon_reach"), Relation::Ge));
        assert_eq!(render_constant(&constant), "(assert (>= Epsilon_reach 0))");
    }

    #[test]
    fn sum_of_two_monomials_renders_as_plus_expression() {
        let eq = Equation::symbol("S1").add(&Equation::symbol("S2"));
        assert_eq!(render_equation(&eq), "(+ S1 S2)");
    }

    #[test]
    fn monomial_with_coefficient_and_two_factors_renders_as_product() {
        let eq = Equation::new([Monomial::new(3.0, [("S1".to_string(), 2)])]);
        assert_eq!(render_equation(&eq), "(* 3 S1 S1)");
    }
}
