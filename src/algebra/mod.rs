//! Symbolic multivariate polynomial algebra.
//!
//! Grounded in `original_source/src/system/action.py` and
//! `.../certificate/template.py`: coefficients of a polynomial template are
//! not numbers, they are ordinary named generators (power 1, like any state
//! or action variable) that the solver later assigns. This module therefore
//! has exactly one representation for "unknown quantity" — [`Monomial`]'s
//! factor list — rather than a separate symbolic-constant type.

pub mod equation;
pub mod inequality;
pub mod monomial;
pub mod parser;

pub use equation::Equation;
pub use inequality::{Inequality, Relation};
pub use monomial::Monomial;
pub use parser::{parse_equation, parse_inequality};

/// Enumerate every monomial of total degree at most `max_degree` over the
/// given ordered list of generator names, in graded lexicographic (grlex)
/// order: lower total degree first, then within a degree, lexicographic by
/// descending power of the earliest-listed generator. This is the order
/// `template.py`'s `get_monomials` walks when handing out fresh coefficient
/// names, and reproducing it exactly is what keeps coefficient naming
/// reproducible across runs (see spec.md's determinism testable property).
pub fn monomials_up_to_degree(names: &[String], max_degree: u32) -> Vec<Vec<(String, u32)>> {
    let mut out = Vec::new();
    for degree in 0..=max_degree {
        enumerate_fixed_degree(names, degree, &mut out);
    }
    out
}

/// Every power tuple over `names` summing to exactly `degree`, appended to
/// `out` in descending order of the first generator's power.
fn enumerate_fixed_degree(names: &[String], degree: u32, out: &mut Vec<Vec<(String, u32)>>) {
    match names.split_first() {
        None => {
            if degree == 0 {
                out.push(Vec::new());
            }
        }
        Some((head, tail)) => {
            for power in (0..=degree).rev() {
                let mut rest = Vec::new();
                enumerate_fixed_degree(tail, degree - power, &mut rest);
                for mut tuple in rest {
                    if power > 0 {
                        tuple.insert(0, (head.clone(), power));
                    }
                    out.push(tuple);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_every_monomial_up_to_degree_two_over_one_generator() {
        let names = vec!["S1".to_string()];
        let monos = monomials_up_to_degree(&names, 2);
        // degree 0: {}, degree 1: {S1^1}, degree 2: {S1^2}
        assert_eq!(monos.len(), 3);
        assert_eq!(monos[0], Vec::<(String, u32)>::new());
        assert_eq!(monos[1], vec![("S1".to_string(), 1)]);
        assert_eq!(monos[2], vec![("S1".to_string(), 2)]);
    }

    #[test]
    fn grlex_order_over_two_generators_degree_three() {
        let names = vec!["S1".to_string(), "S2".to_string()];
        let monos = monomials_up_to_degree(&names, 3);
        // Within degree 3: S1^3, S1^2 S2, S1 S2^2, S2^3, in that order.
        let degree_three: Vec<_> = monos
            .iter()
            .filter(|m| m.iter().map(|(_, p)| p).sum::<u32>() == 3)
            .cloned()
            .collect();
        assert_eq!(
            degree_three,
            vec![
                vec![("S1".to_string(), 3)],
                vec![("S1".to_string(), 2), ("S2".to_string(), 1)],
                vec![("S1".to_string(), 1), ("S2".to_string(), 2)],
                vec![("S2".to_string(), 3)],
            ]
        );
    }

    #[test]
    fn every_tuple_has_the_requested_total_degree() {
        let names = vec!["S1".to_string(), "S2".to_string(), "S3".to_string()];
        let monos = monomials_up_to_degree(&names, 2);
        for (degree, tuples) in [(0u32, 1usize), (1, 3), (2, 6)] {
            let count = monos
                .iter()
                .filter(|m| m.iter().map(|(_, p)| p).sum::<u32>() == degree)
                .count();
            assert_eq!(count, tuples, "degree {degree}");
        }
    }
}
