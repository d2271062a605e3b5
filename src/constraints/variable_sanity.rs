//! Variable-sanity generator (spec.md §4.5.6): bare constants over the
//! synthesis scalars, no quantified state/noise variables.
//!
//! Grounded in `original_source/src/system/certificate/variableC.py`; only
//! the reach-variant clause (`epsilon_reach >= 1e-15`) is wired into this
//! crate's orchestrator, matching spec.md §4.5's active generator list. The
//! reach-avoid clauses the original also emits
//! (`epsilon_safe`/`eta_safe`/`eta*epsilon` bounds) are implemented on
//! [`ReachAvoidSanity`] for API completeness but unused by the pipeline, for
//! the same reason `ReachAvoidVariables`/`V_safe` are unused (see
//! `templates::certificate`).

use crate::algebra::{Equation, Inequality, Relation};
use crate::constraints::model::ConstraintConstant;
use crate::templates::{ReachAvoidVariables, ReachVariables};

const ALMOST_ZERO: f64 = 1e-15;

pub struct ReachSanity<'a> {
    pub variables: &'a ReachVariables,
}

impl<'a> ReachSanity<'a> {
    pub fn extract(&self) -> Vec<ConstraintConstant> {
        vec![ConstraintConstant::new(Inequality::comparing(
            &self.variables.epsilon_reach,
            Relation::Ge,
            &Equation::constant(ALMOST_ZERO),
        ))]
    }
}

pub struct ReachAvoidSanity<'a> {
    pub variables: &'a ReachAvoidVariables,
}

impl<'a> ReachAvoidSanity<'a> {
    pub fn extract(&self) -> Vec<ConstraintConstant> {
        vec![
            ConstraintConstant::new(Inequality::comparing(
                &self.variables.epsilon_safe,
                Relation::Ge,
                &Equation::constant(ALMOST_ZERO),
            )),
            ConstraintConstant::new(Inequality::comparing(
                &self.variables.epsilon_reach,
                Relation::Ge,
                &Equation::constant(ALMOST_ZERO),
            )),
            ConstraintConstant::new(Inequality::new(self.variables.eta_safe.clone(), Relation::Le)),
            ConstraintConstant::new(Inequality::comparing(
                &self.variables.eta_safe.mul(&self.variables.epsilon_safe),
                Relation::Le,
                &Equation::constant(self.variables.eta_epsilon_upper_bound),
            )),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reach_sanity_emits_exactly_the_epsilon_reach_bound() {
        let vars = ReachVariables::new(0.9);
        let generator = ReachSanity { variables: &vars };
        let out = generator.extract();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].inequality.relation, Relation::Ge);
    }

    #[test]
    fn reach_avoid_sanity_emits_four_constants() {
        let vars = ReachAvoidVariables::new(0.9, 1.0);
        let generator = ReachAvoidSanity { variables: &vars };
        assert_eq!(generator.extract().len(), 4);
    }
}
