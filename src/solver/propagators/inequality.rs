//! Binary ordering and disequality constraints between two variables.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "inequality";

/// The relation an [`Inequality`] enforces between its two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    NotEqual,
}

/// Enforces `a <op> b` for one of [`Op`]'s relations.
#[derive(Debug, Clone)]
pub struct Inequality {
    vars: [VariableId; 2],
    op: Op,
}

impl Inequality {
    pub fn new(model: &Model, a: VariableId, op: Op, b: VariableId) -> Result<Self, ValidationError> {
        model.check_known(NAME, a)?;
        model.check_known(NAME, b)?;
        Ok(Inequality { vars: [a, b], op })
    }
}

impl Propagator for Inequality {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn tag(&self) -> &'static str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let [a, b] = self.vars;
        let da = state.get_domain(a);
        let db = state.get_domain(b);

        let (new_da, new_db) = match self.op {
            Op::LessThan => (
                db.max().map(|m| da.remove_above(m.saturating_sub(1))).unwrap_or(da.clone()),
                da.min().map(|m| db.remove_below(m.saturating_add(1))).unwrap_or(db.clone()),
            ),
            Op::LessEqual => (
                db.max().map(|m| da.remove_above(m)).unwrap_or(da.clone()),
                da.min().map(|m| db.remove_below(m)).unwrap_or(db.clone()),
            ),
            Op::GreaterThan => (
                db.min().map(|m| da.remove_below(m.saturating_add(1))).unwrap_or(da.clone()),
                da.max().map(|m| db.remove_above(m.saturating_sub(1))).unwrap_or(db.clone()),
            ),
            Op::GreaterEqual => (
                db.min().map(|m| da.remove_below(m)).unwrap_or(da.clone()),
                da.max().map(|m| db.remove_above(m)).unwrap_or(db.clone()),
            ),
            Op::NotEqual => {
                let new_da = if let Some(v) = db.singleton_value() { da.remove_value(v) } else { da.clone() };
                let new_db = if let Some(v) = da.singleton_value() { db.remove_value(v) } else { db.clone() };
                (new_da, new_db)
            }
        };

        apply_updates(state, [(a, new_da), (b, new_db)])
    }
}

impl Model {
    pub fn post_inequality(&mut self, a: VariableId, op: Op, b: VariableId) -> Result<(), ValidationError> {
        let p = Inequality::new(self, a, op, b)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::propagation::run_to_fixed_point;

    #[test]
    fn less_than_tightens_both_bounds() {
        let mut model = Model::new();
        let a = model.new_variable(10, None);
        let b = model.new_variable(10, None);
        model.post_inequality(a, Op::LessThan, b).unwrap();
        let result = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert_eq!(result.get_domain(a).max(), Some(9));
        assert_eq!(result.get_domain(b).min(), Some(2));
    }

    #[test]
    fn not_equal_prunes_from_singleton() {
        let mut model = Model::new();
        let a = model.new_variable_with_domain(crate::solver::domain::Domain::from_values(5, [3]), None);
        let b = model.new_variable(5, None);
        model.post_inequality(a, Op::NotEqual, b).unwrap();
        let result = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert!(!result.get_domain(b).has(3));
    }
}
