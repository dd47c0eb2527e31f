//! `y = x + offset`, the simplest possible link between two variables.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "arithmetic";

/// Enforces `y = x + offset`, bidirectionally.
#[derive(Debug, Clone)]
pub struct Arithmetic {
    vars: [VariableId; 2],
    offset: i64,
}

impl Arithmetic {
    pub fn new(model: &Model, x: VariableId, y: VariableId, offset: i64) -> Result<Self, ValidationError> {
        model.check_known(NAME, x)?;
        model.check_known(NAME, y)?;
        Ok(Arithmetic { vars: [x, y], offset })
    }
}

impl Propagator for Arithmetic {
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
        let [x, y] = self.vars;
        let dx = state.get_domain(x);
        let dy = state.get_domain(y);

        // y must equal x + offset, so y's feasible set is x shifted, and
        // x's feasible set is y shifted back.
        let shifted_from_x = Domain::from_values(
            dy.max_value(),
            dx.values().into_iter().filter_map(|v| shift(v, self.offset)),
        );
        let shifted_from_y = Domain::from_values(
            dx.max_value(),
            dy.values().into_iter().filter_map(|v| shift(v, -self.offset)),
        );

        let new_dy = dy.intersect(&shifted_from_x);
        let new_dx = dx.intersect(&shifted_from_y);

        apply_updates(state, [(x, new_dx), (y, new_dy)])
    }
}

fn shift(v: u32, offset: i64) -> Option<u32> {
    let shifted = v as i64 + offset;
    if shifted >= 1 && shifted <= u32::MAX as i64 {
        Some(shifted as u32)
    } else {
        None
    }
}

impl Model {
    /// Posts `y = x + offset`.
    pub fn post_arithmetic(&mut self, x: VariableId, y: VariableId, offset: i64) -> Result<(), ValidationError> {
        let p = Arithmetic::new(self, x, y, offset)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrows_both_sides() {
        let mut model = Model::new();
        let x = model.new_variable(10, None);
        let y = model.new_variable(10, None);
        model.post_arithmetic(x, y, 2).unwrap();
        let state = model.root_state();
        let result = crate::solver::propagation::run_to_fixed_point(&model, state).unwrap();
        // x in 1..=10, y = x+2 must stay within 1..=10, so x <= 8 and y >= 3.
        assert_eq!(result.get_domain(x).max(), Some(8));
        assert_eq!(result.get_domain(y).min(), Some(3));
    }
}
