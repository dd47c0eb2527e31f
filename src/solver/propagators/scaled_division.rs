//! `y = floor(x / divisor)` for a constant positive `divisor`.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "scaled_division";

/// Enforces `y = floor(x / divisor)`.
#[derive(Debug, Clone)]
pub struct ScaledDivision {
    vars: [VariableId; 2],
    divisor: u32,
}

impl ScaledDivision {
    pub fn new(model: &Model, x: VariableId, divisor: u32, y: VariableId) -> Result<Self, ValidationError> {
        model.check_known(NAME, x)?;
        model.check_known(NAME, y)?;
        if divisor == 0 {
            return Err(ValidationError::NonPositiveValue { constraint: NAME, field: "divisor", value: 0 });
        }
        Ok(ScaledDivision { vars: [x, y], divisor })
    }
}

impl Propagator for ScaledDivision {
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

        let derived_y = Domain::from_values(dy.max_value(), dx.values().into_iter().map(|v| v / self.divisor).filter(|&q| q >= 1));
        let new_dy = dy.intersect(&derived_y);

        let valid_x: Vec<u32> = dx.values().into_iter().filter(|&v| new_dy.has(v / self.divisor)).collect();
        let new_dx = Domain::from_values(dx.max_value(), valid_x);

        apply_updates(state, [(x, new_dx), (y, new_dy)])
    }
}

impl Model {
    pub fn post_scaled_division(&mut self, x: VariableId, divisor: u32, y: VariableId) -> Result<(), ValidationError> {
        let p = ScaledDivision::new(self, x, divisor, y)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::propagation::run_to_fixed_point;

    #[test]
    fn divides_and_prunes() {
        let mut model = Model::new();
        let x = model.new_variable(9, None);
        let y = model.new_variable(9, None);
        model.post_scaled_division(x, 3, y).unwrap();
        let result = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert_eq!(result.get_domain(y).values(), vec![1, 2, 3]);
    }
}
