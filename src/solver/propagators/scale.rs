//! `y = factor * x` for a constant non-zero integer `factor`.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "scale";

/// Enforces `y = factor * x`.
#[derive(Debug, Clone)]
pub struct Scale {
    vars: [VariableId; 2],
    factor: i64,
}

impl Scale {
    pub fn new(model: &Model, x: VariableId, factor: i64, y: VariableId) -> Result<Self, ValidationError> {
        model.check_known(NAME, x)?;
        model.check_known(NAME, y)?;
        if factor == 0 {
            return Err(ValidationError::NonPositiveValue { constraint: NAME, field: "factor", value: 0 });
        }
        Ok(Scale { vars: [x, y], factor })
    }
}

impl Propagator for Scale {
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

        let scaled_x = Domain::from_values(
            dy.max_value(),
            dx.values().into_iter().filter_map(|v| scale(v, self.factor)),
        );
        let new_dy = dy.intersect(&scaled_x);

        let valid_x: Vec<u32> = dx
            .values()
            .into_iter()
            .filter(|&v| scale(v, self.factor).map(|sv| new_dy.has(sv)).unwrap_or(false))
            .collect();
        let new_dx = Domain::from_values(dx.max_value(), valid_x);

        apply_updates(state, [(x, new_dx), (y, new_dy)])
    }
}

fn scale(v: u32, factor: i64) -> Option<u32> {
    let scaled = v as i64 * factor;
    if scaled >= 1 && scaled <= u32::MAX as i64 {
        Some(scaled as u32)
    } else {
        None
    }
}

impl Model {
    pub fn post_scale(&mut self, x: VariableId, factor: i64, y: VariableId) -> Result<(), ValidationError> {
        let p = Scale::new(self, x, factor, y)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::propagation::run_to_fixed_point;

    #[test]
    fn scales_domain_both_ways() {
        let mut model = Model::new();
        let x = model.new_variable(5, None);
        let y = model.new_variable(20, None);
        model.post_scale(x, 3, y).unwrap();
        let result = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert_eq!(result.get_domain(y).values(), vec![3, 6, 9, 12, 15]);
    }
}
