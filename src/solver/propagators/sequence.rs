//! `Sequence`: in every window of `window` consecutive variables, at least
//! `low` and at most `high` take one of `values`. Implemented over a
//! per-window reified boolean count, one window at a time.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "sequence";

#[derive(Debug, Clone)]
pub struct Sequence {
    vars: Vec<VariableId>,
    values: Vec<u32>,
    low: u32,
    high: u32,
    window: usize,
}

impl Sequence {
    pub fn new(
        model: &Model,
        vars: Vec<VariableId>,
        values: Vec<u32>,
        low: u32,
        high: u32,
        window: usize,
    ) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &vars)?;
        if window == 0 || window > vars.len() {
            return Err(ValidationError::IndexOutOfRange { constraint: NAME, index: window as i64, length: vars.len() });
        }
        for &v in &vars {
            model.check_known(NAME, v)?;
        }
        Ok(Sequence { vars, values, low, high, window })
    }
}

impl Propagator for Sequence {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn tag(&self) -> &'static str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let mut updates = Vec::new();
        for win_start in 0..=(self.vars.len() - self.window) {
            let window_vars = &self.vars[win_start..win_start + self.window];
            let mut definitely = 0u32;
            let mut undecided = Vec::new();
            for &v in window_vars {
                let d = state.get_domain(v);
                let all_match = d.values().into_iter().all(|val| self.values.contains(&val));
                let any_match = d.values().into_iter().any(|val| self.values.contains(&val));
                if all_match {
                    definitely += 1;
                } else if any_match {
                    undecided.push(v);
                }
            }
            if definitely == self.high {
                for &v in &undecided {
                    let d = state.get_domain(v);
                    updates.push((v, d.retain(|val| !self.values.contains(&val))));
                }
            } else if definitely + undecided.len() as u32 == self.low {
                for &v in &undecided {
                    let d = state.get_domain(v);
                    updates.push((v, d.retain(|val| self.values.contains(&val))));
                }
            }
        }
        apply_updates(state, updates)
    }
}

impl Model {
    pub fn post_sequence(
        &mut self,
        vars: Vec<VariableId>,
        values: Vec<u32>,
        low: u32,
        high: u32,
        window: usize,
    ) -> Result<(), ValidationError> {
        let p = Sequence::new(self, vars, values, low, high, window)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::domain::Domain;
    use crate::solver::propagation::run_to_fixed_point;

    #[test]
    fn forces_last_member_when_window_needs_more_matches() {
        let mut model = Model::new();
        let a = model.new_variable_with_domain(Domain::from_values(3, [1]), None);
        let b = model.new_variable(3, None);
        model.post_sequence(vec![a, b], vec![1], 2, 2, 2).unwrap();
        let r = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert_eq!(r.get_domain(b).singleton_value(), Some(1));
    }
}
