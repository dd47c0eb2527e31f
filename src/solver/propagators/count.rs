//! `Count`: exactly `count_var - 1` of `vars` equal `value` (the `count+1`
//! encoding). `Among` generalises this to a set of target values.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const COUNT_NAME: &str = "count";
const AMONG_NAME: &str = "among";

#[derive(Debug, Clone)]
pub struct Among {
    vars: Vec<VariableId>,
    values: Vec<u32>,
    count_var: VariableId,
    all_vars: Vec<VariableId>,
}

impl Among {
    pub fn new(
        model: &Model,
        vars: Vec<VariableId>,
        values: Vec<u32>,
        count_var: VariableId,
    ) -> Result<Self, ValidationError> {
        model.check_nonempty(AMONG_NAME, &vars)?;
        for &v in &vars {
            model.check_known(AMONG_NAME, v)?;
        }
        model.check_known(AMONG_NAME, count_var)?;
        let mut all_vars = vars.clone();
        all_vars.push(count_var);
        Ok(Among { vars, values, count_var, all_vars })
    }

    /// `Count` is `Among` with a single target value.
    pub fn single(model: &Model, vars: Vec<VariableId>, value: u32, count_var: VariableId) -> Result<Self, ValidationError> {
        model.check_nonempty(COUNT_NAME, &vars)?;
        Self::new(model, vars, vec![value], count_var)
    }
}

impl Propagator for Among {
    fn variables(&self) -> &[VariableId] {
        &self.all_vars
    }

    fn tag(&self) -> &'static str {
        if self.values.len() == 1 { COUNT_NAME } else { AMONG_NAME }
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let matches = |d: &Domain| -> bool { self.values.iter().any(|&v| d.has(v)) };
        let must_match = |d: &Domain| -> bool { d.values().into_iter().all(|v| self.values.contains(&v)) };

        let mut definitely = 0u32;
        let mut possibly = 0u32;
        let mut undecided_vars = Vec::new();
        for &v in &self.vars {
            let d = state.get_domain(v);
            if must_match(&d) {
                definitely += 1;
            } else if matches(&d) {
                possibly += 1;
                undecided_vars.push(v);
            }
        }

        let count_domain = state.get_domain(self.count_var);
        let max_value = count_domain.max_value();
        let lo = definitely + 1;
        let hi = definitely + possibly + 1;
        let mut updates = vec![(self.count_var, count_domain.intersect(&Domain::range(max_value, lo, hi)))];

        let count_domain = state.get_domain(self.count_var);
        if let (Some(c_min), Some(c_max)) = (count_domain.min(), count_domain.max()) {
            let needed_min = c_min.saturating_sub(1);
            let allowed_max = c_max.saturating_sub(1);
            if definitely == allowed_max {
                // No undecided variable may match anymore.
                for &v in &undecided_vars {
                    let d = state.get_domain(v);
                    updates.push((v, d.retain(|val| !self.values.contains(&val))));
                }
            } else if definitely + undecided_vars.len() as u32 == needed_min {
                // Every undecided variable must match.
                for &v in &undecided_vars {
                    let d = state.get_domain(v);
                    updates.push((v, d.retain(|val| self.values.contains(&val))));
                }
            }
        }

        apply_updates(state, updates)
    }
}

impl Model {
    /// Posts `Count(vars, value) == count_var - 1`.
    pub fn post_count(&mut self, vars: Vec<VariableId>, value: u32, count_var: VariableId) -> Result<(), ValidationError> {
        let p = Among::single(self, vars, value, count_var)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }

    /// Posts `Among(vars, values) == count_var - 1`.
    pub fn post_among(
        &mut self,
        vars: Vec<VariableId>,
        values: Vec<u32>,
        count_var: VariableId,
    ) -> Result<(), ValidationError> {
        let p = Among::new(self, vars, values, count_var)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}
