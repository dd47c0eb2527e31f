//! Global Cardinality Constraint: for each tracked value, a dedicated
//! counter variable tracks how many of `vars` take that value.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "gcc";

/// For each `(value, count_var)` pair, enforces `count_var - 1 ==` the
/// number of `vars` equal to `value`.
#[derive(Debug, Clone)]
pub struct GlobalCardinality {
    vars: Vec<VariableId>,
    counters: Vec<(u32, VariableId)>,
    all_vars: Vec<VariableId>,
}

impl GlobalCardinality {
    pub fn new(
        model: &Model,
        vars: Vec<VariableId>,
        counters: Vec<(u32, VariableId)>,
    ) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &vars)?;
        for &v in &vars {
            model.check_known(NAME, v)?;
        }
        for &(_, c) in &counters {
            model.check_known(NAME, c)?;
        }
        let mut all_vars = vars.clone();
        all_vars.extend(counters.iter().map(|&(_, c)| c));
        Ok(GlobalCardinality { vars, counters, all_vars })
    }
}

impl Propagator for GlobalCardinality {
    fn variables(&self) -> &[VariableId] {
        &self.all_vars
    }

    fn tag(&self) -> &'static str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let mut updates = Vec::new();
        for &(value, count_var) in &self.counters {
            let mut definitely = 0u32;
            let mut undecided = Vec::new();
            for &v in &self.vars {
                let d = state.get_domain(v);
                if d.singleton_value() == Some(value) {
                    definitely += 1;
                } else if d.has(value) {
                    undecided.push(v);
                }
            }
            let count_domain = state.get_domain(count_var);
            let max_value = count_domain.max_value();
            let lo = definitely + 1;
            let hi = definitely + undecided.len() as u32 + 1;
            updates.push((count_var, count_domain.intersect(&Domain::range(max_value, lo, hi))));

            let count_domain = state.get_domain(count_var);
            if let (Some(c_min), Some(c_max)) = (count_domain.min(), count_domain.max()) {
                let allowed_max = c_max.saturating_sub(1);
                let needed_min = c_min.saturating_sub(1);
                if definitely == allowed_max {
                    for &v in &undecided {
                        updates.push((v, state.get_domain(v).remove_value(value)));
                    }
                } else if definitely + undecided.len() as u32 == needed_min {
                    for &v in &undecided {
                        updates.push((v, Domain::from_values(state.get_domain(v).max_value(), [value])));
                    }
                }
            }
        }
        apply_updates(state, updates)
    }
}

impl Model {
    /// Posts a GCC linking each `(value, count_var)` pair in `counters` to
    /// how many of `vars` take that value.
    pub fn post_gcc(&mut self, vars: Vec<VariableId>, counters: Vec<(u32, VariableId)>) -> Result<(), ValidationError> {
        let p = GlobalCardinality::new(self, vars, counters)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::propagation::run_to_fixed_point;

    #[test]
    fn each_counter_tracks_its_own_value() {
        let mut model = Model::new();
        let a = model.new_variable(2, None);
        let b = model.new_variable(2, None);
        let count1 = model.new_variable(3, None);
        let count2 = model.new_variable(3, None);
        model.post_gcc(vec![a, b], vec![(1, count1), (2, count2)]).unwrap();
        let result = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert_eq!(result.get_domain(count1).min(), Some(1));
        assert_eq!(result.get_domain(count2).min(), Some(1));
    }
}
