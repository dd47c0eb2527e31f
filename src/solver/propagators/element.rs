//! `result = array[index]`, where `array` is a fixed list of variables and
//! `index` is zero-based (so `index`'s domain universe is `array.len()`).

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "element";

/// Enforces `result = array[index - 1]` (`index` is 1-indexed like every
/// other domain in the solver, so position `1` selects `array[0]`).
#[derive(Debug, Clone)]
pub struct Element {
    index: VariableId,
    array: Vec<VariableId>,
    result: VariableId,
    all_vars: Vec<VariableId>,
}

impl Element {
    pub fn new(model: &Model, index: VariableId, array: Vec<VariableId>, result: VariableId) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &array)?;
        model.check_known(NAME, index)?;
        for &v in &array {
            model.check_known(NAME, v)?;
        }
        model.check_known(NAME, result)?;
        let mut all_vars = vec![index];
        all_vars.extend(array.iter().copied());
        all_vars.push(result);
        Ok(Element { index, array, result, all_vars })
    }
}

impl Propagator for Element {
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
        let index_domain = state.get_domain(self.index);
        let result_domain = state.get_domain(self.result);
        let mut updates = Vec::new();

        // Drop index candidates whose array slot can no longer reach any
        // value in result's domain.
        let surviving_indices: Vec<u32> = index_domain
            .values()
            .into_iter()
            .filter(|&i| {
                (i as usize) <= self.array.len() && {
                    let slot = state.get_domain(self.array[i as usize - 1]);
                    slot.values().iter().any(|v| result_domain.has(*v))
                }
            })
            .collect();
        updates.push((self.index, Domain::from_values(index_domain.max_value(), surviving_indices.clone())));

        // Narrow result to the union of values reachable through any
        // surviving index.
        let reachable: Vec<u32> = surviving_indices
            .iter()
            .flat_map(|&i| state.get_domain(self.array[i as usize - 1]).values())
            .collect();
        updates.push((self.result, result_domain.intersect(&Domain::from_values(result_domain.max_value(), reachable))));

        // If the index is fixed, the chosen slot must equal result.
        if let Some(i) = index_domain.singleton_value() {
            if (i as usize) <= self.array.len() {
                let slot_var = self.array[i as usize - 1];
                let slot_domain = state.get_domain(slot_var);
                let result_domain = state.get_domain(self.result);
                let narrowed = slot_domain.intersect(&result_domain);
                updates.push((slot_var, narrowed));
            }
        }

        apply_updates(state, updates)
    }
}

impl Model {
    pub fn post_element(&mut self, index: VariableId, array: Vec<VariableId>, result: VariableId) -> Result<(), ValidationError> {
        let p = Element::new(self, index, array, result)?;
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
    fn fixed_index_links_result_to_slot() {
        let mut model = Model::new();
        let idx = model.new_variable_with_domain(Domain::from_values(3, [2]), None);
        let a0 = model.new_variable(10, None);
        let a1 = model.new_variable_with_domain(Domain::from_values(10, [7]), None);
        let a2 = model.new_variable(10, None);
        let result = model.new_variable(10, None);
        model.post_element(idx, vec![a0, a1, a2], result).unwrap();
        let r = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert_eq!(r.get_domain(result).singleton_value(), Some(7));
    }

    #[test]
    fn index_candidates_narrow_when_result_constrained() {
        let mut model = Model::new();
        let idx = model.new_variable(2, None);
        let a0 = model.new_variable_with_domain(Domain::from_values(10, [1]), None);
        let a1 = model.new_variable_with_domain(Domain::from_values(10, [2]), None);
        let result = model.new_variable_with_domain(Domain::from_values(10, [2]), None);
        model.post_element(idx, vec![a0, a1], result).unwrap();
        let r = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert_eq!(r.get_domain(idx).singleton_value(), Some(2));
    }
}
