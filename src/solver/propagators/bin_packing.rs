//! `BinPacking`: each item is assigned to a bin (its variable's value), and
//! the total size of items in any bin may not exceed that bin's capacity.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "bin_packing";

#[derive(Debug, Clone)]
pub struct BinPacking {
    bin_of_item: Vec<VariableId>,
    item_sizes: Vec<u32>,
    bin_capacities: Vec<u32>,
}

impl BinPacking {
    pub fn new(
        model: &Model,
        bin_of_item: Vec<VariableId>,
        item_sizes: Vec<u32>,
        bin_capacities: Vec<u32>,
    ) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &bin_of_item)?;
        if bin_of_item.len() != item_sizes.len() {
            return Err(ValidationError::MismatchedLengths {
                constraint: NAME,
                expected: "bin_of_item.len() == item_sizes.len()",
                actual: vec![bin_of_item.len(), item_sizes.len()],
            });
        }
        for &v in &bin_of_item {
            model.check_known(NAME, v)?;
        }
        Ok(BinPacking { bin_of_item, item_sizes, bin_capacities })
    }

    fn load_bounds(&self, state: &State, bin: u32, skip: usize) -> (u32, u32) {
        let mut definite = 0u32;
        let mut possible = 0u32;
        for (i, (&v, &size)) in self.bin_of_item.iter().zip(self.item_sizes.iter()).enumerate() {
            if i == skip {
                continue;
            }
            let d = state.get_domain(v);
            if d.singleton_value() == Some(bin) {
                definite += size;
            } else if d.has(bin) {
                possible += size;
            }
        }
        (definite, definite + possible)
    }
}

impl Propagator for BinPacking {
    fn variables(&self) -> &[VariableId] {
        &self.bin_of_item
    }

    fn tag(&self) -> &'static str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let mut updates = Vec::new();
        for (i, (&v, &size)) in self.bin_of_item.iter().zip(self.item_sizes.iter()).enumerate() {
            let d = state.get_domain(v);
            let surviving: Vec<u32> = d
                .values()
                .into_iter()
                .filter(|&bin| {
                    let capacity = self.bin_capacities.get(bin as usize - 1).copied().unwrap_or(0);
                    let (definite, _) = self.load_bounds(state, bin, i);
                    definite + size <= capacity
                })
                .collect();
            updates.push((v, Domain::from_values(d.max_value(), surviving)));
        }
        apply_updates(state, updates)
    }
}

impl Model {
    pub fn post_bin_packing(
        &mut self,
        bin_of_item: Vec<VariableId>,
        item_sizes: Vec<u32>,
        bin_capacities: Vec<u32>,
    ) -> Result<(), ValidationError> {
        let p = BinPacking::new(self, bin_of_item, item_sizes, bin_capacities)?;
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
    fn excludes_bin_that_would_overflow() {
        let mut model = Model::new();
        let a = model.new_variable_with_domain(Domain::from_values(2, [1]), None);
        let b = model.new_variable(2, None);
        model.post_bin_packing(vec![a, b], vec![5, 4], vec![6, 10]).unwrap();
        let r = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert!(!r.get_domain(b).has(1));
    }
}
