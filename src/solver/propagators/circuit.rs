//! `Circuit`: `successors[i]` names the next node after `i`; the whole
//! array must describe a single Hamiltonian cycle over `1..=n`.
//!
//! Built from `AllDifferent` over the successor array (no two nodes share a
//! successor) plus a no-premature-subtour check driven by explicit "order"
//! variables: `order[i]` is node `i`'s position when walking the cycle from
//! node `1`, so `order` strictly increases along the cycle except for the
//! single wrap-around edge back to node `1`.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "circuit";

/// Enforces that `successors` forms a single Hamiltonian cycle over nodes
/// `1..=successors.len()`, using `order` (one per node, same length) as
/// auxiliary variables tracking position along the cycle from node `1`.
#[derive(Debug, Clone)]
pub struct Circuit {
    successors: Vec<VariableId>,
    order: Vec<VariableId>,
    all_vars: Vec<VariableId>,
}

impl Circuit {
    pub fn new(model: &Model, successors: Vec<VariableId>, order: Vec<VariableId>) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &successors)?;
        if successors.len() != order.len() {
            return Err(ValidationError::MismatchedLengths {
                constraint: NAME,
                expected: "successors.len() == order.len()",
                actual: vec![successors.len(), order.len()],
            });
        }
        for &v in successors.iter().chain(order.iter()) {
            model.check_known(NAME, v)?;
        }
        let mut all_vars = successors.clone();
        all_vars.extend(order.iter().copied());
        Ok(Circuit { successors, order, all_vars })
    }
}

impl Propagator for Circuit {
    fn variables(&self) -> &[VariableId] {
        &self.all_vars
    }

    fn tag(&self) -> &'static str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let mut updates = Vec::new();

        // No node may be its own successor (that would be a length-1 subtour).
        for (i, &succ) in self.successors.iter().enumerate() {
            let node = (i + 1) as u32;
            let d = state.get_domain(succ);
            if d.has(node) {
                updates.push((succ, d.remove_value(node)));
            }
        }

        // AllDifferent over successors: a value fixed as someone's successor
        // can't be anyone else's.
        let fixed: Vec<u32> = self.successors.iter().filter_map(|&s| state.get_domain(s).singleton_value()).collect();
        for &s in &self.successors {
            let d = state.get_domain(s);
            if d.is_singleton() {
                continue;
            }
            let own = d.singleton_value();
            let others: Vec<u32> = fixed.iter().copied().filter(|v| Some(*v) != own).collect();
            if !others.is_empty() {
                updates.push((s, d.retain(|v| !others.contains(&v))));
            }
        }

        // order[0] (node 1's position) is fixed at 1; order strictly
        // increases across every edge except the one returning to node 1.
        if let Some(&order0) = self.order.first() {
            updates.push((order0, Domain::from_values(state.get_domain(order0).max_value(), [1])));
        }
        for (i, &succ) in self.successors.iter().enumerate() {
            let node = (i + 1) as u32;
            if let Some(next_node) = state.get_domain(succ).singleton_value() {
                if next_node != 1 {
                    // order[next_node - 1] > order[node - 1]
                    let order_here = state.get_domain(self.order[i]);
                    let order_next = state.get_domain(self.order[next_node as usize - 1]);
                    if let Some(lo) = order_here.min() {
                        updates.push((self.order[next_node as usize - 1], order_next.remove_below(lo.saturating_add(1))));
                    }
                    if let Some(hi) = order_next.max() {
                        updates.push((self.order[i], order_here.remove_above(hi.saturating_sub(1).max(1))));
                    }
                }
            }
        }

        apply_updates(state, updates)
    }
}

impl Model {
    pub fn post_circuit(&mut self, successors: Vec<VariableId>, order: Vec<VariableId>) -> Result<(), ValidationError> {
        let p = Circuit::new(self, successors, order)?;
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
    fn node_cannot_be_its_own_successor() {
        let mut model = Model::new();
        let s0 = model.new_variable(3, None);
        let s1 = model.new_variable(3, None);
        let s2 = model.new_variable(3, None);
        let o0 = model.new_variable(3, None);
        let o1 = model.new_variable(3, None);
        let o2 = model.new_variable(3, None);
        model.post_circuit(vec![s0, s1, s2], vec![o0, o1, o2]).unwrap();
        let r = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert!(!r.get_domain(s0).has(1));
        assert!(!r.get_domain(s1).has(2));
        assert!(!r.get_domain(s2).has(3));
    }

    #[test]
    fn fixed_successor_value_excludes_others() {
        let mut model = Model::new();
        let s0 = model.new_variable_with_domain(Domain::from_values(3, [2]), None);
        let s1 = model.new_variable(3, None);
        let s2 = model.new_variable(3, None);
        let o0 = model.new_variable(3, None);
        let o1 = model.new_variable(3, None);
        let o2 = model.new_variable(3, None);
        model.post_circuit(vec![s0, s1, s2], vec![o0, o1, o2]).unwrap();
        let r = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert!(!r.get_domain(s1).has(2));
        assert!(!r.get_domain(s2).has(2));
    }
}
