//! Strategies for ordering the values a chosen variable's domain is tried in.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cell::RefCell;

use crate::solver::domain::Value;
use crate::solver::model::Model;
use crate::solver::state::State;
use crate::solver::variable::VariableId;

/// Orders the values of `var_id`'s current domain for a branch-and-try loop.
pub trait ValueOrderingHeuristic: std::fmt::Debug {
    fn order_values(&self, model: &Model, state: &State, var_id: VariableId) -> Vec<Value>;

    /// Notifies the heuristic that [`crate::solver::optimisation::Optimiser`]
    /// found a new best complete solution with this objective value. Most
    /// heuristics ignore it; [`ObjImproving`] uses it to chase the
    /// incumbent.
    fn on_incumbent(&self, _value: Value) {}
}

/// Tries values in ascending order -- the solver's default, deterministic choice.
#[derive(Debug, Default)]
pub struct Min;

impl ValueOrderingHeuristic for Min {
    fn order_values(&self, _model: &Model, state: &State, var_id: VariableId) -> Vec<Value> {
        state.get_domain(var_id).values()
    }
}

/// Tries the value closest to a running incumbent objective value first,
/// useful once the [`crate::solver::optimisation`] module has a bound to
/// chase. Falls back to ascending order before any incumbent exists.
#[derive(Debug)]
pub struct ObjImproving {
    target: RefCell<Option<Value>>,
}

impl ObjImproving {
    pub fn new() -> Self {
        ObjImproving { target: RefCell::new(None) }
    }

    /// Called by the optimizer whenever a better incumbent is found.
    pub fn set_target(&self, value: Value) {
        *self.target.borrow_mut() = Some(value);
    }

    /// The incumbent value this heuristic is currently chasing, if any.
    pub fn current_target(&self) -> Option<Value> {
        *self.target.borrow()
    }
}

impl Default for ObjImproving {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueOrderingHeuristic for ObjImproving {
    fn order_values(&self, _model: &Model, state: &State, var_id: VariableId) -> Vec<Value> {
        let mut values = state.get_domain(var_id).values();
        if let Some(target) = *self.target.borrow() {
            values.sort_by_key(|&v| (v as i64 - target as i64).abs());
        }
        values
    }

    fn on_incumbent(&self, value: Value) {
        self.set_target(value);
    }
}

/// Tries values in a fixed-seed shuffled order, for diversifying search
/// across restarts while staying reproducible given the same seed.
#[derive(Debug)]
pub struct Random {
    seed: u64,
}

impl Random {
    pub fn new(seed: u64) -> Self {
        Random { seed }
    }
}

impl ValueOrderingHeuristic for Random {
    fn order_values(&self, _model: &Model, state: &State, var_id: VariableId) -> Vec<Value> {
        let mut values = state.get_domain(var_id).values();
        let mut rng = StdRng::seed_from_u64(self.seed ^ var_id as u64);
        values.shuffle(&mut rng);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::domain::Domain;

    #[test]
    fn min_is_ascending() {
        let mut model = Model::new();
        let a = model.new_variable_with_domain(Domain::from_values(5, [4, 1, 3]), None);
        let state = model.root_state();
        assert_eq!(Min.order_values(&model, &state, a), vec![1, 3, 4]);
    }

    #[test]
    fn random_is_deterministic_given_a_seed() {
        let mut model = Model::new();
        let a = model.new_variable(10, None);
        let state = model.root_state();
        let h = Random::new(42);
        let first = h.order_values(&model, &state, a);
        let second = h.order_values(&model, &state, a);
        assert_eq!(first, second);
    }

    #[test]
    fn obj_improving_sorts_by_distance_once_target_set() {
        let mut model = Model::new();
        let a = model.new_variable(10, None);
        let state = model.root_state();
        let h = ObjImproving::new();
        h.set_target(5);
        let ordered = h.order_values(&model, &state, a);
        assert_eq!(ordered[0], 5);
    }
}
