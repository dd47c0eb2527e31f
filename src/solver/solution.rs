//! Solutions: a concrete `var_id -> value` assignment extracted from a complete [`State`].

use std::collections::HashMap;

use crate::solver::domain::Value;
use crate::solver::model::Model;
use crate::solver::state::State;
use crate::solver::variable::VariableId;

/// A concrete assignment of a value to every variable of a [`Model`].
///
/// Produced by [`crate::solver::search`] when it reaches a [`State`] in which
/// every variable's domain is a singleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    values: HashMap<VariableId, Value>,
}

impl Solution {
    /// Extracts a solution from `state`. Returns `None` if any variable of
    /// `model` does not have a singleton domain in `state`.
    pub fn extract(model: &Model, state: &State) -> Option<Solution> {
        let mut values = HashMap::with_capacity(model.variables().len());
        for variable in model.variables() {
            let value = state.get_domain(variable.id()).singleton_value()?;
            values.insert(variable.id(), value);
        }
        Some(Solution { values })
    }

    /// The value assigned to `var_id`. Panics if `var_id` is not part of this solution.
    pub fn value_of(&self, var_id: VariableId) -> Value {
        self.values[&var_id]
    }

    pub fn get(&self, var_id: VariableId) -> Option<Value> {
        self.values.get(&var_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableId, Value)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }
}
