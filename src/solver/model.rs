//! The model: an ordered collection of variables and propagators, and the
//! single place model-build-time validation happens.

use std::sync::Arc;

use crate::error::{Result, ValidationError};
use crate::solver::domain::{Domain, Value};
use crate::solver::propagation::Propagator;
use crate::solver::state::State;
use crate::solver::variable::{Variable, VariableId};

/// A constraint satisfaction problem: a fixed set of [`Variable`]s together
/// with the [`Propagator`]s posted against them.
///
/// A `Model` is built up incrementally (`new_variable`, then `post_*`) and is
/// immutable once handed to [`crate::solver::search`]: posting a propagator
/// never reaches back into an in-progress search.
pub struct Model {
    variables: Vec<Variable>,
    propagators: Vec<Box<dyn Propagator>>,
}

impl Model {
    pub fn new() -> Self {
        Model {
            variables: Vec::new(),
            propagators: Vec::new(),
        }
    }

    /// Declares a new variable with domain `{1, ..., max_value}`.
    pub fn new_variable(&mut self, max_value: Value, name: impl Into<Option<String>>) -> VariableId {
        self.new_variable_with_domain(Domain::full(max_value), name)
    }

    /// Declares a new variable with an explicit initial domain.
    pub fn new_variable_with_domain(
        &mut self,
        initial_domain: Domain,
        name: impl Into<Option<String>>,
    ) -> VariableId {
        let id = self.variables.len() as VariableId;
        self.variables.push(Variable::new(id, name.into(), initial_domain));
        id
    }

    /// Declares a boolean variable, encoded as an FD variable over `{1, 2}`
    /// (`1` = false, `2` = true), per the solver's boolean encoding.
    pub fn new_bool_variable(&mut self, name: impl Into<Option<String>>) -> VariableId {
        self.new_variable_with_domain(Domain::from_values(2, [1, 2]), name)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn propagators(&self) -> &[Box<dyn Propagator>] {
        &self.propagators
    }

    pub fn variable(&self, var_id: VariableId) -> &Variable {
        &self.variables[var_id as usize]
    }

    pub(crate) fn check_known(&self, constraint: &'static str, var_id: VariableId) -> Result<(), ValidationError> {
        if (var_id as usize) < self.variables.len() {
            Ok(())
        } else {
            Err(ValidationError::UnknownVariable { constraint, variable_id: var_id })
        }
    }

    pub(crate) fn check_nonempty(
        &self,
        constraint: &'static str,
        vars: &[VariableId],
    ) -> Result<(), ValidationError> {
        if vars.is_empty() {
            Err(ValidationError::EmptyVariableList { constraint })
        } else {
            Ok(())
        }
    }

    /// Posts an already-constructed propagator, after it has validated
    /// itself. This is the single path every `post_*` helper in
    /// [`crate::solver::propagators`] funnels through.
    pub(crate) fn add_propagator(&mut self, propagator: Box<dyn Propagator>) {
        self.propagators.push(propagator);
    }

    /// Builds the root [`State`]: every variable at its initial domain, no
    /// pruning applied yet.
    pub fn root_state(&self) -> State {
        let domains: Arc<[Domain]> = self
            .variables
            .iter()
            .map(|v| v.initial_domain().clone())
            .collect();
        State::new_root(domains)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("variables", &self.variables.len())
            .field("propagators", &self.propagators.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_variable_gets_sequential_ids() {
        let mut m = Model::new();
        let a = m.new_variable(5, Some("a".to_string()));
        let b = m.new_variable(5, None);
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(m.variables().len(), 2);
    }

    #[test]
    fn root_state_reflects_initial_domains() {
        let mut m = Model::new();
        let a = m.new_variable(3, None);
        let state = m.root_state();
        assert_eq!(state.get_domain(a).count(), 3);
    }

    #[test]
    fn bool_variable_is_encoded_over_one_two() {
        let mut m = Model::new();
        let b = m.new_bool_variable(None);
        let d = m.root_state().get_domain(b);
        assert_eq!(d.values(), vec![1, 2]);
    }
}
