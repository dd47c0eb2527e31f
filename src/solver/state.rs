//! The persistent, copy-on-write mapping from variable to current domain.

use std::sync::Arc;

use im::HashMap as ImHashMap;

use crate::error::PropagationFailure;
use crate::solver::domain::Domain;
use crate::solver::variable::VariableId;

/// An opaque, persistent snapshot of every variable's current domain.
///
/// Cloning a `State` is O(1): the initial domains are shared via an `Arc` and
/// the overrides are stored in an [`im::HashMap`], which shares structure
/// between versions. `set_domain` never mutates a `State` that another
/// branch of the search tree still holds a reference to.
///
/// A freshly-constructed `State` (see [`crate::solver::model::Model::root_state`])
/// has no overrides: every variable reports its initial domain, which is
/// exactly the "base state" referred to in the domain model.
#[derive(Clone, Debug)]
pub struct State {
    initial_domains: Arc<[Domain]>,
    overrides: ImHashMap<VariableId, Domain>,
}

impl State {
    pub(crate) fn new_root(initial_domains: Arc<[Domain]>) -> Self {
        State {
            initial_domains,
            overrides: ImHashMap::new(),
        }
    }

    /// Returns the current domain for `var_id`, falling back to the
    /// variable's initial domain when no pruning has touched it yet.
    pub fn get_domain(&self, var_id: VariableId) -> Domain {
        self.overrides
            .get(&var_id)
            .cloned()
            .unwrap_or_else(|| self.initial_domains[var_id as usize].clone())
    }

    /// Produces a new state with `var_id`'s domain narrowed to `new_domain`.
    ///
    /// Returns `(self.clone(), false)` when `new_domain` is set-equal to the
    /// current domain, per the "no spurious fork" contract. Returns
    /// `Err(PropagationFailure)` instead of ever installing an empty domain.
    pub fn set_domain(
        &self,
        var_id: VariableId,
        new_domain: Domain,
    ) -> Result<(State, bool), PropagationFailure> {
        if new_domain.is_empty() {
            return Err(PropagationFailure {
                variable_id: var_id,
                reason: "pruning removed every remaining value".to_string(),
            });
        }

        let current = self.get_domain(var_id);
        if current.equal(&new_domain) {
            return Ok((self.clone(), false));
        }

        let overrides = self.overrides.update(var_id, new_domain);
        Ok((
            State {
                initial_domains: Arc::clone(&self.initial_domains),
                overrides,
            },
            true,
        ))
    }

    /// Number of variables known to this state's universe.
    pub fn variable_count(&self) -> usize {
        self.initial_domains.len()
    }

    /// `true` when every variable's current domain is a singleton.
    pub fn is_complete(&self) -> bool {
        (0..self.variable_count() as VariableId).all(|v| self.get_domain(v).is_singleton())
    }
}
