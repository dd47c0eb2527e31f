//! The contract through which an external subsystem -- e.g. a relational or
//! miniKanren-style evaluator -- associates its own variables with variables
//! of this solver's [`Model`], without the solver ever calling back into it.
//!
//! A [`VariableRegistry`] is a one-way, read-only lookup from the
//! collaborator's point of view: it registers a mapping once, then reads
//! domains and singleton bindings out of a solved [`State`]. The solver never
//! invokes anything on the collaborator's side.

use std::collections::HashMap;
use std::hash::Hash;

use crate::solver::domain::{Domain, Value};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

/// Maps a collaborator's own variable identifiers (`K`) onto this solver's
/// [`VariableId`]s.
///
/// `K` is left generic because the registry has no opinion on how the
/// collaborator names its variables -- a relational evaluator might use
/// interned symbols, a fact-store row id, or anything else hashable.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry<K: Eq + Hash + Clone> {
    forward: HashMap<K, VariableId>,
    backward: HashMap<VariableId, K>,
}

impl<K: Eq + Hash + Clone> VariableRegistry<K> {
    pub fn new() -> Self {
        VariableRegistry { forward: HashMap::new(), backward: HashMap::new() }
    }

    /// Registers `relational_var <-> fd_var`. Overwrites any prior mapping
    /// for either side.
    pub fn register(&mut self, relational_var: K, fd_var: VariableId) {
        if let Some(old_fd_var) = self.forward.insert(relational_var.clone(), fd_var) {
            self.backward.remove(&old_fd_var);
        }
        self.backward.insert(fd_var, relational_var);
    }

    /// The FD variable registered against `relational_var`, if any.
    pub fn fd_var(&self, relational_var: &K) -> Option<VariableId> {
        self.forward.get(relational_var).copied()
    }

    /// The collaborator's variable registered against `fd_var`, if any.
    pub fn relational_var(&self, fd_var: VariableId) -> Option<&K> {
        self.backward.get(&fd_var)
    }

    /// Reads the current domain of `relational_var`'s FD counterpart out of
    /// `state`. Returns `None` if `relational_var` was never registered.
    pub fn get_domain(&self, relational_var: &K, state: &State) -> Option<Domain> {
        let fd_var = self.fd_var(relational_var)?;
        Some(state.get_domain(fd_var))
    }

    /// Reads `relational_var`'s binding out of `state` if its FD counterpart
    /// is currently a singleton, for transferring into the collaborator's own
    /// term environment.
    pub fn singleton_binding(&self, relational_var: &K, state: &State) -> Option<Value> {
        self.get_domain(relational_var, state)?.singleton_value()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
