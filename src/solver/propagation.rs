//! The propagator contract and the fixed-point engine that drives a set of
//! propagators to quiescence.

use std::fmt;

use tracing::debug;

use crate::error::{PropagationFailure, Result};
use crate::solver::model::Model;
use crate::solver::state::State;
use crate::solver::variable::VariableId;
use crate::solver::work_list::{PropagatorId, WorkList};

/// Relative scheduling priority. Lower-cost propagators (bounds-only checks)
/// should run ahead of expensive ones (all-different, table), mirroring the
/// way the queue favours cheap work first at a fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// The outcome of running a single propagator once against a [`State`].
pub enum PropagationResult {
    /// The propagator found nothing to prune; `state` is returned unchanged.
    NoChange,
    /// The propagator narrowed one or more domains, producing a new state and
    /// the set of variables whose domain actually changed.
    Pruned { state: State, changed: Vec<VariableId> },
}

/// A global or arithmetic constraint, expressed as a pruning rule.
///
/// A propagator never mutates in place: [`Propagator::propagate`] takes the
/// current [`State`] by reference and returns a [`PropagationResult`]
/// describing what, if anything, changed. Implementors should only look at
/// the domains of the variables named by [`Propagator::variables`].
pub trait Propagator: fmt::Debug + Send + Sync {
    /// The variables this propagator reads and may prune. The fixed-point
    /// engine uses this to know which propagators to wake when a variable's
    /// domain changes.
    fn variables(&self) -> &[VariableId];

    /// A short, human-meaningful tag identifying the propagator's kind, used
    /// in diagnostics and statistics (e.g. `"all_different"`, `"linear_sum"`).
    fn tag(&self) -> &'static str;

    /// Scheduling priority within the work list.
    fn priority(&self) -> Priority {
        Priority::Medium
    }

    /// Runs the propagator once against `state`, returning any pruning it can
    /// derive. Returns `Err` when propagation proves the branch infeasible.
    fn propagate(&self, model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure>;
}

/// Applies a batch of `(variable, new_domain)` prunings to `state` in one
/// shot and packages the result as a [`PropagationResult`]. A propagator
/// implementation typically computes its prunings against an immutable
/// snapshot of `state` and then calls this once at the end.
pub fn apply_updates(
    state: &State,
    updates: impl IntoIterator<Item = (VariableId, crate::solver::domain::Domain)>,
) -> Result<PropagationResult, PropagationFailure> {
    let mut current = state.clone();
    let mut changed = Vec::new();
    for (var_id, new_domain) in updates {
        let (next, did_change) = current.set_domain(var_id, new_domain)?;
        current = next;
        if did_change {
            changed.push(var_id);
        }
    }
    if changed.is_empty() {
        Ok(PropagationResult::NoChange)
    } else {
        Ok(PropagationResult::Pruned { state: current, changed })
    }
}

/// Drives every propagator of `model` to a fixed point starting from `state`:
/// repeatedly invokes propagators whose watched variables changed until none
/// has anything left to prune, or one of them proves infeasibility.
///
/// Propagators are scheduled via a priority work list seeded with every
/// propagator, deduplicated so a propagator is never queued twice
/// concurrently. Re-firing on a variable's own change is idempotent by
/// contract (see the domain-containment invariant), so visiting a quiescent
/// propagator again is always safe, just wasted work.
pub fn run_to_fixed_point(model: &Model, initial: State) -> Result<State, PropagationFailure> {
    let mut state = initial;
    let mut work_list = WorkList::new();
    for id in 0..model.propagators().len() {
        work_list.push_back(model.propagators()[id].priority(), id as PropagatorId);
    }

    while let Some(id) = work_list.pop_front() {
        let propagator = &model.propagators()[id as usize];
        match propagator.propagate(model, &state)? {
            PropagationResult::NoChange => {}
            PropagationResult::Pruned { state: next, changed } => {
                state = next;
                for (other_id, other) in model.propagators().iter().enumerate() {
                    if other_id == id as usize {
                        continue;
                    }
                    if other.variables().iter().any(|v| changed.contains(v)) {
                        work_list.push_back(other.priority(), other_id as PropagatorId);
                    }
                }
                // A propagator that pruned something may still have more to
                // give against its own new state (e.g. bounds propagators
                // converging digit by digit), so requeue it too.
                work_list.push_back(propagator.priority(), id);
            }
        }
    }

    debug!(propagators = model.propagators().len(), "fixed point reached");
    Ok(state)
}
