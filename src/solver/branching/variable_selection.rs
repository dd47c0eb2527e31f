//! Strategies for choosing which unassigned variable to branch on next.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::solver::model::Model;
use crate::solver::state::State;
use crate::solver::variable::VariableId;

/// The product of every variable's current domain size in `state`: a coarse
/// measure of how much search space remains. Used to derive the before/after
/// reduction ratio that [`Impact::record`] accumulates.
pub fn domain_size_product(model: &Model, state: &State) -> f64 {
    (0..model.variables().len() as VariableId).map(|v| state.get_domain(v).count() as f64).product()
}

/// Chooses the next variable to branch on.
///
/// Implementors only ever need to consider variables whose current domain
/// (in `state`) is not already a singleton.
pub trait VariableSelectionHeuristic: std::fmt::Debug {
    fn select_variable(&self, model: &Model, state: &State) -> Option<VariableId>;

    /// Notifies the heuristic that `var_id` was just branched on: `before`
    /// and `after` are [`domain_size_product`] immediately before the guess
    /// and immediately after propagating it to a fixed point. Most
    /// heuristics ignore it; [`Impact`] uses it to accumulate per-variable
    /// impact scores.
    fn on_assignment(&self, _var_id: VariableId, _before: f64, _after: f64) {}
}

fn unassigned(model: &Model, state: &State) -> impl Iterator<Item = VariableId> + '_ {
    (0..model.variables().len() as VariableId).filter(move |&v| !state.get_domain(v).is_singleton())
}

/// Domain/degree: picks the variable with the smallest current domain,
/// breaking ties in favour of the variable referenced by the most
/// propagators (its dynamic degree), and finally by the lower
/// [`VariableId`] for determinism.
#[derive(Debug, Default)]
pub struct DomDeg;

impl DomDeg {
    fn degree(model: &Model, var_id: VariableId) -> usize {
        model.propagators().iter().filter(|p| p.variables().contains(&var_id)).count()
    }
}

impl VariableSelectionHeuristic for DomDeg {
    fn select_variable(&self, model: &Model, state: &State) -> Option<VariableId> {
        unassigned(model, state)
            .min_by(|&a, &b| {
                let size_a = state.get_domain(a).count();
                let size_b = state.get_domain(b).count();
                size_a
                    .cmp(&size_b)
                    .then_with(|| Self::degree(model, b).cmp(&Self::degree(model, a)))
                    .then(a.cmp(&b))
            })
    }
}

/// Impact-based selection: favours the variable whose past assignments have,
/// on average, pruned the most of the rest of the search space. `impacts`
/// accumulates `(variable -> average domain-size reduction ratio)` as search
/// proceeds; an variable never yet branched on is treated as maximally
/// impactful so it gets tried at least once.
#[derive(Debug, Default)]
pub struct Impact {
    impacts: RefCell<HashMap<VariableId, f64>>,
}

impl Impact {
    pub fn new() -> Self {
        Impact { impacts: RefCell::new(HashMap::new()) }
    }

    /// Records an observed impact: `before`/`after` are the product of every
    /// variable's domain size before and after propagating an assignment to
    /// `var_id`.
    pub fn record(&self, var_id: VariableId, before: f64, after: f64) {
        let reduction = if before > 0.0 { 1.0 - after / before } else { 0.0 };
        let mut impacts = self.impacts.borrow_mut();
        let entry = impacts.entry(var_id).or_insert(0.0);
        *entry = (*entry + reduction) / 2.0;
    }

    /// The running average impact recorded for `var_id`, if it has been
    /// branched on at least once.
    pub fn impact_of(&self, var_id: VariableId) -> Option<f64> {
        self.impacts.borrow().get(&var_id).copied()
    }
}

impl VariableSelectionHeuristic for Impact {
    fn select_variable(&self, model: &Model, state: &State) -> Option<VariableId> {
        let impacts = self.impacts.borrow();
        unassigned(model, state).max_by(|&a, &b| {
            let ia = impacts.get(&a).copied().unwrap_or(1.0);
            let ib = impacts.get(&b).copied().unwrap_or(1.0);
            ia.partial_cmp(&ib).unwrap().then(b.cmp(&a))
        })
    }

    fn on_assignment(&self, var_id: VariableId, before: f64, after: f64) {
        self.record(var_id, before, after);
    }
}
