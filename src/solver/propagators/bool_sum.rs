//! `count(bools == true) = target`, where booleans use the `{1,2}` encoding.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "bool_sum";
const TRUE: u32 = 2;

/// Enforces that the number of `bools` holding `true` (value `2`) equals
/// `target`'s value minus one, matching the solver's `count+1` encoding
/// convention so a zero-count solution can still be represented over the
/// 1-indexed universe.
#[derive(Debug, Clone)]
pub struct BoolSum {
    bools: Vec<VariableId>,
    target: VariableId,
}

impl BoolSum {
    pub fn new(model: &Model, bools: Vec<VariableId>, target: VariableId) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &bools)?;
        for &v in &bools {
            model.check_known(NAME, v)?;
        }
        model.check_known(NAME, target)?;
        Ok(BoolSum { bools, target })
    }
}

impl Propagator for BoolSum {
    fn variables(&self) -> &[VariableId] {
        &self.bools
    }

    fn tag(&self) -> &'static str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let mut known_true = 0u32;
        let mut known_false = 0u32;
        let mut undecided = Vec::new();
        for &b in &self.bools {
            let d = state.get_domain(b);
            match d.singleton_value() {
                Some(TRUE) => known_true += 1,
                Some(_) => known_false += 1,
                None => undecided.push(b),
            }
        }

        let target_domain = state.get_domain(self.target);
        let max_value = target_domain.max_value();
        let lo = known_true + 1;
        let hi = known_true + undecided.len() as u32 + 1;
        let mut updates = vec![(self.target, target_domain.intersect(&Domain::range(max_value, lo, hi)))];

        if let (Some(t_min), Some(t_max)) = (state.get_domain(self.target).min(), state.get_domain(self.target).max())
        {
            let min_true_needed = t_min.saturating_sub(1);
            let max_true_allowed = t_max.saturating_sub(1);
            // Every undecided bool must be true if we've already hit the
            // ceiling of false-assignments, and vice versa.
            if known_true == max_true_allowed {
                for &b in &undecided {
                    updates.push((b, state.get_domain(b).remove_value(TRUE)));
                }
            } else if known_true + undecided.len() as u32 == min_true_needed {
                for &b in &undecided {
                    updates.push((b, Domain::from_values(2, [TRUE])));
                }
            }
        }
        let _ = known_false;

        apply_updates(state, updates)
    }
}

impl Model {
    pub fn post_bool_sum(&mut self, bools: Vec<VariableId>, target: VariableId) -> Result<(), ValidationError> {
        let p = BoolSum::new(self, bools, target)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}
