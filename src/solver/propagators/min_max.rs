//! `result = min(vars)` and `result = max(vars)`.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const MIN_NAME: &str = "min_of_array";
const MAX_NAME: &str = "max_of_array";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Min,
    Max,
}

#[derive(Debug, Clone)]
pub struct MinMaxOfArray {
    vars: Vec<VariableId>,
    result: VariableId,
    all_vars: Vec<VariableId>,
    kind: Kind,
}

impl MinMaxOfArray {
    fn build(model: &Model, name: &'static str, vars: Vec<VariableId>, result: VariableId, kind: Kind) -> Result<Self, ValidationError> {
        model.check_nonempty(name, &vars)?;
        for &v in &vars {
            model.check_known(name, v)?;
        }
        model.check_known(name, result)?;
        let mut all_vars = vars.clone();
        all_vars.push(result);
        Ok(MinMaxOfArray { vars, result, all_vars, kind })
    }

    pub fn min(model: &Model, vars: Vec<VariableId>, result: VariableId) -> Result<Self, ValidationError> {
        Self::build(model, MIN_NAME, vars, result, Kind::Min)
    }

    pub fn max(model: &Model, vars: Vec<VariableId>, result: VariableId) -> Result<Self, ValidationError> {
        Self::build(model, MAX_NAME, vars, result, Kind::Max)
    }
}

impl Propagator for MinMaxOfArray {
    fn variables(&self) -> &[VariableId] {
        &self.all_vars
    }

    fn tag(&self) -> &'static str {
        match self.kind {
            Kind::Min => MIN_NAME,
            Kind::Max => MAX_NAME,
        }
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let domains: Vec<Domain> = self.vars.iter().map(|&v| state.get_domain(v)).collect();
        let result_domain = state.get_domain(self.result);
        let max_value = result_domain.max_value();

        // For Min: result in [min(mins), min(maxes)]. For Max: result in [max(mins), max(maxes)].
        let mins: Vec<u32> = domains.iter().filter_map(Domain::min).collect();
        let maxes: Vec<u32> = domains.iter().filter_map(Domain::max).collect();
        if mins.len() != domains.len() || maxes.len() != domains.len() {
            return Ok(PropagationResult::NoChange);
        }

        let (r_lo, r_hi) = match self.kind {
            Kind::Min => (mins.iter().copied().min().unwrap(), maxes.iter().copied().min().unwrap()),
            Kind::Max => (mins.iter().copied().max().unwrap(), maxes.iter().copied().max().unwrap()),
        };

        let mut updates = vec![(self.result, result_domain.intersect(&Domain::range(max_value, r_lo, r_hi)))];

        let result_domain = state.get_domain(self.result);
        if let (Some(r_min), Some(r_max)) = (result_domain.min(), result_domain.max()) {
            for (&v, d) in self.vars.iter().zip(domains.iter()) {
                let narrowed = match self.kind {
                    // Every member is >= min(result), since the array minimum can't exceed any member.
                    Kind::Min => d.intersect(&Domain::range(d.max_value(), r_min, d.max_value())),
                    Kind::Max => d.intersect(&Domain::range(d.max_value(), 1, r_max)),
                };
                updates.push((v, narrowed));
            }
        }

        apply_updates(state, updates)
    }
}

impl Model {
    pub fn post_min_of_array(&mut self, vars: Vec<VariableId>, result: VariableId) -> Result<(), ValidationError> {
        let p = MinMaxOfArray::min(self, vars, result)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }

    pub fn post_max_of_array(&mut self, vars: Vec<VariableId>, result: VariableId) -> Result<(), ValidationError> {
        let p = MinMaxOfArray::max(self, vars, result)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}
