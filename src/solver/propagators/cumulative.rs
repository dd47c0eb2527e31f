//! `Cumulative`: a set of tasks with fixed durations and resource demands
//! never asks for more than `capacity` of a shared resource at any instant.
//! `NoOverlap` is the unary special case (`capacity = 1`, `demand = 1`).
//!
//! Propagation uses time-table reasoning: for every instant, the mandatory
//! parts of tasks that must be running then are summed, and any task whose
//! mandatory-part-free placement would overflow the remaining capacity has
//! that placement excluded.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const CUMULATIVE_NAME: &str = "cumulative";
const NO_OVERLAP_NAME: &str = "no_overlap";

#[derive(Debug, Clone)]
struct Task {
    start: VariableId,
    duration: u32,
    demand: u32,
}

#[derive(Debug, Clone)]
pub struct Cumulative {
    tasks: Vec<Task>,
    capacity: u32,
}

impl Cumulative {
    pub fn new(
        model: &Model,
        starts: Vec<VariableId>,
        durations: Vec<u32>,
        demands: Vec<u32>,
        capacity: u32,
    ) -> Result<Self, ValidationError> {
        model.check_nonempty(CUMULATIVE_NAME, &starts)?;
        if starts.len() != durations.len() || starts.len() != demands.len() {
            return Err(ValidationError::MismatchedLengths {
                constraint: CUMULATIVE_NAME,
                expected: "starts.len() == durations.len() == demands.len()",
                actual: vec![starts.len(), durations.len(), demands.len()],
            });
        }
        for &s in &starts {
            model.check_known(CUMULATIVE_NAME, s)?;
        }
        let tasks = starts
            .into_iter()
            .zip(durations)
            .zip(demands)
            .map(|((start, duration), demand)| Task { start, duration, demand })
            .collect();
        Ok(Cumulative { tasks, capacity })
    }

    /// `NoOverlap` is `Cumulative` with unit demand and unit capacity.
    pub fn no_overlap(model: &Model, starts: Vec<VariableId>, durations: Vec<u32>) -> Result<Self, ValidationError> {
        model.check_nonempty(NO_OVERLAP_NAME, &starts)?;
        let demands = vec![1; starts.len()];
        Self::new(model, starts, durations, demands, 1)
    }

    fn mandatory_part(&self, task: &Task, state: &State) -> Option<(u32, u32)> {
        let d = state.get_domain(task.start);
        let (min, max) = (d.min()?, d.max()?);
        if task.duration == 0 || max >= min + task.duration {
            None
        } else {
            Some((max, min + task.duration))
        }
    }

    fn usage_at(&self, time: u32, state: &State, skip: usize) -> u32 {
        self.tasks
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != skip)
            .filter_map(|(_, t)| self.mandatory_part(t, state).map(|(lo, hi)| (t, lo, hi)))
            .filter(|&(_, lo, hi)| time >= lo && time < hi)
            .map(|(t, _, _)| t.demand)
            .sum()
    }
}

impl Cumulative {
    fn tag_name(&self) -> &'static str {
        if self.tasks.iter().all(|t| t.demand == 1) && self.capacity == 1 {
            NO_OVERLAP_NAME
        } else {
            CUMULATIVE_NAME
        }
    }

    fn variables_vec(&self) -> Vec<VariableId> {
        self.tasks.iter().map(|t| t.start).collect()
    }

    fn propagate_impl(&self, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let mut updates = Vec::new();
        for (i, task) in self.tasks.iter().enumerate() {
            let d = state.get_domain(task.start);
            if task.duration == 0 {
                continue;
            }
            let max_value = d.max_value();
            let surviving: Vec<u32> = d
                .values()
                .into_iter()
                .filter(|&candidate_start| {
                    (candidate_start..candidate_start + task.duration)
                        .all(|t| self.usage_at(t, state, i) + task.demand <= self.capacity)
                })
                .collect();
            updates.push((task.start, Domain::from_values(max_value, surviving)));
        }
        apply_updates(state, updates)
    }
}

/// Wraps [`Cumulative`] to give [`Propagator::variables`] a stable slice to
/// borrow, since the trait method can't allocate.
#[derive(Debug, Clone)]
pub struct CumulativeHandle {
    inner: Cumulative,
    vars: Vec<VariableId>,
}

impl CumulativeHandle {
    fn wrap(inner: Cumulative) -> Self {
        let vars = inner.variables_vec();
        CumulativeHandle { inner, vars }
    }
}

impl Propagator for CumulativeHandle {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn tag(&self) -> &'static str {
        self.inner.tag_name()
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        self.inner.propagate_impl(state)
    }
}

impl Model {
    pub fn post_cumulative(
        &mut self,
        starts: Vec<VariableId>,
        durations: Vec<u32>,
        demands: Vec<u32>,
        capacity: u32,
    ) -> Result<(), ValidationError> {
        let p = Cumulative::new(self, starts, durations, demands, capacity)?;
        self.add_propagator(Box::new(CumulativeHandle::wrap(p)));
        Ok(())
    }

    pub fn post_no_overlap(&mut self, starts: Vec<VariableId>, durations: Vec<u32>) -> Result<(), ValidationError> {
        let p = Cumulative::no_overlap(self, starts, durations)?;
        self.add_propagator(Box::new(CumulativeHandle::wrap(p)));
        Ok(())
    }
}
