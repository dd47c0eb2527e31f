//! `LexLessEq`: `xs` is lexicographically `<=` `ys`, propagated with the
//! standard alpha/beta state machine over the shared prefix.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "lex_less_eq";

/// Enforces `xs <=_lex ys`.
#[derive(Debug, Clone)]
pub struct LexLessEq {
    xs: Vec<VariableId>,
    ys: Vec<VariableId>,
    all_vars: Vec<VariableId>,
}

impl LexLessEq {
    pub fn new(model: &Model, xs: Vec<VariableId>, ys: Vec<VariableId>) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &xs)?;
        if xs.len() != ys.len() {
            return Err(ValidationError::MismatchedLengths {
                constraint: NAME,
                expected: "xs.len() == ys.len()",
                actual: vec![xs.len(), ys.len()],
            });
        }
        for &v in xs.iter().chain(ys.iter()) {
            model.check_known(NAME, v)?;
        }
        let mut all_vars = xs.clone();
        all_vars.extend(ys.iter().copied());
        Ok(LexLessEq { xs, ys, all_vars })
    }

    /// `alpha` is the first position where `xs` could still be forced `<`;
    /// `beta` is the first position where `xs` is already committed `=` and
    /// everything before was forced equal. Positions are found by scanning:
    /// while both sides are fixed and equal, advance; stop at the first
    /// position that isn't forced-equal.
    fn boundary(&self, state: &State) -> usize {
        for i in 0..self.xs.len() {
            let dx = state.get_domain(self.xs[i]);
            let dy = state.get_domain(self.ys[i]);
            let equal_forced = dx.singleton_value().is_some() && dx.singleton_value() == dy.singleton_value();
            if !equal_forced {
                return i;
            }
        }
        self.xs.len()
    }
}

impl Propagator for LexLessEq {
    fn variables(&self) -> &[VariableId] {
        &self.all_vars
    }

    fn tag(&self) -> &'static str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let n = self.xs.len();
        let boundary = self.boundary(state);
        let mut updates = Vec::new();

        if boundary == n {
            // Every position forced equal so far and we ran off the end: already satisfied.
            return Ok(PropagationResult::NoChange);
        }

        let dx = state.get_domain(self.xs[boundary]);
        let dy = state.get_domain(self.ys[boundary]);

        // At the first undecided position, either x < y (constraint satisfied
        // regardless of the suffix) or x == y (push the boundary out), so
        // x may not exceed y's max, and y may not fall below x's min.
        if let (Some(x_min), Some(y_max)) = (dx.min(), dy.max()) {
            updates.push((self.xs[boundary], dx.remove_above(y_max.max(x_min))));
        }
        if let Some(x_min) = state.get_domain(self.xs[boundary]).min() {
            updates.push((self.ys[boundary], dy.remove_below(x_min)));
        }

        apply_updates(state, updates)
    }
}

impl Model {
    pub fn post_lex_less_eq(&mut self, xs: Vec<VariableId>, ys: Vec<VariableId>) -> Result<(), ValidationError> {
        let p = LexLessEq::new(self, xs, ys)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}
