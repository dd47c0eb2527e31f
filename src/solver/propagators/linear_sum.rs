//! `Σ coeffs[i] * terms[i] = target`, propagated by bound consistency.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "linear_sum";

/// Enforces `Σ coeffs[i] * terms[i] == target`.
///
/// Bound-consistent only: each term's domain is narrowed to the interval
/// implied by the other terms' current bounds, not to every individual hole.
#[derive(Debug, Clone)]
pub struct LinearSum {
    terms: Vec<VariableId>,
    coeffs: Vec<i64>,
    target: VariableId,
    all_vars: Vec<VariableId>,
}

impl LinearSum {
    pub fn new(
        model: &Model,
        terms: Vec<VariableId>,
        coeffs: Vec<i64>,
        target: VariableId,
    ) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &terms)?;
        if terms.len() != coeffs.len() {
            return Err(ValidationError::MismatchedLengths {
                constraint: NAME,
                expected: "terms.len() == coeffs.len()",
                actual: vec![terms.len(), coeffs.len()],
            });
        }
        for &v in terms.iter().chain(std::iter::once(&target)) {
            model.check_known(NAME, v)?;
        }
        let mut all_vars = terms.clone();
        all_vars.push(target);
        Ok(LinearSum { terms, coeffs, target, all_vars })
    }

    fn term_bounds(&self, state: &State, skip: Option<usize>) -> Option<(i64, i64)> {
        let mut lo = 0i64;
        let mut hi = 0i64;
        for (idx, (&var, &c)) in self.terms.iter().zip(self.coeffs.iter()).enumerate() {
            if Some(idx) == skip {
                continue;
            }
            let d = state.get_domain(var);
            let (min, max) = (d.min()? as i64, d.max()? as i64);
            let (term_lo, term_hi) = if c >= 0 { (c * min, c * max) } else { (c * max, c * min) };
            lo += term_lo;
            hi += term_hi;
        }
        Some((lo, hi))
    }
}

impl Propagator for LinearSum {
    fn variables(&self) -> &[VariableId] {
        &self.all_vars
    }

    fn tag(&self) -> &'static str {
        NAME
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let mut updates = Vec::new();

        // Narrow the target from the terms' combined bounds.
        if let Some((lo, hi)) = self.term_bounds(state, None) {
            let target_domain = state.get_domain(self.target);
            let max_value = target_domain.max_value();
            let narrowed = target_domain.intersect(&Domain::range(
                max_value,
                lo.max(1) as u32,
                hi.min(max_value as i64).max(0) as u32,
            ));
            updates.push((self.target, narrowed));
        }

        // Narrow each term from the target's bounds minus the other terms'.
        let target_domain = state.get_domain(self.target);
        if let (Some(t_min), Some(t_max)) = (target_domain.min(), target_domain.max()) {
            for (idx, (&var, &c)) in self.terms.iter().zip(self.coeffs.iter()).enumerate() {
                if c == 0 {
                    continue;
                }
                let Some((others_lo, others_hi)) = self.term_bounds(state, Some(idx)) else { continue };
                // c * term + [others_lo, others_hi] must intersect [t_min, t_max].
                let lo_req = t_min as i64 - others_hi;
                let hi_req = t_max as i64 - others_lo;
                let d = state.get_domain(var);
                let max_value = d.max_value();
                let (term_lo, term_hi) = if c > 0 {
                    (
                        ceil_div(lo_req, c).max(1),
                        floor_div(hi_req, c).min(max_value as i64),
                    )
                } else {
                    (
                        ceil_div(hi_req, c).max(1),
                        floor_div(lo_req, c).min(max_value as i64),
                    )
                };
                let narrowed = if term_lo > term_hi {
                    Domain::empty(max_value)
                } else {
                    d.intersect(&Domain::range(max_value, term_lo.max(0) as u32, term_hi.max(0) as u32))
                };
                updates.push((var, narrowed));
            }
        }

        apply_updates(state, updates)
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let d = a / b;
    if (a % b != 0) && ((a < 0) != (b < 0)) { d - 1 } else { d }
}

fn ceil_div(a: i64, b: i64) -> i64 {
    -floor_div(-a, b)
}

impl Model {
    /// Posts `Σ coeffs[i] * terms[i] == target`.
    pub fn post_linear_sum(
        &mut self,
        terms: Vec<VariableId>,
        coeffs: Vec<i64>,
        target: VariableId,
    ) -> Result<(), ValidationError> {
        let p = LinearSum::new(self, terms, coeffs, target)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}
