//! `Diffn`: a set of fixed-size axis-aligned rectangles placed by `(x, y)`
//! variables must not overlap. Each pair is pruned via the four-way
//! disjunction "left of / right of / above / below", excluding a
//! rectangle's candidate position only when every disjunct is impossible.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "diffn";

#[derive(Debug, Clone)]
struct Rect {
    x: VariableId,
    y: VariableId,
    w: u32,
    h: u32,
}

#[derive(Debug, Clone)]
pub struct Diffn {
    rects: Vec<Rect>,
}

impl Diffn {
    pub fn new(
        model: &Model,
        xs: Vec<VariableId>,
        ys: Vec<VariableId>,
        widths: Vec<u32>,
        heights: Vec<u32>,
    ) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &xs)?;
        if xs.len() != ys.len() || xs.len() != widths.len() || xs.len() != heights.len() {
            return Err(ValidationError::MismatchedLengths {
                constraint: NAME,
                expected: "xs.len() == ys.len() == widths.len() == heights.len()",
                actual: vec![xs.len(), ys.len(), widths.len(), heights.len()],
            });
        }
        for &v in xs.iter().chain(ys.iter()) {
            model.check_known(NAME, v)?;
        }
        let rects = xs
            .into_iter()
            .zip(ys)
            .zip(widths)
            .zip(heights)
            .map(|(((x, y), w), h)| Rect { x, y, w, h })
            .collect();
        Ok(Diffn { rects })
    }

    fn variables_vec(&self) -> Vec<VariableId> {
        self.rects.iter().flat_map(|r| [r.x, r.y]).collect()
    }

    /// Can rectangle `a`, placed at `(ax, ay)`, avoid overlapping rectangle
    /// `b` for at least one value remaining in `b`'s domains?
    fn can_avoid(&self, ax: u32, ay: u32, a: &Rect, b: &Rect, state: &State) -> bool {
        let dbx = state.get_domain(b.x);
        let dby = state.get_domain(b.y);
        dbx.values().into_iter().any(|bx| bx + b.w <= ax || ax + a.w <= bx)
            || dby.values().into_iter().any(|by| by + b.h <= ay || ay + a.h <= by)
    }

    fn propagate_impl(&self, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let mut updates = Vec::new();
        for (i, a) in self.rects.iter().enumerate() {
            let dx = state.get_domain(a.x);
            let dy = state.get_domain(a.y);
            let mut surviving_x = Vec::new();
            let mut surviving_y = Vec::new();
            for ax in dx.values() {
                if self.rects.iter().enumerate().filter(|&(j, _)| j != i).all(|(_, b)| {
                    dy.values().into_iter().any(|ay| self.can_avoid(ax, ay, a, b, state))
                }) {
                    surviving_x.push(ax);
                }
            }
            for ay in dy.values() {
                if self.rects.iter().enumerate().filter(|&(j, _)| j != i).all(|(_, b)| {
                    dx.values().into_iter().any(|ax| self.can_avoid(ax, ay, a, b, state))
                }) {
                    surviving_y.push(ay);
                }
            }
            updates.push((a.x, Domain::from_values(dx.max_value(), surviving_x)));
            updates.push((a.y, Domain::from_values(dy.max_value(), surviving_y)));
        }
        apply_updates(state, updates)
    }
}

/// Wraps [`Diffn`] so [`Propagator::variables`] can borrow a stable slice.
#[derive(Debug, Clone)]
pub struct DiffnHandle {
    inner: Diffn,
    vars: Vec<VariableId>,
}

impl Propagator for DiffnHandle {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn tag(&self) -> &'static str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        self.inner.propagate_impl(state)
    }
}

impl Model {
    pub fn post_diffn(
        &mut self,
        xs: Vec<VariableId>,
        ys: Vec<VariableId>,
        widths: Vec<u32>,
        heights: Vec<u32>,
    ) -> Result<(), ValidationError> {
        let inner = Diffn::new(self, xs, ys, widths, heights)?;
        let vars = inner.variables_vec();
        self.add_propagator(Box::new(DiffnHandle { inner, vars }));
        Ok(())
    }
}
