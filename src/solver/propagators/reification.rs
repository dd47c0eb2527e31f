//! `Reification`: links a boolean indicator to whether an underlying
//! relation holds, bidirectionally (`b <==> relation`).

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "reification";
const FALSE: u32 = 1;
const TRUE: u32 = 2;

/// The relation a [`Reification`] watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    LessEqual,
}

/// Enforces `b <==> (x <relation> y)`, where `b` is a boolean variable using
/// the solver's `{1,2}` encoding.
#[derive(Debug, Clone)]
pub struct Reification {
    vars: [VariableId; 3],
    relation: Relation,
}

impl Reification {
    pub fn new(model: &Model, b: VariableId, x: VariableId, relation: Relation, y: VariableId) -> Result<Self, ValidationError> {
        model.check_known(NAME, b)?;
        model.check_known(NAME, x)?;
        model.check_known(NAME, y)?;
        Ok(Reification { vars: [b, x, y], relation })
    }

    fn holds(&self, x: u32, y: u32) -> bool {
        match self.relation {
            Relation::Equal => x == y,
            Relation::LessEqual => x <= y,
        }
    }
}

impl Propagator for Reification {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn tag(&self) -> &'static str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&self, _model: &Model, state: &State) -> Result<PropagationResult, PropagationFailure> {
        let [b, x, y] = self.vars;
        let db = state.get_domain(b);
        let dx = state.get_domain(x);
        let dy = state.get_domain(y);
        let mut updates = Vec::new();

        let any_hold = dx.values().iter().any(|&xv| dy.values().iter().any(|&yv| self.holds(xv, yv)));
        let all_hold = dx.values().iter().all(|&xv| dy.values().iter().all(|&yv| self.holds(xv, yv)));

        // (x, y) -> b: if the relation can never hold, b is false; if it
        // always holds for every remaining pair, b is true.
        if !any_hold {
            updates.push((b, db.intersect(&Domain::from_values(2, [FALSE]))));
        } else if all_hold {
            updates.push((b, db.intersect(&Domain::from_values(2, [TRUE]))));
        }

        // b -> (x, y): restrict x and y to the pairs consistent with b's forced truth value.
        if let Some(bv) = db.singleton_value() {
            let want_hold = bv == TRUE;
            let new_dx = Domain::from_values(
                dx.max_value(),
                dx.values().into_iter().filter(|&xv| dy.values().iter().any(|&yv| self.holds(xv, yv) == want_hold)),
            );
            let new_dy = Domain::from_values(
                dy.max_value(),
                dy.values().into_iter().filter(|&yv| dx.values().iter().any(|&xv| self.holds(xv, yv) == want_hold)),
            );
            updates.push((x, new_dx));
            updates.push((y, new_dy));
        }

        apply_updates(state, updates)
    }
}

impl Model {
    pub fn post_reification(&mut self, b: VariableId, x: VariableId, relation: Relation, y: VariableId) -> Result<(), ValidationError> {
        let p = Reification::new(self, b, x, relation, y)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}
