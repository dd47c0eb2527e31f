//! `Table`: only the listed tuples of values are allowed for `vars`.

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "table";

/// Enforces that `vars` takes one of the rows of `tuples` -- supports-based
/// consistency: a value survives in `vars[i]` only if some tuple agrees with
/// it at position `i` and is still compatible with every other variable's
/// current domain.
#[derive(Debug, Clone)]
pub struct Table {
    vars: Vec<VariableId>,
    tuples: Vec<Vec<u32>>,
}

impl Table {
    pub fn new(model: &Model, vars: Vec<VariableId>, tuples: Vec<Vec<u32>>) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &vars)?;
        for &v in &vars {
            model.check_known(NAME, v)?;
        }
        for tuple in &tuples {
            if tuple.len() != vars.len() {
                return Err(ValidationError::MismatchedLengths {
                    constraint: NAME,
                    expected: "tuple.len() == vars.len()",
                    actual: vec![tuple.len(), vars.len()],
                });
            }
        }
        Ok(Table { vars, tuples })
    }
}

impl Propagator for Table {
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
        let domains: Vec<Domain> = self.vars.iter().map(|&v| state.get_domain(v)).collect();

        let supporting: Vec<&Vec<u32>> = self
            .tuples
            .iter()
            .filter(|tuple| tuple.iter().zip(domains.iter()).all(|(&val, d)| d.has(val)))
            .collect();

        let mut updates = Vec::new();
        for (pos, (&v, d)) in self.vars.iter().zip(domains.iter()).enumerate() {
            let supported_values: Vec<u32> = supporting.iter().map(|t| t[pos]).collect();
            let narrowed = d.intersect(&Domain::from_values(d.max_value(), supported_values));
            updates.push((v, narrowed));
        }

        apply_updates(state, updates)
    }
}

impl Model {
    pub fn post_table(&mut self, vars: Vec<VariableId>, tuples: Vec<Vec<u32>>) -> Result<(), ValidationError> {
        let p = Table::new(self, vars, tuples)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::domain::Domain;
    use crate::solver::propagation::run_to_fixed_point;

    #[test]
    fn keeps_only_values_with_a_supporting_tuple() {
        let mut model = Model::new();
        let a = model.new_variable(3, None);
        let b = model.new_variable(3, None);
        model.post_table(vec![a, b], vec![vec![1, 2], vec![2, 3]]).unwrap();
        let r = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert_eq!(r.get_domain(a).values(), vec![1, 2]);
        assert_eq!(r.get_domain(b).values(), vec![2, 3]);
    }

    #[test]
    fn fixing_one_variable_prunes_the_other() {
        let mut model = Model::new();
        let a = model.new_variable_with_domain(Domain::from_values(3, [1]), None);
        let b = model.new_variable(3, None);
        model.post_table(vec![a, b], vec![vec![1, 2], vec![2, 3]]).unwrap();
        let r = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert_eq!(r.get_domain(b).singleton_value(), Some(2));
    }
}
