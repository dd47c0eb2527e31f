//! `Regular`: `vars` spells out a word accepted by a deterministic
//! finite automaton, propagated by forward/backward layered reachability.

use std::collections::HashSet;

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "regular";

pub type StateId = u32;

/// A deterministic finite automaton over the alphabet `1..=max_value`.
#[derive(Debug, Clone)]
pub struct Dfa {
    pub start: StateId,
    pub accepting: HashSet<StateId>,
    /// `transitions[(state, symbol)] = next_state`.
    pub transitions: Vec<((StateId, u32), StateId)>,
}

impl Dfa {
    fn step(&self, state: StateId, symbol: u32) -> Option<StateId> {
        self.transitions.iter().find(|&&((s, sym), _)| s == state && sym == symbol).map(|&(_, next)| next)
    }
}

/// Enforces that `vars` is a word accepted by `dfa`.
#[derive(Debug, Clone)]
pub struct Regular {
    vars: Vec<VariableId>,
    dfa: Dfa,
}

impl Regular {
    pub fn new(model: &Model, vars: Vec<VariableId>, dfa: Dfa) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &vars)?;
        for &v in &vars {
            model.check_known(NAME, v)?;
        }
        Ok(Regular { vars, dfa })
    }

    /// `layers[i]` is the set of automaton states reachable after reading
    /// `vars[0..i]` given the current domains, forward from `dfa.start`.
    fn forward_layers(&self, domains: &[Domain]) -> Vec<HashSet<StateId>> {
        let mut layers = Vec::with_capacity(domains.len() + 1);
        let mut current: HashSet<StateId> = HashSet::from([self.dfa.start]);
        layers.push(current.clone());
        for d in domains {
            let mut next = HashSet::new();
            for &s in &current {
                for v in d.values() {
                    if let Some(n) = self.dfa.step(s, v) {
                        next.insert(n);
                    }
                }
            }
            layers.push(next.clone());
            current = next;
        }
        layers
    }

    /// `layers[i]` is the set of states from which `vars[i..]` can still
    /// reach an accepting state, backward from the end.
    fn backward_layers(&self, domains: &[Domain]) -> Vec<HashSet<StateId>> {
        let mut layers = vec![HashSet::new(); domains.len() + 1];
        layers[domains.len()] = self.dfa.accepting.clone();
        for i in (0..domains.len()).rev() {
            let next_layer = layers[i + 1].clone();
            let mut reachable = HashSet::new();
            for &((s, sym), n) in &self.dfa.transitions {
                if domains[i].has(sym) && next_layer.contains(&n) {
                    reachable.insert(s);
                }
            }
            layers[i] = reachable;
        }
        layers
    }
}

impl Propagator for Regular {
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
        let forward = self.forward_layers(&domains);
        let backward = self.backward_layers(&domains);

        let mut updates = Vec::new();
        for (i, (&v, d)) in self.vars.iter().zip(domains.iter()).enumerate() {
            let surviving: Vec<u32> = d
                .values()
                .into_iter()
                .filter(|&sym| {
                    forward[i]
                        .iter()
                        .any(|&s| self.dfa.step(s, sym).map(|n| backward[i + 1].contains(&n)).unwrap_or(false))
                })
                .collect();
            updates.push((v, Domain::from_values(d.max_value(), surviving)));
        }

        apply_updates(state, updates)
    }
}

impl Model {
    pub fn post_regular(&mut self, vars: Vec<VariableId>, dfa: Dfa) -> Result<(), ValidationError> {
        let p = Regular::new(self, vars, dfa)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::propagation::run_to_fixed_point;

    /// Accepts words over `{1,2}` with no two consecutive `2`s: states
    /// 0 (start/last-was-1) and 1 (last-was-2), 2 = dead.
    fn no_two_consecutive_twos() -> Dfa {
        Dfa {
            start: 0,
            accepting: HashSet::from([0, 1]),
            transitions: vec![((0, 1), 0), ((0, 2), 1), ((1, 1), 0), ((1, 2), 2)],
        }
    }

    #[test]
    fn forces_a_one_after_a_fixed_two() {
        let mut model = Model::new();
        let a = model.new_variable_with_domain(Domain::from_values(2, [2]), None);
        let b = model.new_variable(2, None);
        model.post_regular(vec![a, b], no_two_consecutive_twos()).unwrap();
        let r = run_to_fixed_point(&model, model.root_state()).unwrap();
        assert_eq!(r.get_domain(b).singleton_value(), Some(1));
    }
}
