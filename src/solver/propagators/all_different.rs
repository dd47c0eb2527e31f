//! `AllDifferent`: every variable in the group takes a distinct value.
//!
//! Consistency level: hyper-arc (generalized-arc) consistency via Régin's
//! algorithm -- a maximum bipartite matching between variables and values,
//! followed by a strongly-connected-components pass over the matching's
//! residual graph. A `(var, value)` pair survives only if it lies on some
//! maximum matching, which is strictly stronger than singleton exclusion or
//! Hall-interval detection and, unlike bounding Hall sets to a fixed size,
//! catches a Hall set of any size.

use std::collections::HashMap;

use crate::error::{PropagationFailure, Result, ValidationError};
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::{apply_updates, Priority, Propagator, PropagationResult};
use crate::solver::state::State;
use crate::solver::variable::VariableId;

const NAME: &str = "all_different";

#[derive(Debug, Clone)]
pub struct AllDifferent {
    vars: Vec<VariableId>,
}

impl AllDifferent {
    pub fn new(model: &Model, vars: Vec<VariableId>) -> Result<Self, ValidationError> {
        model.check_nonempty(NAME, &vars)?;
        for &v in &vars {
            model.check_known(NAME, v)?;
        }
        Ok(AllDifferent { vars })
    }
}

impl Propagator for AllDifferent {
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
        let n = self.vars.len();

        let mut value_index: HashMap<u32, usize> = HashMap::new();
        for &v in &self.vars {
            for val in state.get_domain(v).values() {
                let next = value_index.len();
                value_index.entry(val).or_insert(next);
            }
        }
        let values: Vec<u32> = {
            let mut pairs: Vec<(u32, usize)> = value_index.iter().map(|(&val, &idx)| (val, idx)).collect();
            pairs.sort_by_key(|&(_, idx)| idx);
            pairs.into_iter().map(|(val, _)| val).collect()
        };
        let m = values.len();

        let adj: Vec<Vec<usize>> = self
            .vars
            .iter()
            .map(|&v| state.get_domain(v).values().into_iter().map(|val| value_index[&val]).collect())
            .collect();

        // Kuhn's algorithm: match_val[j] is the variable index matched to
        // value j, if any. A variable left unmatched after every other
        // variable has had a chance to reroute around it means no perfect
        // matching exists -- the group has no consistent assignment at all.
        let mut match_val: Vec<Option<usize>> = vec![None; m];
        for start in 0..n {
            let mut visited = vec![false; m];
            if !augment(start, &adj, &mut match_val, &mut visited) {
                let first = self.vars[0];
                return apply_updates(state, [(first, Domain::empty(state.get_domain(first).max_value()))]);
            }
        }
        let mut match_var: Vec<Option<usize>> = vec![None; n];
        for (val_idx, &var_idx) in match_val.iter().enumerate() {
            if let Some(var_idx) = var_idx {
                match_var[var_idx] = Some(val_idx);
            }
        }

        // Residual graph: value -> var along a matching edge, var -> value
        // along a non-matching edge.
        let node_count = n + m;
        let mut graph: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        for (var_idx, candidates) in adj.iter().enumerate() {
            for &val_idx in candidates {
                if match_var[var_idx] == Some(val_idx) {
                    graph[n + val_idx].push(var_idx);
                } else {
                    graph[var_idx].push(n + val_idx);
                }
            }
        }

        // A value that is itself unmatched, or whose current owner could be
        // rerouted onto an unmatched value through a chain of alternating
        // edges, can always be freed up for a new variable -- regardless of
        // whether that variable's own old value can find its way back.
        // Computed once as reverse reachability from every free value.
        let mut reverse_graph: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        for (from, edges) in graph.iter().enumerate() {
            for &to in edges {
                reverse_graph[to].push(from);
            }
        }
        let mut can_escape = vec![false; node_count];
        let mut stack: Vec<usize> = (0..m).filter(|&j| match_val[j].is_none()).map(|j| n + j).collect();
        for &node in &stack {
            can_escape[node] = true;
        }
        while let Some(node) = stack.pop() {
            for &prev in &reverse_graph[node] {
                if !can_escape[prev] {
                    can_escape[prev] = true;
                    stack.push(prev);
                }
            }
        }

        let scc = tarjan_scc(&graph);

        let mut updates = Vec::new();
        for (var_idx, &v) in self.vars.iter().enumerate() {
            let domain = state.get_domain(v);
            let consistent: Vec<u32> = adj[var_idx]
                .iter()
                .filter(|&&val_idx| {
                    match_var[var_idx] == Some(val_idx)
                        || scc[var_idx] == scc[n + val_idx]
                        || can_escape[n + val_idx]
                })
                .map(|&val_idx| values[val_idx])
                .collect();
            if consistent.len() != domain.count() {
                updates.push((v, Domain::from_values(domain.max_value(), consistent)));
            }
        }

        apply_updates(state, updates)
    }
}

/// A single augmenting-path step of Kuhn's algorithm: tries to find a value
/// for `var` that is either free or whose current owner can be rerouted.
fn augment(var: usize, adj: &[Vec<usize>], match_val: &mut [Option<usize>], visited: &mut [bool]) -> bool {
    for &val in &adj[var] {
        if visited[val] {
            continue;
        }
        visited[val] = true;
        if match_val[val].is_none() || augment(match_val[val].unwrap(), adj, match_val, visited) {
            match_val[val] = Some(var);
            return true;
        }
    }
    false
}

/// Tarjan's algorithm, iterative to avoid recursion depth limits on large
/// groups. Returns one SCC id per node, in no particular order.
fn tarjan_scc(graph: &[Vec<usize>]) -> Vec<usize> {
    let n = graph.len();
    let mut index = vec![usize::MAX; n];
    let mut low_link = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut scc_id = vec![usize::MAX; n];
    let mut next_index = 0usize;
    let mut next_scc = 0usize;

    for start in 0..n {
        if index[start] != usize::MAX {
            continue;
        }
        // (node, next child position to visit) call-stack frames.
        let mut work: Vec<(usize, usize)> = vec![(start, 0)];
        while let Some(&(node, child_pos)) = work.last() {
            if child_pos == 0 {
                index[node] = next_index;
                low_link[node] = next_index;
                next_index += 1;
                stack.push(node);
                on_stack[node] = true;
            }

            if child_pos < graph[node].len() {
                let child = graph[node][child_pos];
                work.last_mut().unwrap().1 += 1;
                if index[child] == usize::MAX {
                    work.push((child, 0));
                } else if on_stack[child] {
                    low_link[node] = low_link[node].min(index[child]);
                }
            } else {
                work.pop();
                if let Some(&(parent, _)) = work.last() {
                    low_link[parent] = low_link[parent].min(low_link[node]);
                }
                if low_link[node] == index[node] {
                    loop {
                        let member = stack.pop().unwrap();
                        on_stack[member] = false;
                        scc_id[member] = next_scc;
                        if member == node {
                            break;
                        }
                    }
                    next_scc += 1;
                }
            }
        }
    }

    scc_id
}

impl Model {
    pub fn post_all_different(&mut self, vars: Vec<VariableId>) -> Result<(), ValidationError> {
        let p = AllDifferent::new(self, vars)?;
        self.add_propagator(Box::new(p));
        Ok(())
    }
}
