//! Branch-and-bound optimisation over a single objective variable.
//!
//! Built on top of the same fixed-point propagation used by
//! [`crate::solver::search`], but keeps an incumbent (the best complete
//! solution found so far) and prunes any branch whose objective variable can
//! no longer beat it -- a proper branch-and-bound, not a restart-from-root
//! loop reseeded after every improvement.

use tracing::debug;

use crate::error::Result;
use crate::solver::branching::value_selection::ValueOrderingHeuristic;
use crate::solver::branching::variable_selection::{domain_size_product, VariableSelectionHeuristic};
use crate::solver::domain::{Domain, Value};
use crate::solver::model::Model;
use crate::solver::propagation::run_to_fixed_point;
use crate::solver::solution::Solution;
use crate::solver::state::State;
use crate::solver::stats::SearchStats;
use crate::solver::termination::TerminationCondition;
use crate::solver::variable::VariableId;

/// Whether the objective variable should be driven as low as possible or as
/// high as possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// The outcome of an [`Optimiser::solve`] call.
pub enum OptimisationOutcome {
    /// A provably optimal solution was found.
    Optimal(Solution),
    /// A solution was found but the search stopped before proving
    /// optimality; this is the best incumbent seen.
    Feasible(Solution),
    /// The model's root state has no solution at all.
    Infeasible,
    /// The termination condition fired before any solution was found.
    LimitReached,
}

pub struct Optimiser<'a> {
    model: &'a Model,
    objective: VariableId,
    direction: Direction,
    variable_heuristic: &'a dyn VariableSelectionHeuristic,
    value_heuristic: &'a dyn ValueOrderingHeuristic,
    termination: &'a dyn TerminationCondition,
}

impl<'a> Optimiser<'a> {
    pub fn new(
        model: &'a Model,
        objective: VariableId,
        direction: Direction,
        variable_heuristic: &'a dyn VariableSelectionHeuristic,
        value_heuristic: &'a dyn ValueOrderingHeuristic,
        termination: &'a dyn TerminationCondition,
    ) -> Self {
        Optimiser { model, objective, direction, variable_heuristic, value_heuristic, termination }
    }

    pub fn solve(&self) -> Result<(OptimisationOutcome, SearchStats)> {
        let mut stats = SearchStats::default();
        let mut incumbent: Option<(Solution, Value)> = None;
        let mut limited = false;

        let root = match run_to_fixed_point(self.model, self.model.root_state()) {
            Ok(s) => s,
            Err(_) => return Ok((OptimisationOutcome::Infeasible, stats)),
        };

        self.branch(root, 0, &mut incumbent, &mut stats, &mut limited)?;

        let outcome = match (incumbent, limited) {
            (Some((solution, _)), false) => OptimisationOutcome::Optimal(solution),
            (Some((solution, _)), true) => OptimisationOutcome::Feasible(solution),
            (None, true) => OptimisationOutcome::LimitReached,
            (None, false) => OptimisationOutcome::Infeasible,
        };
        Ok((outcome, stats))
    }

    /// Returns the best-case value the objective could still take on in
    /// `state`: the lower bound of its domain when minimizing, the upper
    /// bound when maximizing.
    fn best_case(&self, state: &State) -> Value {
        let domain = state.get_domain(self.objective);
        match self.direction {
            Direction::Minimize => domain.min().expect("non-empty domain"),
            Direction::Maximize => domain.max().expect("non-empty domain"),
        }
    }

    fn improves(&self, candidate: Value, incumbent: Value) -> bool {
        match self.direction {
            Direction::Minimize => candidate < incumbent,
            Direction::Maximize => candidate > incumbent,
        }
    }

    fn branch(
        &self,
        state: State,
        depth: u64,
        incumbent: &mut Option<(Solution, Value)>,
        stats: &mut SearchStats,
        limited: &mut bool,
    ) -> Result<()> {
        stats.nodes_visited += 1;
        stats.max_depth = stats.max_depth.max(depth);

        if self.termination.should_stop(stats.nodes_visited) {
            *limited = true;
            return Ok(());
        }

        if let Some((_, best)) = incumbent {
            if !self.improves(self.best_case(&state), *best) {
                stats.backtracks += 1;
                debug!(depth, best, "pruned: best case can no longer improve on the incumbent");
                return Ok(());
            }
        }

        if state.is_complete() {
            let solution = Solution::extract(self.model, &state).expect("complete state always extracts");
            let value = solution.value_of(self.objective);
            let is_new_best = incumbent.as_ref().map_or(true, |(_, best)| self.improves(value, *best));
            if is_new_best {
                stats.solutions_found += 1;
                self.value_heuristic.on_incumbent(value);
                *incumbent = Some((solution, value));
            }
            return Ok(());
        }

        let Some(var_id) = self.variable_heuristic.select_variable(self.model, &state) else {
            return Ok(());
        };

        let before = domain_size_product(self.model, &state);
        for value in self.value_heuristic.order_values(self.model, &state, var_id) {
            let domain = state.get_domain(var_id);
            let guess = Domain::from_values(domain.max_value(), [value]);
            let Ok((guessed_state, _)) = state.set_domain(var_id, guess) else {
                stats.backtracks += 1;
                continue;
            };

            match run_to_fixed_point(self.model, guessed_state) {
                Ok(propagated) => {
                    self.variable_heuristic.on_assignment(var_id, before, domain_size_product(self.model, &propagated));
                    self.branch(propagated, depth + 1, incumbent, stats, limited)?;
                    if *limited {
                        return Ok(());
                    }
                }
                Err(_) => {
                    stats.backtracks += 1;
                    debug!(depth, var_id, value, "backtracking after a propagation failure");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::branching::value_selection::Min;
    use crate::solver::branching::variable_selection::DomDeg;
    use crate::solver::termination::Indefinite;

    #[test]
    fn minimises_a_sum() {
        let mut model = Model::new();
        let a = model.new_variable(5, None);
        let b = model.new_variable(5, None);
        let sum = model.new_variable(10, None);
        model.post_linear_sum(vec![a, b], vec![1, 1], sum).unwrap();

        let var_h = DomDeg;
        let val_h = Min;
        let term = Indefinite;
        let opt = Optimiser::new(&model, sum, Direction::Minimize, &var_h, &val_h, &term);
        let (outcome, _) = opt.solve().unwrap();
        match outcome {
            OptimisationOutcome::Optimal(solution) => assert_eq!(solution.value_of(sum), 2),
            _ => panic!("expected an optimal solution"),
        }
    }

    #[test]
    fn maximises_a_sum() {
        let mut model = Model::new();
        let a = model.new_variable(3, None);
        let b = model.new_variable(3, None);
        let sum = model.new_variable(10, None);
        model.post_linear_sum(vec![a, b], vec![1, 1], sum).unwrap();

        let var_h = DomDeg;
        let val_h = Min;
        let term = Indefinite;
        let opt = Optimiser::new(&model, sum, Direction::Maximize, &var_h, &val_h, &term);
        let (outcome, _) = opt.solve().unwrap();
        match outcome {
            OptimisationOutcome::Optimal(solution) => assert_eq!(solution.value_of(sum), 6),
            _ => panic!("expected an optimal solution"),
        }
    }

    #[test]
    fn infeasible_root_reports_infeasible() {
        let mut model = Model::new();
        let a = model.new_variable(1, None);
        let b = model.new_variable(1, None);
        model.post_all_different(vec![a, b]).unwrap();

        let var_h = DomDeg;
        let val_h = Min;
        let term = Indefinite;
        let opt = Optimiser::new(&model, a, Direction::Minimize, &var_h, &val_h, &term);
        let (outcome, _) = opt.solve().unwrap();
        assert!(matches!(outcome, OptimisationOutcome::Infeasible));
    }
}
