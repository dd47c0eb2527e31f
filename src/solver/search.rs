//! The backtracking search engine: repeatedly propagates to a fixed point,
//! picks an unassigned variable, and tries its values in order, recursing on
//! each guess and backtracking when a guess leads to failure.

use tracing::debug;

use crate::error::Result;
use crate::solver::branching::value_selection::ValueOrderingHeuristic;
use crate::solver::branching::variable_selection::{domain_size_product, VariableSelectionHeuristic};
use crate::solver::model::Model;
use crate::solver::propagation::run_to_fixed_point;
use crate::solver::solution::Solution;
use crate::solver::state::State;
use crate::solver::stats::SearchStats;
use crate::solver::termination::TerminationCondition;

/// `0` means "no limit" at the public API; internally the search loops
/// compare against `usize::MAX` instead so the same `>=` check works either
/// way.
fn unbounded(max_solutions: usize) -> usize {
    if max_solutions == 0 {
        usize::MAX
    } else {
        max_solutions
    }
}

/// Drives a depth-first search over `model`, guided by the given heuristics.
///
/// Binary branching (`var = v` / `var != v`) is implemented as a left-to-
/// right scan over the value-ordering heuristic's output: trying `v` first
/// and, on failure, excluding `v` and moving on to the next candidate is
/// equivalent to the textbook two-way branch, just flattened into one loop
/// instead of a nested pair of recursive calls.
pub struct Search<'a> {
    model: &'a Model,
    variable_heuristic: &'a dyn VariableSelectionHeuristic,
    value_heuristic: &'a dyn ValueOrderingHeuristic,
    termination: &'a dyn TerminationCondition,
}

/// The outcome of a single [`Search::solve`] call.
pub enum SearchOutcome {
    /// A solution was found.
    Solution(Solution),
    /// The search space was exhausted with no solution.
    Infeasible,
    /// The search stopped early due to a [`TerminationCondition`]; no
    /// conclusion about feasibility can be drawn.
    LimitReached,
}

impl<'a> Search<'a> {
    pub fn new(
        model: &'a Model,
        variable_heuristic: &'a dyn VariableSelectionHeuristic,
        value_heuristic: &'a dyn ValueOrderingHeuristic,
        termination: &'a dyn TerminationCondition,
    ) -> Self {
        Search { model, variable_heuristic, value_heuristic, termination }
    }

    /// Finds a single solution reachable from `model`'s root state.
    pub fn solve(&self) -> Result<(SearchOutcome, SearchStats)> {
        let mut stats = SearchStats::default();
        let root = match run_to_fixed_point(self.model, self.model.root_state()) {
            Ok(s) => s,
            Err(_) => return Ok((SearchOutcome::Infeasible, stats)),
        };
        let outcome = self.search(root, 0, &mut stats)?;
        Ok((outcome, stats))
    }

    /// Finds a single solution reachable from `from`, an already-propagated
    /// state at `depth` below the model root. Used by
    /// [`crate::solver::parallel::solve_parallel`] to resume a worker's
    /// assigned subtree instead of re-searching from the model root.
    pub fn solve_from(&self, from: State, depth: u64) -> Result<(SearchOutcome, SearchStats)> {
        let mut stats = SearchStats::default();
        let outcome = self.search(from, depth, &mut stats)?;
        Ok((outcome, stats))
    }

    /// Enumerates up to `max_solutions` solutions, returning however many
    /// were found before the space was exhausted or the termination
    /// condition fired. `max_solutions == 0` means unbounded: enumerate
    /// every solution.
    pub fn solve_all(&self, max_solutions: usize) -> Result<(Vec<Solution>, SearchStats)> {
        let mut stats = SearchStats::default();
        let mut found = Vec::new();
        let root = match run_to_fixed_point(self.model, self.model.root_state()) {
            Ok(s) => s,
            Err(_) => return Ok((found, stats)),
        };
        self.collect(root, 0, unbounded(max_solutions), &mut found, &mut stats)?;
        Ok((found, stats))
    }

    /// Enumerates up to `max_solutions` solutions reachable from `from`, an
    /// already-propagated state at `depth` below the model root. Used by
    /// [`crate::solver::parallel::solve_parallel`] to resume a worker's
    /// assigned subtree instead of re-searching from the model root.
    /// `max_solutions == 0` means unbounded: enumerate every solution.
    pub fn solve_all_from(&self, from: State, depth: u64, max_solutions: usize) -> Result<(Vec<Solution>, SearchStats)> {
        let mut stats = SearchStats::default();
        let mut found = Vec::new();
        self.collect(from, depth, unbounded(max_solutions), &mut found, &mut stats)?;
        Ok((found, stats))
    }

    fn search(&self, state: State, depth: u64, stats: &mut SearchStats) -> Result<SearchOutcome> {
        stats.nodes_visited += 1;
        stats.max_depth = stats.max_depth.max(depth);

        if self.termination.should_stop(stats.nodes_visited) {
            return Ok(SearchOutcome::LimitReached);
        }

        if state.is_complete() {
            let solution = Solution::extract(self.model, &state).expect("complete state always extracts");
            stats.solutions_found += 1;
            return Ok(SearchOutcome::Solution(solution));
        }

        let Some(var_id) = self.variable_heuristic.select_variable(self.model, &state) else {
            let solution = Solution::extract(self.model, &state).expect("no free variables means complete");
            stats.solutions_found += 1;
            return Ok(SearchOutcome::Solution(solution));
        };

        let before = domain_size_product(self.model, &state);
        for value in self.value_heuristic.order_values(self.model, &state, var_id) {
            let domain = state.get_domain(var_id);
            let guess = crate::solver::domain::Domain::from_values(domain.max_value(), [value]);
            let (guessed_state, _) = state.set_domain(var_id, guess)?;

            match run_to_fixed_point(self.model, guessed_state) {
                Ok(propagated) => {
                    self.variable_heuristic.on_assignment(var_id, before, domain_size_product(self.model, &propagated));
                    match self.search(propagated, depth + 1, stats)? {
                        SearchOutcome::Solution(s) => return Ok(SearchOutcome::Solution(s)),
                        SearchOutcome::LimitReached => return Ok(SearchOutcome::LimitReached),
                        SearchOutcome::Infeasible => {
                            stats.backtracks += 1;
                            debug!(depth, var_id, value, "backtracking");
                        }
                    }
                }
                Err(_) => {
                    stats.backtracks += 1;
                    debug!(depth, var_id, value, "backtracking after a propagation failure");
                }
            }
        }

        Ok(SearchOutcome::Infeasible)
    }

    fn collect(
        &self,
        state: State,
        depth: u64,
        max_solutions: usize,
        found: &mut Vec<Solution>,
        stats: &mut SearchStats,
    ) -> Result<()> {
        if found.len() >= max_solutions {
            return Ok(());
        }
        stats.nodes_visited += 1;
        stats.max_depth = stats.max_depth.max(depth);

        if self.termination.should_stop(stats.nodes_visited) {
            return Ok(());
        }

        let Some(var_id) = self.variable_heuristic.select_variable(self.model, &state) else {
            if let Some(solution) = Solution::extract(self.model, &state) {
                stats.solutions_found += 1;
                found.push(solution);
            }
            return Ok(());
        };

        let before = domain_size_product(self.model, &state);
        for value in self.value_heuristic.order_values(self.model, &state, var_id) {
            if found.len() >= max_solutions {
                break;
            }
            let domain = state.get_domain(var_id);
            let guess = crate::solver::domain::Domain::from_values(domain.max_value(), [value]);
            let (guessed_state, _) = state.set_domain(var_id, guess)?;
            match run_to_fixed_point(self.model, guessed_state) {
                Ok(propagated) => {
                    self.variable_heuristic.on_assignment(var_id, before, domain_size_product(self.model, &propagated));
                    self.collect(propagated, depth + 1, max_solutions, found, stats)?
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
