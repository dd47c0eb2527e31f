//! Optional parallel search: splits the root of the search tree across a
//! bounded work queue of `(state, pending_decisions)` items and lets a fixed
//! number of worker threads each drive their own [`crate::solver::search::Search`]
//! over a disjoint slice of it.
//!
//! Workers share the read-only [`Model`] and read-only, persistent
//! [`State`]s through atomic reference counting (`Arc`, see
//! [`crate::solver::domain`]); no propagator mutates anything reachable from
//! another worker. The first worker to observe enough solutions signals the
//! rest to stop through the caller's [`CancellationToken`].

use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};

use crate::error::Result;
use crate::solver::branching::value_selection::ValueOrderingHeuristic;
use crate::solver::branching::variable_selection::VariableSelectionHeuristic;
use crate::solver::domain::Domain;
use crate::solver::model::Model;
use crate::solver::propagation::run_to_fixed_point;
use crate::solver::search::Search;
use crate::solver::solution::Solution;
use crate::solver::state::State;
use crate::solver::stats::SearchStats;
use crate::solver::termination::CancellationToken;

/// A single unit of work: a subtree root together with the depth it sits at,
/// so worker threads can keep contributing to `SearchStats::max_depth`.
struct WorkItem {
    state: State,
    depth: u64,
}

/// Builds the initial work queue by expanding the root to a fixed fan-out:
/// one item per value of the first branching variable the heuristic would
/// have chosen, each already propagated to a fixed point.
fn seed_queue(
    model: &Model,
    variable_heuristic: &dyn VariableSelectionHeuristic,
) -> std::result::Result<VecDeque<WorkItem>, ()> {
    let mut queue = VecDeque::new();
    let root = match run_to_fixed_point(model, model.root_state()) {
        Ok(s) => s,
        Err(_) => return Err(()),
    };

    let Some(var_id) = variable_heuristic.select_variable(model, &root) else {
        queue.push_back(WorkItem { state: root, depth: 0 });
        return Ok(queue);
    };

    for value in root.get_domain(var_id).values() {
        let domain = Domain::from_values(root.get_domain(var_id).max_value(), [value]);
        let Ok((guessed, _)) = root.set_domain(var_id, domain) else {
            continue;
        };
        if let Ok(propagated) = run_to_fixed_point(model, guessed) {
            queue.push_back(WorkItem { state: propagated, depth: 1 });
        }
    }
    Ok(queue)
}

/// Runs up to `worker_count` threads cooperatively searching `model` for at
/// most `max_solutions` solutions. `max_solutions == 0` means unbounded:
/// enumerate every solution.
///
/// Solutions are returned as a set: a single worker's own output remains
/// deterministic given its heuristic and seed, but the *order* solutions from
/// different workers are appended in is not guaranteed (see the ordering
/// guarantees in [`crate::solver::search`]).
pub fn solve_parallel(
    model: &Model,
    worker_count: usize,
    max_solutions: usize,
    variable_heuristic_factory: impl Fn() -> Box<dyn VariableSelectionHeuristic + Send> + Sync,
    value_heuristic_factory: impl Fn() -> Box<dyn ValueOrderingHeuristic + Send> + Sync,
    cancellation: &CancellationToken,
) -> Result<(Vec<Solution>, SearchStats)> {
    let worker_count = worker_count.max(1);
    let max_solutions = if max_solutions == 0 { usize::MAX } else { max_solutions };
    let seed_heuristic = variable_heuristic_factory();
    let queue = match seed_queue(model, seed_heuristic.as_ref()) {
        Ok(q) => q,
        Err(()) => return Ok((Vec::new(), SearchStats::default())),
    };

    let queue = Mutex::new(queue);
    let solutions: Mutex<Vec<Solution>> = Mutex::new(Vec::new());
    let stats = RwLock::new(SearchStats::default());

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let queue = &queue;
            let solutions = &solutions;
            let stats = &stats;
            let variable_heuristic_factory = &variable_heuristic_factory;
            let value_heuristic_factory = &value_heuristic_factory;
            scope.spawn(move || {
                let variable_heuristic = variable_heuristic_factory();
                let value_heuristic = value_heuristic_factory();
                loop {
                    if cancellation.is_cancelled() {
                        return;
                    }
                    if solutions.lock().unwrap().len() >= max_solutions {
                        cancellation.cancel();
                        return;
                    }
                    let item = { queue.lock().unwrap().pop_front() };
                    let Some(item) = item else { return };

                    let remaining = max_solutions.saturating_sub(solutions.lock().unwrap().len());
                    if remaining == 0 {
                        cancellation.cancel();
                        return;
                    }

                    let search = Search::new(model, variable_heuristic.as_ref(), value_heuristic.as_ref(), cancellation);
                    if let Ok((found, worker_stats)) = search.solve_all_from(item.state, item.depth, remaining) {
                        let mut guard = solutions.lock().unwrap();
                        guard.extend(found);
                        if guard.len() >= max_solutions {
                            cancellation.cancel();
                        }
                        drop(guard);
                        stats.write().unwrap().merge(&worker_stats);
                    }
                }
            });
        }
    });

    let solutions = solutions.into_inner().unwrap();
    let stats = stats.into_inner().unwrap();
    Ok((solutions, stats))
}
