//! Conditions under which a running search should stop early, distinct from
//! exhausting the search space or proving infeasibility.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Checked by the search loop at well-defined points (top of the fixed-point
/// loop, before each variable selection, at each leaf) to decide whether to
/// keep going.
pub trait TerminationCondition: std::fmt::Debug + Send + Sync {
    /// `true` once the search should stop, regardless of whether it has
    /// found a solution yet.
    fn should_stop(&self, nodes_visited: u64) -> bool;
}

/// Never stops early; the search runs until the space is exhausted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Indefinite;

impl TerminationCondition for Indefinite {
    fn should_stop(&self, _nodes_visited: u64) -> bool {
        false
    }
}

/// Stops once a wall-clock budget has elapsed.
#[derive(Debug)]
pub struct TimeBudget {
    deadline: Instant,
}

impl TimeBudget {
    pub fn new(budget: Duration) -> Self {
        TimeBudget { deadline: Instant::now() + budget }
    }
}

impl TerminationCondition for TimeBudget {
    fn should_stop(&self, _nodes_visited: u64) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Stops once a fixed number of search nodes have been visited.
#[derive(Debug, Clone, Copy)]
pub struct NodeBudget {
    max_nodes: u64,
}

impl NodeBudget {
    pub fn new(max_nodes: u64) -> Self {
        NodeBudget { max_nodes }
    }
}

impl TerminationCondition for NodeBudget {
    fn should_stop(&self, nodes_visited: u64) -> bool {
        nodes_visited >= self.max_nodes
    }
}

/// A shareable flag an external caller can flip to cancel a running search
/// from another thread, e.g. one driving [`crate::solver::parallel`].
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminationCondition for CancellationToken {
    fn should_stop(&self, _nodes_visited: u64) -> bool {
        self.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_budget_stops_after_the_limit() {
        let budget = NodeBudget::new(3);
        assert!(!budget.should_stop(2));
        assert!(budget.should_stop(3));
    }

    #[test]
    fn cancellation_token_flips_once_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.should_stop(0));
        token.cancel();
        assert!(token.should_stop(0));
    }
}
