//! Search statistics: counters collected during [`crate::solver::search`]
//! and [`crate::solver::optimisation`], with a `prettytable`-rendered
//! per-propagator breakdown.

use std::collections::HashMap;

use prettytable::{Cell, Row, Table};

use crate::solver::model::Model;

pub type PropagatorId = usize;

/// Per-propagator performance counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerPropagatorStats {
    pub calls: u64,
    pub prunings: u64,
    pub time_spent_micros: u64,
}

/// Aggregate statistics for a single search run.
#[derive(Debug, Default)]
pub struct SearchStats {
    pub nodes_visited: u64,
    pub backtracks: u64,
    pub solutions_found: u64,
    pub max_depth: u64,
    pub propagator_stats: HashMap<PropagatorId, PerPropagatorStats>,
}

impl SearchStats {
    pub fn record_propagation(&mut self, propagator_id: PropagatorId, pruned: bool, elapsed_micros: u64) {
        let entry = self.propagator_stats.entry(propagator_id).or_default();
        entry.calls += 1;
        entry.time_spent_micros += elapsed_micros;
        if pruned {
            entry.prunings += 1;
        }
    }

    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes_visited += other.nodes_visited;
        self.backtracks += other.backtracks;
        self.solutions_found += other.solutions_found;
        self.max_depth = self.max_depth.max(other.max_depth);
        for (id, s) in &other.propagator_stats {
            let entry = self.propagator_stats.entry(*id).or_default();
            entry.calls += s.calls;
            entry.prunings += s.prunings;
            entry.time_spent_micros += s.time_spent_micros;
        }
    }
}

/// Renders a [`SearchStats`] as a table, one row per propagator, sorted by
/// total time spent.
pub fn render_stats_table(stats: &SearchStats, model: &Model) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Propagator"),
        Cell::new("ID"),
        Cell::new("Calls"),
        Cell::new("Prunings"),
        Cell::new("Time / Call (\u{b5}s)"),
        Cell::new("Total Time (ms)"),
    ]));

    let mut sorted: Vec<(&PropagatorId, &PerPropagatorStats)> = stats.propagator_stats.iter().collect();
    sorted.sort_by_key(|(_, s)| s.time_spent_micros);

    for (id, s) in sorted {
        let tag = model.propagators().get(*id).map(|p| p.tag()).unwrap_or("?");
        let avg = if s.calls > 0 { s.time_spent_micros as f64 / s.calls as f64 } else { 0.0 };
        table.add_row(Row::new(vec![
            Cell::new(tag),
            Cell::new(&id.to_string()),
            Cell::new(&s.calls.to_string()),
            Cell::new(&s.prunings.to_string()),
            Cell::new(&format!("{avg:.2}")),
            Cell::new(&format!("{:.2}", s.time_spent_micros as f64 / 1000.0)),
        ]));
    }

    table.to_string()
}
