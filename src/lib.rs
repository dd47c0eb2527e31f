//! `munchkin_fd` is a finite-domain (FD) constraint programming solver core:
//! domains, variables, a persistent solver state, a fixed-point propagation
//! engine, a library of global and arithmetic propagators, backtracking
//! search with pluggable heuristics, and branch-and-bound optimisation.
//!
//! The crate deliberately stops at the FD core: building a model, choosing
//! search heuristics and reading back a [`Solution`] is the whole surface.
//! Higher-level concerns -- a relational or miniKanren-style goal language, a
//! CLI, example-problem harnesses -- live outside this crate and interact
//! with it only through [`solver::registry::VariableRegistry`].
//!
//! # Core Concepts
//!
//! - **[`Model`]**: the variables and propagators that make up a constraint
//!   satisfaction problem. Built incrementally with `new_variable` and the
//!   `post_*` family of methods.
//! - **[`State`]**: a persistent, copy-on-write snapshot of every variable's
//!   current domain. Cloning a `State` is O(1); forking it for search is the
//!   normal way to explore two branches without disturbing one another.
//! - **[`solver::propagation::Propagator`]**: the trait every global and
//!   arithmetic constraint implements, run to a fixed point by
//!   [`solver::propagation::run_to_fixed_point`].
//! - **[`Search`]**: depth-first backtracking search over a `Model`, guided by
//!   a [`solver::branching::variable_selection::VariableSelectionHeuristic`]
//!   and a [`solver::branching::value_selection::ValueOrderingHeuristic`].
//! - **[`solver::optimisation::Optimiser`]**: branch-and-bound optimisation of
//!   a single objective variable built on the same search.
//!
//! # Example: two variables, one disequality
//!
//! ```
//! use munchkin_fd::solver::branching::value_selection::Min;
//! use munchkin_fd::solver::branching::variable_selection::DomDeg;
//! use munchkin_fd::solver::model::Model;
//! use munchkin_fd::solver::search::{Search, SearchOutcome};
//! use munchkin_fd::solver::termination::Indefinite;
//!
//! let mut model = Model::new();
//! let a = model.new_variable(2, Some("a".to_string()));
//! let b = model.new_variable(2, Some("b".to_string()));
//! model.post_all_different(vec![a, b]).unwrap();
//!
//! let variable_heuristic = DomDeg;
//! let value_heuristic = Min;
//! let termination = Indefinite;
//! let search = Search::new(&model, &variable_heuristic, &value_heuristic, &termination);
//!
//! let (outcome, _stats) = search.solve().unwrap();
//! match outcome {
//!     SearchOutcome::Solution(solution) => assert_ne!(solution.value_of(a), solution.value_of(b)),
//!     _ => panic!("expected a solution"),
//! }
//! ```

pub mod error;
pub mod solver;

pub use solver::model::Model;
pub use solver::search::{Search, SearchOutcome};
pub use solver::solution::Solution;
pub use solver::state::State;
