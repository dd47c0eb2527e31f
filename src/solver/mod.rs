//! The finite-domain constraint solver core: domains, variables, persistent
//! search state, the propagator contract and fixed-point engine, branching
//! heuristics, the concrete propagator library, backtracking search,
//! branch-and-bound optimisation, optional parallel search and the registry
//! external collaborators use to read solved bindings.

pub mod branching;
pub mod domain;
pub mod model;
pub mod optimisation;
pub mod parallel;
pub mod propagation;
pub mod propagators;
pub mod registry;
pub mod search;
pub mod solution;
pub mod state;
pub mod stats;
pub mod termination;
pub mod variable;
pub mod work_list;
