//! Error types produced by the solver.
//!
//! The solver distinguishes between errors raised while *building* a model
//! ([`ValidationError`]) and conditions observed while *solving* it
//! ([`SolverError`]). Validation errors are fatal and must be surfaced to the
//! caller immediately; propagation failures are caught internally by the
//! search engine and turned into backtracking, never bubbling up to the
//! caller unless the root state itself is infeasible.

pub type Result<T, E = SolverError> = core::result::Result<T, E>;

/// Raised by a constraint/propagator constructor when its arguments are malformed.
///
/// A validation error never mutates the [`crate::solver::model::Model`] it was
/// raised against: the constraint simply is not added.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("variable list for `{constraint}` must not be empty")]
    EmptyVariableList { constraint: &'static str },

    #[error("`{constraint}` expects {expected} array(s) of equal length, got lengths {actual:?}")]
    MismatchedLengths {
        constraint: &'static str,
        expected: &'static str,
        actual: Vec<usize>,
    },

    #[error("`{constraint}` requires {field} > 0, got {value}")]
    NonPositiveValue {
        constraint: &'static str,
        field: &'static str,
        value: i64,
    },

    #[error("`{constraint}` was given an index {index} out of range for length {length}")]
    IndexOutOfRange {
        constraint: &'static str,
        index: i64,
        length: usize,
    },

    #[error("`{constraint}` refers to unknown variable id {variable_id}")]
    UnknownVariable {
        constraint: &'static str,
        variable_id: u32,
    },
}

/// Raised by a propagator when pruning would empty a variable's domain.
///
/// This is an internal control-flow signal: the [`crate::solver::search`]
/// module catches it and treats the current branch as a dead end. It is only
/// ever visible to a caller when the *root* state is already infeasible.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("propagation emptied the domain of variable {variable_id}: {reason}")]
pub struct PropagationFailure {
    pub variable_id: u32,
    pub reason: String,
}

/// Top-level error type returned by fallible solver operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SolverError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Propagation(#[from] PropagationFailure),
}
