//! This module contains errors produced by the packing solvers.
//!
//! None of these are fatal to an analysis. The [`crate::comparator`] falls back
//! to the heuristic solver when a solver refuses or abandons a problem, and
//! otherwise reports that no slots can be spared.

use thiserror::Error;

/// Errors that occur when a [`crate::solver::PackingSolver`] cannot produce a
/// usable packing.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The solver could not find an optimal solution: {reason}")]
    NotOptimal { reason: String },

    #[error("Refusing to solve for {count} items as the limit is {limit}")]
    TooManyItems { count: usize, limit: usize },

    #[error("The solver produced an invalid packing: {reason}")]
    InvalidPacking { reason: String },
}

impl Error {
    /// Constructs a non-optimality error from the provided `reason`.
    pub fn not_optimal(reason: impl Into<String>) -> Self {
        Self::NotOptimal {
            reason: reason.into(),
        }
    }

    /// Constructs an invalid packing error from the provided `reason`.
    pub fn invalid_packing(reason: impl Into<String>) -> Self {
        Self::InvalidPacking {
            reason: reason.into(),
        }
    }
}

/// The result type for methods that may have solver errors.
pub type Result<T> = std::result::Result<T, Error>;
