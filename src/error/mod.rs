//! This module contains the primary error type for the packer's interface. It
//! also re-exports the more specific error types that are subsystem-specific.

pub mod analysis;
pub mod container;
pub mod input;
pub mod solver;

use thiserror::Error;

/// The interface result type for the library.
///
/// # Usage
///
/// Any function considered to be part of the public interface of the library
/// should return this result type. Subsystems should return the more-specific
/// child error types as appropriate.
pub type Result<T> = std::result::Result<T, Error>;

/// The interface error type for the library.
///
/// All errors returned from the library interface (and hence encountered by the
/// clients of the library) should be members of this enum.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Errors that abort the analysis of a single unit.
    #[error(transparent)]
    Analysis(#[from] analysis::Error),

    /// Errors from loading the analyzer's declarations.
    #[error(transparent)]
    Input(#[from] input::Error),

    /// Errors from the packing solvers.
    ///
    /// These are absorbed during analysis, but are surfaced when a solver is
    /// driven directly through [`crate::solver::PackingSolver`].
    #[error(transparent)]
    Solver(#[from] solver::Error),
}

/// A library error with an associated input unit.
pub type LocatedError = container::Located<Error>;

/// A container of errors that may occur across a batch of input units.
pub type Errors = container::Errors<LocatedError>;
