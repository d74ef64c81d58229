//! This module contains errors pertaining to the resolution of a contract for
//! packing analysis.

use thiserror::Error;

/// Errors that abort the analysis of a single input unit.
///
/// These never abort the analysis of a batch of units; see
/// [`crate::batch::analyze_files`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The input does not contain any contract")]
    NoEligibleContract,

    #[error("{contract} does not define any eligible state variable")]
    NoEligibleVariables { contract: String },
}

/// The result type for methods that may have analysis errors.
pub type Result<T> = std::result::Result<T, Error>;
