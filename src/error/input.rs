//! This module contains errors encountered while loading and resolving the
//! declarations that make up an input unit.

use thiserror::Error;

/// Errors that occur when reading the output of the external contract
/// analyzer.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("Could not read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Malformed input: {message}")]
    Malformed { message: String },

    #[error("Variable `{name}` has a size of {size} bytes which does not fit in a slot")]
    InvalidByteSize { name: String, size: usize },

    #[error("Cannot determine the size of variable `{name}` of type `{type_label}`")]
    UnknownSize { name: String, type_label: String },
}

/// The result type for methods that may have input errors.
pub type Result<T> = std::result::Result<T, Error>;
