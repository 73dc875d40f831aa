//! Crate-wide error taxonomy. See `SPEC_FULL.md` §7.

use thiserror::Error;

/// Errors surfaced while building `InputData` from an input adapter, or while validating CLI
/// options. Always non-retryable and always exit-code 1 at the top level.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("unknown name: {0}")]
    UnknownName(String),

    #[error("ambiguous name: {0} matches more than one entity")]
    AmbiguousName(String),

    #[error("malformed constraint at row {row}: {message}")]
    MalformedConstraint { row: usize, message: String },

    #[error("duplicate definition of {kind} {name}")]
    DuplicateDefinition { kind: &'static str, name: String },

    #[error("size mismatch: expected {expected} columns, found {found} at row {row}")]
    SizeMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("constraint reduction found an unsatisfiable constraint: {0}")]
    UnsatisfiableConstraint(String),

    #[error("invalid option {option}: {message}")]
    InvalidOption { option: &'static str, message: String },

    #[error("could not parse duration {0:?}")]
    BadDuration(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Top-level crate error. `Internal` indicates a programmer fault (an unreachable branch was hit,
/// a flow was read back before being solved); it is always fatal and is allowed to propagate to
/// the process boundary rather than being handled.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;
pub type InputResult<T> = std::result::Result<T, InputError>;
