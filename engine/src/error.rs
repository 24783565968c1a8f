//! Error types for the fragment synchronizer.

use crate::Key;
use thiserror::Error;

/// All possible errors from the engine.
///
/// Construction and configuration parsing return these through [`Result`].
/// Change requests never do: they log the error and report it inside
/// [`Outcome::Rejected`](crate::Outcome::Rejected) instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Request errors
    #[error("unknown key: {0}")]
    UnknownKey(Key),

    #[error("cannot toggle non-array key: {0}")]
    NotAnArray(Key),

    #[error("toggle member for key '{key}' contains the array separator: {member}")]
    SeparatorInMember { key: Key, member: String },

    // Definition errors
    #[error("type mismatch for key '{key}': expected {expected}, got {got}")]
    TypeMismatch {
        key: Key,
        expected: String,
        got: String,
    },

    #[error("invalid kind: {0}")]
    InvalidKind(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
