//! Core error types
//!
//! Every crate in the workspace classifies its failures into the same small
//! taxonomy so that clients can react to the class of failure without
//! knowing every variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure classes shared by governance, adapter and vault errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Referenced proposal does not exist.
    NotFound,
    /// Voting window or timelock comparison failed.
    TimingViolation,
    /// The proposal or account is in the wrong state for the call.
    StateConflict,
    /// Caller lacks the required role or voting power.
    AuthorizationFailure,
    /// Malformed input.
    ValidationFailure,
    /// Adapter logic changed after the proposal pinned it.
    IntegrityFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::TimingViolation => "timing-violation",
            ErrorKind::StateConflict => "state-conflict",
            ErrorKind::AuthorizationFailure => "authorization-failure",
            ErrorKind::ValidationFailure => "validation-failure",
            ErrorKind::IntegrityFailure => "integrity-failure",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown transfer kind: {0}")]
    UnknownKind(String),

    #[error("Memo too long: {len} bytes, max {max}")]
    MemoTooLong { len: usize, max: usize },

    #[error("Invalid vote choice: {0} (expected 0, 1 or 2)")]
    InvalidChoice(u8),

    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("Empty principal")]
    EmptyPrincipal,
}

pub type Result<T> = std::result::Result<T, CoreError>;
