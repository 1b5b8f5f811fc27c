//! Error types for the rolescope condition engine.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! "Nothing to do" outcomes (no hinge, fragment absent) are never errors;
//! they are expressed in the return types of the operations themselves.

use std::fmt;

use thiserror::Error;

use crate::model::Operator;

/// The top-level error type for all rolescope operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Construction ---
    #[error("Malformed {operator} condition: {reason}")]
    Malformed { operator: Operator, reason: String },

    // --- Pipeline preconditions ---
    #[error("Invariant violated during {stage}: {detail}")]
    InvariantViolation { stage: Stage, detail: String },

    // --- Boundary integrity checks ---
    #[error("Integrity check failed at {path}: {reason}")]
    Integrity { path: String, reason: String },

    // --- Packed encoding ---
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid hex operand: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for an [`Error::InvariantViolation`].
    pub fn invariant(stage: Stage, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            stage,
            detail: detail.into(),
        }
    }

    /// Whether this error is a fatal precondition violation (as opposed to
    /// bad input caught at the boundary).
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }
}

/// The stage of the engine that reported an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Clean,
    Prune,
    Pad,
    Flatten,
    Dedupe,
    Unwrap,
    PushDown,
    Sort,
    Subtract,
    Merge,
    Pack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Clean => "clean",
            Stage::Prune => "prune",
            Stage::Pad => "pad",
            Stage::Flatten => "flatten",
            Stage::Dedupe => "dedupe",
            Stage::Unwrap => "unwrap",
            Stage::PushDown => "push-down",
            Stage::Sort => "sort",
            Stage::Subtract => "subtract",
            Stage::Merge => "merge",
            Stage::Pack => "pack",
        };
        f.write_str(name)
    }
}
