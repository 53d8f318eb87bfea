//! Engine error types.
//!
//! Data-shape issues (unknown session ID, absent signal, missing path
//! segment) are **not** errors — lifecycle operations return `false` and
//! attribute resolution yields absent, keeping evaluation total. The
//! error type exists for genuinely exceptional states only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// An internal invariant failed (e.g. a poisoned lock).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
