//! Domain error types

use crate::session::entities::SessionStatus;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Illegal session transition: {from} -> {to}")]
    IllegalTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Result for worker '{0}' was already recorded")]
    DuplicateResult(String),
}
