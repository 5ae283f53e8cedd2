//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::ItemId;

/// Domain errors represent violated preconditions of hierarchy operations.
/// Bulk operations skip unknown ids instead of failing with these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("item not found: {0}")]
    NotFound(ItemId),

    #[error("item already present: {0}")]
    Conflict(ItemId),

    #[error("cannot move items into {target}: target is one of them or their descendant")]
    InvalidMove { target: ItemId },

    #[error("index {index} out of range for container of {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("hierarchy inconsistent at {id}: {reason}")]
    Inconsistent { id: ItemId, reason: String },
}

/// Result type for hierarchy operations.
pub type DomainResult<T> = Result<T, DomainError>;
