//! Error types for document and entity operations.

use thiserror::Error;

use crate::document::{BlockKey, EntityKey};

/// Result type for entity operations.
pub type EntityResult<T> = Result<T, EntityError>;

/// Errors raised when a caller breaks the document contract.
///
/// The entity manager never surfaces these for ordinary editing: missing
/// entities are routed to `create` and out-of-range cursors are no-ops.
#[derive(Debug, Error)]
pub enum EntityError {
    /// The entity key is not present in the document's entity table.
    #[error("unknown entity key {0}")]
    UnknownEntity(EntityKey),

    /// The block key is not present in the document.
    #[error("unknown block key {0}")]
    UnknownBlock(BlockKey),

    /// A block key appears more than once.
    #[error("duplicate block key {0}")]
    DuplicateBlock(BlockKey),

    /// An offset lies past the end of its block.
    #[error("offset {offset} out of bounds for block {block} of length {len}")]
    OffsetOutOfBounds {
        block: BlockKey,
        offset: usize,
        len: usize,
    },

    /// The selection starts after it ends in document order.
    #[error("selection starts after it ends")]
    InvertedSelection,

    /// Raw content could not be parsed.
    #[error("invalid raw content: {0}")]
    Raw(#[from] serde_json::Error),
}
