//! Accessor runtime errors

use thiserror::Error;

use super::Arity;

/// Failures raised while reading or writing through an accessor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// Assignment through a field that has no setter
    #[error("can't set attribute '{field}' of '{view}': the field is read-only")]
    ReadOnlyField { view: String, field: String },

    #[error("'{view}' object has no field '{field}'")]
    NoSuchField { view: String, field: String },

    #[error("index {index} is out of range for a buffer of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The cell holds a plain value where a sub-buffer was expected
    #[error("cell {index} holds a '{found}' and cannot be sliced into a segment")]
    NotSegment { index: usize, found: String },

    #[error("'{view}' cannot be constructed from {arity}")]
    UnsupportedArity { view: String, arity: Arity },
}

/// Result type for accessor operations
pub type ViewResult<T> = Result<T, ViewError>;
