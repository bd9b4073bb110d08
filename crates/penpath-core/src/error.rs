//! Error types for document operations.

use crate::path::ParseError;
use crate::shapes::ShapeId;
use thiserror::Error;

/// Document errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("Shape is not a path: {0}")]
    NotAPath(ShapeId),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;
