//! Error types for scholar-vector.

use thiserror::Error;

/// Result type for scholar-vector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying an index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Dimension mismatch between a vector and the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions.
        expected: usize,
        /// Actual dimensions provided.
        actual: usize,
    },

    /// Invalid vector (empty or containing NaN/inf).
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Number of vectors and payloads differ in a batch insert.
    #[error("Batch length mismatch: {vectors} vectors for {payloads} payloads")]
    BatchMismatch {
        /// Vectors supplied.
        vectors: usize,
        /// Payloads supplied.
        payloads: usize,
    },
}
