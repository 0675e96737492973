//! Compaction errors
//!
//! Raised at the pack/unpack call site. A failed entity must be treated as
//! unwritable (or unreadable) as a whole; there is no partial pack.

use thiserror::Error;

/// Result type for compaction operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Field and structure packing errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// No value (or an explicit null) for a non-nullable attribute
    #[error("attribute '{attribute}' is not nullable but no value was supplied")]
    NullValue { attribute: String },

    /// Value does not match the attribute's declared type
    #[error("attribute '{attribute}': expected {expected}, got {actual}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        actual: String,
    },

    /// Packed sequence does not have the expected shape
    #[error("malformed packed value: {reason}")]
    MalformedPacked { reason: String },
}

impl TransformError {
    pub(crate) fn mismatch(
        attribute: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            attribute: attribute.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPacked {
            reason: reason.into(),
        }
    }
}
