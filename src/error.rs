//! Error types for Cadena operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Cadena operations.
///
/// Provides detailed context about failures including shape mismatches,
/// unrepresentable dtypes, malformed documents, and backend transfers.
///
/// # Examples
///
/// ```
/// use cadena::error::CadenaError;
///
/// let err = CadenaError::ShapeMismatch {
///     expected: "1x2x3x4 = 24 values".to_string(),
///     actual: "20 values".to_string(),
/// };
/// assert!(err.to_string().contains("shape mismatch"));
/// ```
#[derive(Debug)]
pub enum CadenaError {
    /// Flattened value count does not match the triangle's dimensions.
    ShapeMismatch {
        /// Expected shape description
        expected: String,
        /// Actual shape found
        actual: String,
    },

    /// A recorded dtype cannot represent the decoded values losslessly.
    DtypeMismatch {
        /// Document field being decoded
        field: String,
        /// Recorded dtype string
        dtype: String,
        /// What went wrong
        detail: String,
    },

    /// A document is missing a required field, has a field of the wrong
    /// type, or carries an unknown sparse/dense tag.
    Schema {
        /// Document field at fault
        field: String,
        /// Expected vs. observed description
        detail: String,
    },

    /// Host materialization of a backend-resident array failed.
    BackendTransfer {
        /// Backend name (e.g., "device")
        backend: String,
        /// Transfer failure details
        detail: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error from an underlying codec.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for CadenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CadenaError::ShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "Triangle shape mismatch: expected {expected}, got {actual}"
                )
            }
            CadenaError::DtypeMismatch {
                field,
                dtype,
                detail,
            } => {
                write!(f, "Dtype mismatch in '{field}' (dtype '{dtype}'): {detail}")
            }
            CadenaError::Schema { field, detail } => {
                write!(f, "Malformed document at '{field}': {detail}")
            }
            CadenaError::BackendTransfer { backend, detail } => {
                write!(f, "Backend transfer failed ({backend}): {detail}")
            }
            CadenaError::Io(e) => write!(f, "I/O error: {e}"),
            CadenaError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            CadenaError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CadenaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CadenaError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CadenaError {
    fn from(err: std::io::Error) -> Self {
        CadenaError::Io(err)
    }
}

impl From<serde_json::Error> for CadenaError {
    fn from(err: serde_json::Error) -> Self {
        CadenaError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for CadenaError {
    fn from(err: bincode::Error) -> Self {
        CadenaError::Serialization(err.to_string())
    }
}

impl From<&str> for CadenaError {
    fn from(msg: &str) -> Self {
        CadenaError::Other(msg.to_string())
    }
}

impl From<String> for CadenaError {
    fn from(msg: String) -> Self {
        CadenaError::Other(msg)
    }
}

impl CadenaError {
    /// Create a schema error with field context.
    #[must_use]
    pub fn schema(field: &str, detail: impl Into<String>) -> Self {
        Self::Schema {
            field: field.to_string(),
            detail: detail.into(),
        }
    }
}

/// Result type alias for Cadena operations.
pub type Result<T> = std::result::Result<T, CadenaError>;
