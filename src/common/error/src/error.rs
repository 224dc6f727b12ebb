//! Core error types for hyperlex.

use thiserror::Error;

/// Result type alias using `HyperlexError`.
pub type HyperlexResult<T> = std::result::Result<T, HyperlexError>;

/// Core error type for hyperlex operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HyperlexError {
    /// Reference to an absent node or hyperedge id.
    #[error("NotFound: {0}")]
    NotFound(String),

    /// Re-adding an id that already exists.
    #[error("DuplicateId: {0}")]
    DuplicateId(String),

    /// Malformed input: undersized hyperedge, non-monotonic timestamp, bad weight.
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),

    /// Embeddings of differing length passed to the same computation.
    #[error("DimensionMismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Length the computation was expecting.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Configuration value outside its documented range.
    #[error("InvalidConfig: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl HyperlexError {
    /// Create a new `NotFound` error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new `DuplicateId` error.
    pub fn duplicate_id<S: Into<String>>(msg: S) -> Self {
        Self::DuplicateId(msg.into())
    }

    /// Create a new `InvalidArgument` error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new `DimensionMismatch` error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create a new `InvalidConfig` error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether this error reports a missing id.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Ensure a condition holds, returning an `InvalidArgument` error if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::HyperlexError::$variant(format!($($msg)*)));
        }
    };
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::HyperlexError::InvalidArgument($msg.to_string()));
        }
    };
}

/// Return early with a `NotFound` error.
#[macro_export]
macro_rules! not_found_err {
    ($($arg:tt)*) => {
        return Err($crate::HyperlexError::NotFound(format!($($arg)*)))
    };
}
