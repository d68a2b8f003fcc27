//! Error types for storage backends and slot decoding.
//!
//! None of these escape the public store API. Stores log them and fall
//! back to in-memory or default values, so from a UI binding's point of
//! view a failure looks like "nothing was ever saved".

use thiserror::Error;

/// Failure reported by a [`StorageBackend`](crate::host::StorageBackend).
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage is disabled, blocked, or otherwise not reachable.
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },

    /// Persisting the value would exceed the origin's byte quota.
    #[error("quota exceeded writing `{key}`: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// I/O error from a file-backed origin.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a JSON object of strings.
    #[error("corrupt storage file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl StorageError {
    /// Create a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Failure decoding a raw slot value into a typed value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The slot holds something other than a JSON array of strings.
    #[error("malformed id list: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The theme slot holds a literal outside `light`, `dark`, `system`.
    #[error("unrecognized theme preference `{0}`")]
    InvalidPreference(String),
}
