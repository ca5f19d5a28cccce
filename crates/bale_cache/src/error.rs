//! Error types for cache operations.

use bale_storage::StorageError;

/// Errors that can occur during cache operations.
///
/// Record validation failures ([`InvalidHeader`](Self::InvalidHeader),
/// [`ChecksumMismatch`](Self::ChecksumMismatch),
/// [`VersionMismatch`](Self::VersionMismatch) and
/// [`Serialization`](Self::Serialization) on read) are reported as errors by
/// the record store; the [`Cache`](crate::Cache) treats them as stale entries.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The storage adapter failed while reading or writing a record.
    #[error("cache storage error: {0}")]
    Storage(#[from] StorageError),

    /// A record has an invalid or missing header.
    #[error("invalid cache record header in {path}: {reason}")]
    InvalidHeader {
        /// The record path.
        path: String,
        /// Description of the header problem.
        reason: String,
    },

    /// The stored checksum does not match the computed checksum of the payload.
    #[error("checksum mismatch in {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The record path.
        path: String,
        /// The expected checksum from the header.
        expected: String,
        /// The actual checksum computed from the payload.
        actual: String,
    },

    /// The record format version does not match the current version.
    #[error("version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The record path.
        path: String,
        /// The expected format version.
        expected: u32,
        /// The actual format version found in the record.
        actual: u32,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error in {path}: {reason}")]
    Serialization {
        /// The record path.
        path: String,
        /// Description of the serialization failure.
        reason: String,
    },
}

impl CacheError {
    /// Returns `true` if the error means a record exists but cannot be trusted.
    pub fn is_corruption(&self) -> bool {
        !matches!(self, CacheError::Storage(_))
    }
}
