//! Error types for storage operations.

/// Errors raised by a [`Storage`](crate::Storage) adapter.
///
/// Storage failures are fatal to the current build step and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// An I/O error occurred while accessing a path.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The logical path that caused the error.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// The logical path that was requested.
        path: String,
    },

    /// The file content is not valid UTF-8.
    #[error("file is not valid UTF-8: {path}")]
    InvalidUtf8 {
        /// The logical path of the file.
        path: String,
    },
}

impl StorageError {
    /// Wraps an I/O error, mapping `NotFound` onto [`StorageError::NotFound`].
    pub fn from_io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound { path }
        } else {
            StorageError::Io { path, source }
        }
    }
}
