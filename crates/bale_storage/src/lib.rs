//! Storage adapter for the bale bundler.
//!
//! Every file the engine touches (sources, cache records, outputs) goes
//! through the [`Storage`] trait. [`LocalStorage`] resolves logical paths
//! against a working directory; [`MemoryStorage`] keeps everything in memory
//! with a logical clock so timestamp-based staleness is deterministic in tests.

#![warn(missing_docs)]

pub mod error;
pub mod local;
pub mod memory;

use std::time::SystemTime;

pub use error::StorageError;
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Minimal file I/O interface consumed by the cache and the bundler.
///
/// Paths are logical, `/`-separated, and relative to the adapter's working
/// directory unless absolute.
pub trait Storage: Send + Sync {
    /// Reads the full contents of a file.
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Replaces the contents of a file. Parent directories must exist.
    fn write(&self, path: &str, contents: &[u8]) -> Result<(), StorageError>;

    /// Returns `true` if a file exists at the path.
    fn exists(&self, path: &str) -> bool;

    /// Returns the last modification time of a file.
    fn modified_time(&self, path: &str) -> Result<SystemTime, StorageError>;

    /// Creates a directory and all missing parents.
    fn make_directories(&self, path: &str) -> Result<(), StorageError>;

    /// Removes a directory and everything below it. Missing directories are not an error.
    fn remove_directory(&self, path: &str) -> Result<(), StorageError>;

    /// Returns the modification time, or `None` if the file does not exist.
    fn modified_time_if_exists(&self, path: &str) -> Result<Option<SystemTime>, StorageError> {
        if !self.exists(path) {
            return Ok(None);
        }
        self.modified_time(path).map(Some)
    }

    /// Reads a file as UTF-8 text.
    fn read_to_string(&self, path: &str) -> Result<String, StorageError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| StorageError::InvalidUtf8 {
            path: path.to_string(),
        })
    }
}
