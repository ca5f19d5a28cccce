//! Storage backed by the local file system.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bale_common::is_absolute_path;

use crate::error::StorageError;
use crate::Storage;

/// Local disk storage rooted at a working directory.
///
/// Relative logical paths are resolved against the root; absolute paths are
/// used as-is. Writes go through a temporary sibling file that is renamed
/// into place, so readers never observe a half-written output or cache record.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Creates a storage adapter rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The working directory relative paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a logical path to a host path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        if is_absolute_path(path) {
            PathBuf::from(path)
        } else {
            self.root.join(path)
        }
    }
}

impl Storage for LocalStorage {
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        std::fs::read(self.resolve(path)).map_err(|e| StorageError::from_io(path, e))
    }

    fn write(&self, path: &str, contents: &[u8]) -> Result<(), StorageError> {
        let target = self.resolve(path);
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => self.root.clone(),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&parent)
            .map_err(|e| StorageError::from_io(path, e))?;
        tmp.write_all(contents)
            .map_err(|e| StorageError::from_io(path, e))?;
        tmp.persist(&target)
            .map_err(|e| StorageError::from_io(path, e.error))?;
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn modified_time(&self, path: &str) -> Result<SystemTime, StorageError> {
        std::fs::metadata(self.resolve(path))
            .and_then(|m| m.modified())
            .map_err(|e| StorageError::from_io(path, e))
    }

    fn make_directories(&self, path: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(self.resolve(path)).map_err(|e| StorageError::from_io(path, e))
    }

    fn remove_directory(&self, path: &str) -> Result<(), StorageError> {
        match std::fs::remove_dir_all(self.resolve(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        (dir, storage)
    }

    #[test]
    fn write_and_read_relative() {
        let (dir, storage) = make_storage();
        storage.write("app.js", b"console.log(1);").unwrap();
        assert_eq!(storage.read("app.js").unwrap(), b"console.log(1);");
        assert!(dir.path().join("app.js").exists());
    }

    #[test]
    fn write_overwrites() {
        let (_dir, storage) = make_storage();
        storage.write("app.js", b"old").unwrap();
        storage.write("app.js", b"new").unwrap();
        assert_eq!(storage.read_to_string("app.js").unwrap(), "new");
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let (_dir, storage) = make_storage();
        assert!(storage.write("missing/app.js", b"x").is_err());
    }

    #[test]
    fn make_directories_then_write() {
        let (_dir, storage) = make_storage();
        storage.make_directories("web/dist/css").unwrap();
        storage.write("web/dist/css/main.css", b"body{}").unwrap();
        assert!(storage.exists("web/dist/css/main.css"));
    }

    #[test]
    fn absolute_paths_bypass_root() {
        let (_dir, storage) = make_storage();
        let other = tempfile::tempdir().unwrap();
        let abs = other.path().join("abs.js");
        let abs = abs.to_str().unwrap();
        storage.write(abs, b"abs").unwrap();
        assert_eq!(storage.read(abs).unwrap(), b"abs");
    }

    #[test]
    fn read_missing_is_not_found() {
        let (_dir, storage) = make_storage();
        let err = storage.read("nope.js").unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn modified_time_if_exists_missing_is_none() {
        let (_dir, storage) = make_storage();
        assert!(storage.modified_time_if_exists("nope.js").unwrap().is_none());
        storage.write("yes.js", b"").unwrap();
        assert!(storage.modified_time_if_exists("yes.js").unwrap().is_some());
    }

    #[test]
    fn remove_directory_is_recursive_and_idempotent() {
        let (_dir, storage) = make_storage();
        storage.make_directories("cache/nested").unwrap();
        storage.write("cache/nested/record", b"x").unwrap();
        storage.remove_directory("cache").unwrap();
        assert!(!storage.exists("cache/nested/record"));
        storage.remove_directory("cache").unwrap();
    }
}
