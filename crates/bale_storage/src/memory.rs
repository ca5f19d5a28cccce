//! In-memory storage with a logical clock.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bale_common::SourceFile;

use crate::error::StorageError;
use crate::Storage;

#[derive(Debug, Clone)]
struct MemoryFile {
    contents: Vec<u8>,
    modified: u64,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, MemoryFile>,
    dirs: BTreeSet<String>,
    clock: u64,
    reads: HashMap<String, usize>,
    writes: HashMap<String, usize>,
}

impl MemoryState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn add_dirs(&mut self, path: &str) {
        let mut current = SourceFile::new(path);
        while !matches!(current.path(), "" | "." | "/") {
            self.dirs.insert(current.path().to_string());
            current = SourceFile::new(current.directory());
        }
    }

    fn has_dir(&self, path: &str) -> bool {
        matches!(path, "" | "." | "/") || self.dirs.contains(path)
    }
}

/// Thread-safe in-memory [`Storage`].
///
/// Every write stamps the file with the next tick of a logical clock, so a
/// file written later is always strictly newer than one written earlier.
/// Read and write counters let tests assert which files were touched.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds a file, creating its parent directories. Counts as a write.
    pub fn insert(&self, path: &str, contents: impl AsRef<[u8]>) {
        let mut state = self.state();
        let file = SourceFile::new(path);
        state.add_dirs(file.directory());
        let modified = state.tick();
        state.files.insert(
            file.path().to_string(),
            MemoryFile {
                contents: contents.as_ref().to_vec(),
                modified,
            },
        );
    }

    /// Bumps a file's modification time past everything written so far.
    ///
    /// Returns `false` if the file does not exist.
    pub fn touch(&self, path: &str) -> bool {
        let mut state = self.state();
        let now = state.tick();
        match state.files.get_mut(path) {
            Some(file) => {
                file.modified = now;
                true
            }
            None => false,
        }
    }

    /// Removes a single file. Returns `false` if it did not exist.
    pub fn remove(&self, path: &str) -> bool {
        self.state().files.remove(path).is_some()
    }

    /// Number of successful reads of `path` so far.
    pub fn read_count(&self, path: &str) -> usize {
        self.state().reads.get(path).copied().unwrap_or(0)
    }

    /// Number of successful writes to `path` so far.
    pub fn write_count(&self, path: &str) -> usize {
        self.state().writes.get(path).copied().unwrap_or(0)
    }

    /// All file paths currently stored, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.state().files.keys().cloned().collect()
    }

    /// Returns a file's contents as text, or `None` if missing or not UTF-8.
    pub fn contents(&self, path: &str) -> Option<String> {
        let state = self.state();
        let file = state.files.get(path)?;
        String::from_utf8(file.contents.clone()).ok()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let mut state = self.state();
        let contents = match state.files.get(path) {
            Some(file) => file.contents.clone(),
            None => {
                return Err(StorageError::NotFound {
                    path: path.to_string(),
                })
            }
        };
        *state.reads.entry(path.to_string()).or_default() += 1;
        Ok(contents)
    }

    fn write(&self, path: &str, contents: &[u8]) -> Result<(), StorageError> {
        let mut state = self.state();
        let parent = SourceFile::new(path).directory().to_string();
        if !state.has_dir(&parent) {
            return Err(StorageError::NotFound { path: parent });
        }
        let modified = state.tick();
        state.files.insert(
            path.to_string(),
            MemoryFile {
                contents: contents.to_vec(),
                modified,
            },
        );
        *state.writes.entry(path.to_string()).or_default() += 1;
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.state().files.contains_key(path)
    }

    fn modified_time(&self, path: &str) -> Result<SystemTime, StorageError> {
        let state = self.state();
        let file = state.files.get(path).ok_or_else(|| StorageError::NotFound {
            path: path.to_string(),
        })?;
        Ok(UNIX_EPOCH + Duration::from_secs(file.modified))
    }

    fn make_directories(&self, path: &str) -> Result<(), StorageError> {
        self.state().add_dirs(path);
        Ok(())
    }

    fn remove_directory(&self, path: &str) -> Result<(), StorageError> {
        let mut state = self.state();
        let prefix = format!("{}/", path.trim_end_matches('/'));
        state.files.retain(|p, _| !p.starts_with(&prefix));
        state.dirs.retain(|d| d != path && !d.starts_with(&prefix));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_creates_parents() {
        let storage = MemoryStorage::new();
        storage.insert("src/lib/util.js", "x");
        assert!(storage.exists("src/lib/util.js"));
        storage.write("src/lib/other.js", b"y").unwrap();
        storage.write("src/top.js", b"z").unwrap();
    }

    #[test]
    fn write_requires_parent_directory() {
        let storage = MemoryStorage::new();
        assert!(storage.write("web/app.js", b"x").is_err());
        storage.make_directories("web").unwrap();
        storage.write("web/app.js", b"x").unwrap();
        storage.write("root.js", b"x").unwrap();
    }

    #[test]
    fn later_writes_are_strictly_newer() {
        let storage = MemoryStorage::new();
        storage.insert("a.js", "a");
        storage.insert("b.js", "b");
        let a = storage.modified_time("a.js").unwrap();
        let b = storage.modified_time("b.js").unwrap();
        assert!(b > a);
    }

    #[test]
    fn touch_bumps_modified_time() {
        let storage = MemoryStorage::new();
        storage.insert("a.js", "a");
        storage.insert("b.js", "b");
        assert!(storage.touch("a.js"));
        let a = storage.modified_time("a.js").unwrap();
        let b = storage.modified_time("b.js").unwrap();
        assert!(a > b);
        assert!(!storage.touch("missing.js"));
    }

    #[test]
    fn counters_track_reads_and_writes() {
        let storage = MemoryStorage::new();
        storage.insert("a.js", "a");
        assert_eq!(storage.read_count("a.js"), 0);
        storage.read("a.js").unwrap();
        storage.read("a.js").unwrap();
        assert_eq!(storage.read_count("a.js"), 2);
        storage.write("a.js", b"b").unwrap();
        assert_eq!(storage.write_count("a.js"), 1);
        assert!(storage.read("missing.js").is_err());
        assert_eq!(storage.read_count("missing.js"), 0);
    }

    #[test]
    fn remove_directory_drops_nested_files() {
        let storage = MemoryStorage::new();
        storage.insert("cache/x/a", "a");
        storage.insert("cachex/b", "b");
        storage.remove_directory("cache").unwrap();
        assert_eq!(storage.paths(), vec!["cachex/b".to_string()]);
        assert!(storage.write("cache/x/a", b"a").is_err());
    }

    #[test]
    fn modified_time_if_exists() {
        let storage = MemoryStorage::new();
        assert!(storage.modified_time_if_exists("a.js").unwrap().is_none());
        storage.insert("a.js", "a");
        assert!(storage.modified_time_if_exists("a.js").unwrap().is_some());
    }

    #[test]
    fn read_to_string_rejects_invalid_utf8() {
        let storage = MemoryStorage::new();
        storage.insert("bin", [0xffu8, 0xfe]);
        assert!(matches!(
            storage.read_to_string("bin"),
            Err(StorageError::InvalidUtf8 { .. })
        ));
        assert_eq!(storage.contents("bin"), None);
    }
}
