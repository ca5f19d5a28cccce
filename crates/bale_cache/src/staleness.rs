//! Staleness checks: source-set differences and modification times.

use std::fmt;

use bale_common::SourceFile;
use bale_storage::{Storage, StorageError};

/// Difference between the inputs recorded for an output and the current ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSetDiff {
    /// Inputs present now but not in the record.
    pub added: Vec<String>,
    /// Inputs in the record but no longer present.
    pub removed: Vec<String>,
}

impl SourceSetDiff {
    /// Computes the symmetric difference of two input lists.
    ///
    /// Both sides are treated as sets; the results are sorted.
    pub fn between(recorded: &[String], current: &[String]) -> Self {
        let mut added: Vec<String> = current
            .iter()
            .filter(|p| !recorded.contains(*p))
            .cloned()
            .collect();
        let mut removed: Vec<String> = recorded
            .iter()
            .filter(|p| !current.contains(*p))
            .cloned()
            .collect();
        added.sort();
        added.dedup();
        removed.sort();
        removed.dedup();
        Self { added, removed }
    }

    /// Returns `true` if both sets are equal.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Why an output has to be regenerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// No source-set record exists for the output yet.
    NoSourceRecord,
    /// The source-set record could not be read back.
    CorruptSourceRecord,
    /// The set of inputs differs from the recorded one.
    SourcesChanged(SourceSetDiff),
    /// The output file does not exist.
    OutputMissing,
    /// An input was modified after the output was written.
    InputNewer(String),
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::NoSourceRecord => f.write_str("no source record"),
            StaleReason::CorruptSourceRecord => f.write_str("unreadable source record"),
            StaleReason::SourcesChanged(diff) => write!(
                f,
                "sources changed (+{} -{})",
                diff.added.len(),
                diff.removed.len()
            ),
            StaleReason::OutputMissing => f.write_str("output missing"),
            StaleReason::InputNewer(path) => write!(f, "{path} is newer than the output"),
        }
    }
}

/// Timestamp check: `output` is stale if it does not exist or if any input
/// was modified strictly after it.
///
/// Inputs must exist; a missing input is a storage error.
pub fn check_timestamps<'a>(
    storage: &dyn Storage,
    output: &str,
    inputs: impl IntoIterator<Item = &'a SourceFile>,
) -> Result<Option<StaleReason>, StorageError> {
    let Some(output_time) = storage.modified_time_if_exists(output)? else {
        return Ok(Some(StaleReason::OutputMissing));
    };
    for input in inputs {
        if storage.modified_time(input.path())? > output_time {
            return Ok(Some(StaleReason::InputNewer(input.path().to_string())));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bale_storage::MemoryStorage;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn diff_equal_sets_is_empty() {
        let diff = SourceSetDiff::between(&strings(&["a", "b"]), &strings(&["b", "a"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn diff_added_and_removed() {
        let diff = SourceSetDiff::between(&strings(&["a", "b"]), &strings(&["b", "c"]));
        assert_eq!(diff.added, vec!["c"]);
        assert_eq!(diff.removed, vec!["a"]);
        assert!(!diff.is_empty());
    }

    #[test]
    fn diff_swap_keeps_size() {
        let diff = SourceSetDiff::between(&strings(&["a", "b"]), &strings(&["a", "x"]));
        assert_eq!(diff.added, vec!["x"]);
        assert_eq!(diff.removed, vec!["b"]);
    }

    #[test]
    fn timestamps_missing_output() {
        let storage = MemoryStorage::new();
        storage.insert("a.js", "a");
        let inputs = [SourceFile::new("a.js")];
        let reason = check_timestamps(&storage, "web/app.js", &inputs).unwrap();
        assert_eq!(reason, Some(StaleReason::OutputMissing));
    }

    #[test]
    fn timestamps_fresh_output() {
        let storage = MemoryStorage::new();
        storage.insert("a.js", "a");
        storage.insert("web/app.js", "out");
        let inputs = [SourceFile::new("a.js")];
        assert_eq!(check_timestamps(&storage, "web/app.js", &inputs).unwrap(), None);
    }

    #[test]
    fn timestamps_newer_input() {
        let storage = MemoryStorage::new();
        storage.insert("a.js", "a");
        storage.insert("b.js", "b");
        storage.insert("web/app.js", "out");
        storage.touch("b.js");
        let inputs = [SourceFile::new("a.js"), SourceFile::new("b.js")];
        let reason = check_timestamps(&storage, "web/app.js", &inputs).unwrap();
        assert_eq!(reason, Some(StaleReason::InputNewer("b.js".to_string())));
    }

    #[test]
    fn timestamps_missing_input_errors() {
        let storage = MemoryStorage::new();
        storage.insert("web/app.js", "out");
        let inputs = [SourceFile::new("gone.js")];
        assert!(check_timestamps(&storage, "web/app.js", &inputs).is_err());
    }

    #[test]
    fn reason_display() {
        let diff = SourceSetDiff {
            added: strings(&["x"]),
            removed: vec![],
        };
        assert_eq!(
            StaleReason::SourcesChanged(diff).to_string(),
            "sources changed (+1 -0)"
        );
        assert_eq!(
            StaleReason::InputNewer("a.js".to_string()).to_string(),
            "a.js is newer than the output"
        );
    }
}
