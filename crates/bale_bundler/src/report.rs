//! Build summaries.

use serde::Serialize;

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStatus {
    /// The output was regenerated and written.
    Written,
    /// The output was up to date and left alone.
    Fresh,
}

/// One output file and its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    /// Logical output path.
    pub path: String,
    /// Whether it was written.
    pub status: OutputStatus,
    /// Why it was regenerated, for written outputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One compiled input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Logical source path.
    pub path: String,
    /// Whether the compiled content came from the cache.
    pub from_cache: bool,
}

/// Summary of a `bundle` or `compile` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Every output considered, in processing order.
    pub outputs: Vec<OutputRecord>,
    /// Every file compiled for a written output, in processing order.
    pub files: Vec<FileRecord>,
}

impl BuildReport {
    pub(crate) fn fresh(path: &str) -> Self {
        Self {
            outputs: vec![OutputRecord {
                path: path.to_string(),
                status: OutputStatus::Fresh,
                reason: None,
            }],
            files: Vec::new(),
        }
    }

    /// Appends another report.
    pub fn merge(&mut self, other: BuildReport) {
        self.outputs.extend(other.outputs);
        self.files.extend(other.files);
    }

    /// Outputs that were written.
    pub fn written(&self) -> impl Iterator<Item = &OutputRecord> {
        self.outputs
            .iter()
            .filter(|o| o.status == OutputStatus::Written)
    }

    /// Number of files that had to be transpiled.
    pub fn transpiled(&self) -> usize {
        self.files.iter().filter(|f| !f.from_cache).count()
    }

    /// Number of files served from the cache.
    pub fn cached(&self) -> usize {
        self.files.iter().filter(|f| f.from_cache).count()
    }
}
