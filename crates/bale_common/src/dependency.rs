//! Edges from an entry point to the files it requires.

use serde::{Deserialize, Serialize};

use crate::file::SourceFile;

/// An edge from an entry point to a required file.
///
/// A *virtual* dependency resolves outside the file system (an external or
/// global symbol). It is kept for bookkeeping but never read, transpiled or
/// wrapped. A *static* dependency is an asset that gets compiled to its own
/// output file instead of being concatenated into a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// The referenced file.
    #[serde(rename = "path")]
    pub file: SourceFile,
    /// Whether the reference resolves outside the file system.
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    /// Whether the file is a standalone asset.
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

impl Dependency {
    /// A regular, on-disk dependency.
    pub fn new(file: impl Into<SourceFile>) -> Self {
        Self {
            file: file.into(),
            is_virtual: false,
            is_static: false,
        }
    }

    /// A dependency that resolves outside the file system.
    pub fn virtual_ref(file: impl Into<SourceFile>) -> Self {
        Self {
            is_virtual: true,
            ..Self::new(file)
        }
    }

    /// A standalone asset dependency.
    pub fn static_asset(file: impl Into<SourceFile>) -> Self {
        Self {
            is_static: true,
            ..Self::new(file)
        }
    }

    /// Returns `true` if the file lives in a third-party package directory.
    pub fn is_vendor(&self) -> bool {
        let path = self.file.path();
        path.starts_with("node_modules/") || path.contains("/node_modules/")
    }
}
