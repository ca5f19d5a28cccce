//! The explicit build context threaded through every operation.
//!
//! Root paths and the development flag live in a [`BuildContext`] value
//! rather than in process-wide state, so two builds with different roots can
//! run side by side in one process.

use std::path::PathBuf;

use bale_common::{join_path, SourceFile};

use crate::types::ProjectConfig;

/// Command-line overrides applied on top of `bale.toml`.
#[derive(Debug, Default, Clone)]
pub struct ContextOverrides {
    /// Forces development mode on or off.
    pub dev: Option<bool>,
    /// Replaces the configured cache directory.
    pub cache_dir: Option<String>,
}

/// Resolved roots, flags and inputs of one build invocation.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Working directory that relative paths are resolved against.
    pub cwd: PathBuf,
    /// The public web root.
    pub web_root: String,
    /// Subfolder of the web root for generated files.
    pub output_folder: String,
    /// Optional prefix for entry point and asset names.
    pub source_root: Option<String>,
    /// Directory holding compute cache records.
    pub cache_dir: String,
    /// Pre-computed dependency graph file.
    pub graph: String,
    /// Development mode flag.
    pub dev: bool,
    /// Entry point names, relative to the source root.
    pub entry_points: Vec<String>,
    /// Standalone asset names, relative to the source root.
    pub asset_files: Vec<String>,
}

impl BuildContext {
    /// Creates a context with default paths and no inputs.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        let paths = crate::types::PathsConfig::default();
        Self {
            cwd: cwd.into(),
            web_root: paths.web_root,
            output_folder: paths.output_folder,
            source_root: paths.source_root,
            cache_dir: paths.cache_dir,
            graph: paths.graph,
            dev: false,
            entry_points: Vec::new(),
            asset_files: Vec::new(),
        }
    }

    /// Resolves a loaded configuration into a context rooted at `cwd`.
    pub fn from_config(
        cwd: impl Into<PathBuf>,
        config: &ProjectConfig,
        overrides: &ContextOverrides,
    ) -> Self {
        let paths = &config.paths;
        Self {
            cwd: cwd.into(),
            web_root: paths.web_root.clone(),
            output_folder: paths.output_folder.clone(),
            source_root: paths
                .source_root
                .clone()
                .filter(|root| !root.trim_matches('/').is_empty()),
            cache_dir: overrides
                .cache_dir
                .clone()
                .unwrap_or_else(|| paths.cache_dir.clone()),
            graph: paths.graph.clone(),
            dev: overrides.dev.unwrap_or(config.build.dev),
            entry_points: config.build.entry_points.clone(),
            asset_files: config.build.assets.clone(),
        }
    }

    /// Sets the development flag.
    pub fn with_dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    /// The folder outputs are written to: `<web_root>/<output_folder>`.
    pub fn output_root(&self) -> String {
        join_path(&self.web_root, self.output_folder.trim_matches('/'))
    }

    /// Resolves an entry point or asset name against the source root.
    pub fn source_file(&self, name: &str) -> SourceFile {
        match &self.source_root {
            Some(root) => SourceFile::new(join_path(root, name)),
            None => SourceFile::new(name),
        }
    }

    /// The directory of `file` relative to the source root, without leading
    /// or trailing slashes. Root-level files yield `""`.
    pub fn relative_directory(&self, file: &SourceFile) -> String {
        let dir = file.directory();
        if dir == "." {
            return String::new();
        }
        let relative = match self.source_root.as_deref().map(|r| r.trim_end_matches('/')) {
            Some(root) if dir == root => "",
            Some(root) => dir
                .strip_prefix(root)
                .filter(|rest| rest.starts_with('/'))
                .unwrap_or(dir),
            None => dir,
        };
        relative.trim_matches('/').to_string()
    }

    /// Path of a cache record inside the cache directory.
    pub fn cache_path(&self, key: &str) -> String {
        join_path(&self.cache_dir, key)
    }
}
