//! Import graph discovery.

use std::collections::BTreeMap;

use bale_common::{Dependency, SourceFile};
use bale_storage::Storage;

use crate::error::{BundleError, ResolveError};

/// Produces the ordered, transitive dependency list of a file.
pub trait ImportFinder: Send + Sync {
    /// Every file `file` needs, in bundle order, tagged virtual or static
    /// where applicable.
    fn resolve_all(&self, file: &SourceFile) -> Result<Vec<Dependency>, ResolveError>;
}

/// An [`ImportFinder`] backed by a pre-computed dependency graph.
///
/// The graph is a JSON object mapping each file to its dependency list:
///
/// ```json
/// {
///   "src/app.ts": [
///     { "path": "node_modules/jquery/jquery.js" },
///     { "path": "window", "virtual": true },
///     { "path": "src/app.less", "static": true },
///     { "path": "src/app.ts" }
///   ]
/// }
/// ```
///
/// A file missing from the graph has no dependencies besides itself.
#[derive(Debug, Clone, Default)]
pub struct JsonGraphFinder {
    graph: BTreeMap<String, Vec<Dependency>>,
}

impl JsonGraphFinder {
    /// Parses a graph from JSON text.
    pub fn from_json(path: &str, json: &str) -> Result<Self, BundleError> {
        let graph: BTreeMap<String, Vec<Dependency>> =
            serde_json::from_str(json).map_err(|e| BundleError::Graph {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        // Keys are normalized the same way as `SourceFile` paths.
        let graph = graph
            .into_iter()
            .map(|(key, deps)| (SourceFile::new(key).path().to_string(), deps))
            .collect();
        Ok(Self { graph })
    }

    /// Reads and parses the graph file at `path`.
    pub fn load(storage: &dyn Storage, path: &str) -> Result<Self, BundleError> {
        let json = storage.read_to_string(path)?;
        Self::from_json(path, &json)
    }

    /// Number of files with a recorded dependency list.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Returns `true` if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

impl ImportFinder for JsonGraphFinder {
    fn resolve_all(&self, file: &SourceFile) -> Result<Vec<Dependency>, ResolveError> {
        match self.graph.get(file.path()) {
            Some(deps) => Ok(deps.clone()),
            None => {
                tracing::debug!(file = %file, "not in dependency graph, resolving to itself");
                Ok(vec![Dependency::new(file.clone())])
            }
        }
    }
}
