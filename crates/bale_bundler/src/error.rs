//! Error types for bundling.

use bale_cache::CacheError;
use bale_pipeline::TranspileError;
use bale_storage::StorageError;
use thiserror::Error;

/// The import graph of a file could not be resolved.
#[derive(Debug, Error)]
#[error("cannot resolve imports of {file}: {reason}")]
pub struct ResolveError {
    /// The file whose imports were requested.
    pub file: String,
    /// What went wrong.
    pub reason: String,
}

/// Errors that stop an entry point or asset from being built.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Import resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A dependency failed to transpile.
    #[error(transparent)]
    Transpile(#[from] TranspileError),

    /// A cache record could not be read or written.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// An output could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Two entry points would write the same output file.
    #[error("entry points {first} and {second} both write {output}")]
    OutputConflict {
        /// The shared output path.
        output: String,
        /// The entry point seen first.
        first: String,
        /// The entry point seen second.
        second: String,
    },

    /// The dependency graph file is malformed.
    #[error("invalid dependency graph {path}: {reason}")]
    Graph {
        /// Path of the graph file.
        path: String,
        /// Parser message.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_display() {
        let err = BundleError::from(ResolveError {
            file: "app.ts".to_string(),
            reason: "not in graph".to_string(),
        });
        assert_eq!(err.to_string(), "cannot resolve imports of app.ts: not in graph");
    }

    #[test]
    fn conflict_display() {
        let err = BundleError::OutputConflict {
            output: "web/dist/app.js".to_string(),
            first: "a/app.ts".to_string(),
            second: "b/app.ts".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "entry points a/app.ts and b/app.ts both write web/dist/app.js"
        );
    }

    #[test]
    fn storage_error_converts() {
        let err: BundleError = StorageError::NotFound {
            path: "web".to_string(),
        }
        .into();
        assert!(matches!(err, BundleError::Storage(_)));
    }
}
