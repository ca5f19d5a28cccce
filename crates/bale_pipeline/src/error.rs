//! Error types for pipeline construction and content transformation.

use bale_storage::StorageError;
use thiserror::Error;

use crate::state::ContentState;

/// The processor set cannot drive every reachable state to completion.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Two processors accept the same state.
    #[error("processors `{first}` and `{second}` both accept {state}")]
    Ambiguous {
        /// The contested state.
        state: ContentState,
        /// The processor registered first.
        first: String,
        /// The processor registered second.
        second: String,
    },

    /// A processor produces a non-terminal state nothing accepts.
    #[error("`{processor}` produces {state}, which no processor accepts")]
    Uncovered {
        /// The processor whose output is stranded.
        processor: String,
        /// The state nothing accepts.
        state: ContentState,
    },
}

/// A processor could not convert an item.
#[derive(Debug, Error)]
pub enum TransformError {
    /// No processor accepts the item's current state.
    #[error("no processor accepts {state}")]
    Unsupported {
        /// The state that has no processor.
        state: ContentState,
    },

    /// The item would return to a state it already held.
    #[error("processing loops back to {state}")]
    Cycle {
        /// The repeated state.
        state: ContentState,
    },

    /// The item is already processed.
    #[error("content is already processed")]
    AlreadyProcessed,

    /// An external program could not be started or fed.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        /// The program that was run.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An external program exited unsuccessfully.
    #[error("`{program}` exited with {status}:\n{stderr}")]
    Command {
        /// The program that was run.
        program: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Everything the program wrote to stderr.
        stderr: String,
    },

    /// An external program printed output that is not UTF-8.
    #[error("`{program}` produced output that is not valid UTF-8")]
    InvalidOutput {
        /// The program that was run.
        program: String,
    },
}

/// A file could not be transpiled.
#[derive(Debug, Error)]
pub enum TranspileError {
    /// The pipeline failed on the file.
    #[error("failed to transpile {file}: {source}")]
    Transform {
        /// The file being transpiled.
        file: String,
        /// The pipeline failure.
        #[source]
        source: TransformError,
    },

    /// A transpiler reported diagnostics instead of output.
    #[error("failed to transpile {file}:\n{diagnostics}")]
    Diagnostics {
        /// The file being transpiled.
        file: String,
        /// Collected diagnostic output.
        diagnostics: String,
    },

    /// The file could not be read.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TranspileError {
    /// The diagnostic text to show for this failure.
    pub fn diagnostics(&self) -> String {
        match self {
            TranspileError::Transform {
                source: TransformError::Command { stderr, .. },
                ..
            } => stderr.clone(),
            TranspileError::Transform { source, .. } => source.to_string(),
            TranspileError::Diagnostics { diagnostics, .. } => diagnostics.clone(),
            TranspileError::Storage(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_display() {
        let err = PipelineError::Ambiguous {
            state: ContentState::unprocessed("ts"),
            first: "tsc".to_string(),
            second: "swc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "processors `tsc` and `swc` both accept unprocessed .ts"
        );
    }

    #[test]
    fn command_error_diagnostics_are_stderr() {
        let err = TranspileError::Transform {
            file: "app.ts".to_string(),
            source: TransformError::Command {
                program: "tsc".to_string(),
                status: "exit status: 2".to_string(),
                stderr: "app.ts(1,1): error TS1005".to_string(),
            },
        };
        assert_eq!(err.diagnostics(), "app.ts(1,1): error TS1005");
        assert!(err.to_string().starts_with("failed to transpile app.ts"));
    }

    #[test]
    fn diagnostics_variant() {
        let err = TranspileError::Diagnostics {
            file: "main.less".to_string(),
            diagnostics: "unexpected }".to_string(),
        };
        assert_eq!(err.diagnostics(), "unexpected }");
    }
}
