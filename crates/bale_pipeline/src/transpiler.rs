//! The transpile interface and its pipeline-backed implementation.

use std::sync::Arc;

use bale_common::SourceFile;
use bale_storage::Storage;

use crate::error::TranspileError;
use crate::pipeline::Pipeline;
use crate::state::ContentItem;

/// The result of transpiling one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileResult {
    /// Logical module name used when wrapping.
    pub module_name: String,
    /// Terminal content.
    pub content: String,
}

/// Converts one source file into its output language.
pub trait Transpiler: Send + Sync {
    /// The extension `file` has once transpiled, without the dot.
    fn extension_for(&self, file: &SourceFile) -> String;

    /// Transpiles `file`.
    fn transpile(&self, file: &SourceFile) -> Result<TranspileResult, TranspileError>;
}

/// A [`Transpiler`] that reads files through storage and runs them through a
/// [`Pipeline`].
pub struct PipelineTranspiler {
    pipeline: Pipeline,
    storage: Arc<dyn Storage>,
}

impl PipelineTranspiler {
    /// Creates a transpiler.
    pub fn new(pipeline: Pipeline, storage: Arc<dyn Storage>) -> Self {
        Self { pipeline, storage }
    }

    /// The underlying pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl Transpiler for PipelineTranspiler {
    /// Files no processor accepts keep their own extension; transpiling them
    /// fails later with the pipeline's error.
    fn extension_for(&self, file: &SourceFile) -> String {
        match self.pipeline.peek(file) {
            Ok(state) => state.extension().to_string(),
            Err(_) => file.extension().to_string(),
        }
    }

    fn transpile(&self, file: &SourceFile) -> Result<TranspileResult, TranspileError> {
        let content = self.storage.read_to_string(file.path())?;
        let mut item = ContentItem::new(file.clone(), content);
        self.pipeline
            .run(&mut item)
            .map_err(|source| TranspileError::Transform {
                file: file.path().to_string(),
                source,
            })?;
        Ok(TranspileResult {
            module_name: file.with_extension("").path().to_string(),
            content: item.into_content(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bale_storage::MemoryStorage;

    fn make_transpiler() -> (Arc<MemoryStorage>, PipelineTranspiler) {
        let storage = Arc::new(MemoryStorage::new());
        let transpiler = PipelineTranspiler::new(Pipeline::builtin(), storage.clone());
        (storage, transpiler)
    }

    #[test]
    fn extension_for_json_is_js() {
        let (_storage, transpiler) = make_transpiler();
        assert_eq!(transpiler.extension_for(&SourceFile::new("a/b.json")), "js");
        assert_eq!(transpiler.extension_for(&SourceFile::new("a/b.css")), "css");
    }

    #[test]
    fn extension_for_unknown_keeps_own() {
        let (_storage, transpiler) = make_transpiler();
        assert_eq!(transpiler.extension_for(&SourceFile::new("logo.png")), "png");
    }

    #[test]
    fn transpile_names_module_without_extension() {
        let (storage, transpiler) = make_transpiler();
        storage.insert("src/data.json", "{\"x\": true}");
        let result = transpiler.transpile(&SourceFile::new("src/data.json")).unwrap();
        assert_eq!(result.module_name, "src/data");
        assert_eq!(result.content, "return {\"x\": true};\n");
    }

    #[test]
    fn transpile_root_level_module_name() {
        let (storage, transpiler) = make_transpiler();
        storage.insert("app.js", "console.log(1);");
        let result = transpiler.transpile(&SourceFile::new("app.js")).unwrap();
        assert_eq!(result.module_name, "app");
    }

    #[test]
    fn transpile_missing_file_is_storage_error() {
        let (_storage, transpiler) = make_transpiler();
        let err = transpiler.transpile(&SourceFile::new("nope.js")).unwrap_err();
        assert!(matches!(err, TranspileError::Storage(_)));
    }

    #[test]
    fn transpile_unsupported_is_transform_error() {
        let (storage, transpiler) = make_transpiler();
        storage.insert("logo.png", "PNG");
        let err = transpiler.transpile(&SourceFile::new("logo.png")).unwrap_err();
        assert!(matches!(err, TranspileError::Transform { .. }));
    }
}
