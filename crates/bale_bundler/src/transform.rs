//! Content transforms applied around transpilation.

use bale_common::SourceFile;

/// Hooks that rewrite content after transpiling and before writing.
///
/// `output_folder` is the configured output subfolder, for transforms that
/// rewrite URLs relative to it.
pub trait Transformer: Send + Sync {
    /// Runs on one file's freshly transpiled content. The result is what gets
    /// cached.
    fn on_post_transpile(&self, output_file: &SourceFile, content: String, output_folder: &str) -> String;

    /// Runs on a whole output right before it is written.
    fn on_pre_write(&self, output_file: &SourceFile, content: String, output_folder: &str) -> String;
}

/// A [`Transformer`] that returns content unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransformer;

impl Transformer for NoopTransformer {
    fn on_post_transpile(&self, _output_file: &SourceFile, content: String, _output_folder: &str) -> String {
        content
    }

    fn on_pre_write(&self, _output_file: &SourceFile, content: String, _output_folder: &str) -> String {
        content
    }
}
