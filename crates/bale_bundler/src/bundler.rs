//! The bundle assembler and the standalone asset compiler.

use std::collections::HashMap;
use std::sync::Arc;

use bale_cache::{cache_key, sources_key, Cache, CacheStatus, CompiledRecord};
use bale_common::{join_path, Dependency, SourceFile};
use bale_config::BuildContext;
use bale_pipeline::Transpiler;
use bale_storage::Storage;
use rayon::prelude::*;

use crate::entry_point::{real_files, EntryPoint};
use crate::error::BundleError;
use crate::finder::ImportFinder;
use crate::report::{BuildReport, FileRecord, OutputRecord, OutputStatus};
use crate::transform::Transformer;
use crate::wrapper::ModuleWrapper;

/// The external pieces a [`Bundler`] delegates to.
#[derive(Clone)]
pub struct Collaborators {
    /// Resolves dependency lists.
    pub finder: Arc<dyn ImportFinder>,
    /// Converts single files.
    pub transpiler: Arc<dyn Transpiler>,
    /// Embeds modules in bundles.
    pub wrapper: Arc<dyn ModuleWrapper>,
    /// Rewrites content after transpiling and before writing.
    pub transformer: Arc<dyn Transformer>,
}

/// Builds bundle, vendor and asset outputs for a [`BuildContext`].
///
/// Entry points are independent and built in parallel. Within one group the
/// dependencies are compiled in parallel and concatenated in resolver order.
/// A failing entry point does not roll back outputs other entry points wrote.
pub struct Bundler {
    context: BuildContext,
    storage: Arc<dyn Storage>,
    cache: Cache,
    finder: Arc<dyn ImportFinder>,
    transpiler: Arc<dyn Transpiler>,
    wrapper: Arc<dyn ModuleWrapper>,
    transformer: Arc<dyn Transformer>,
}

impl Bundler {
    /// Creates a bundler. The cache lives in the context's cache directory.
    pub fn new(context: BuildContext, storage: Arc<dyn Storage>, collaborators: Collaborators) -> Self {
        let cache = Cache::new(storage.clone(), context.cache_dir.clone(), context.dev);
        Self {
            context,
            storage,
            cache,
            finder: collaborators.finder,
            transpiler: collaborators.transpiler,
            wrapper: collaborators.wrapper,
            transformer: collaborators.transformer,
        }
    }

    /// The context this bundler builds.
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// The compute cache.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Builds every configured entry point.
    ///
    /// All entry points run to completion; the first error in configuration
    /// order is returned.
    pub fn bundle(&self) -> Result<BuildReport, BundleError> {
        let entries: Vec<SourceFile> = self
            .context
            .entry_points
            .iter()
            .map(|name| self.context.source_file(name))
            .collect();
        self.check_conflicts(&entries)?;

        let results: Vec<_> = entries
            .par_iter()
            .map(|file| self.bundle_entry_point(file))
            .collect();
        merge_results(results)
    }

    /// Builds the bundle, vendor and asset outputs of one entry point.
    pub fn bundle_entry_point(&self, file: &SourceFile) -> Result<BuildReport, BundleError> {
        tracing::debug!(entry = %file, "checking entry point");
        let entry = EntryPoint::new(file.clone(), self.finder.resolve_all(file)?);
        let root = self.context.output_root();
        let extension = self.transpiler.extension_for(file);

        let mut report = self.build_group(
            &entry.bundle_output(&root, &extension),
            entry.bundle_files(),
            "bundle",
        )?;
        report.merge(self.build_group(
            &entry.vendor_output(&root, &extension),
            entry.vendor_files(),
            "vendor",
        )?);
        report.merge(self.compile_assets(entry.asset_files())?);
        Ok(report)
    }

    /// Compiles every configured standalone asset.
    ///
    /// Each asset is resolved through the import finder and all of its
    /// non-virtual bundle files are compiled to their own outputs.
    pub fn compile(&self) -> Result<BuildReport, BundleError> {
        let results: Vec<_> = self
            .context
            .asset_files
            .par_iter()
            .map(|name| {
                let file = self.context.source_file(name);
                tracing::debug!(asset = %file, "checking asset");
                let entry = EntryPoint::new(file.clone(), self.finder.resolve_all(&file)?);
                self.compile_assets(&real_files(entry.bundle_files()))
            })
            .collect();
        merge_results(results)
    }

    /// Output path of a standalone asset: its directory relative to the
    /// source root, moved below the output root.
    pub fn asset_output(&self, file: &SourceFile) -> SourceFile {
        let name = format!("{}.{}", file.base_name(), self.transpiler.extension_for(file));
        let dir = join_path(
            &self.context.output_root(),
            &self.context.relative_directory(file),
        );
        SourceFile::new(join_path(&dir, &name))
    }

    fn check_conflicts(&self, entries: &[SourceFile]) -> Result<(), BundleError> {
        let root = self.context.output_root();
        let mut seen: HashMap<SourceFile, &SourceFile> = HashMap::new();
        for file in entries {
            let extension = self.transpiler.extension_for(file);
            let output = EntryPoint::new(file.clone(), Vec::new()).bundle_output(&root, &extension);
            if let Some(first) = seen.get(&output) {
                return Err(BundleError::OutputConflict {
                    output: output.path().to_string(),
                    first: first.path().to_string(),
                    second: file.path().to_string(),
                });
            }
            seen.insert(output, file);
        }
        Ok(())
    }

    /// Rebuilds one bundle or vendor output if its inputs changed.
    fn build_group(
        &self,
        output: &SourceFile,
        dependencies: &[Dependency],
        group: &str,
    ) -> Result<BuildReport, BundleError> {
        let inputs = real_files(dependencies);
        self.with_output_lock(output, || {
            let Some(reason) = self.cache.check_output(output, &inputs)? else {
                tracing::debug!(output = %output, group, "nothing to do");
                return Ok(BuildReport::fresh(output.path()));
            };
            tracing::debug!(output = %output, group, %reason, "compiling");

            let compiled: Vec<_> = inputs
                .par_iter()
                .map(|file| self.compiled_content(file))
                .collect();

            let mut buffer = String::new();
            let mut files = Vec::with_capacity(inputs.len());
            for (file, result) in inputs.iter().zip(compiled) {
                let (record, status) = result.inspect_err(|e| log_failure(file, e))?;
                buffer.push_str(&self.wrapper.wrap(
                    file.path(),
                    &record.module_name,
                    &record.content,
                ));
                files.push(FileRecord {
                    path: file.path().to_string(),
                    from_cache: status == CacheStatus::Hit,
                });
            }

            self.write_output(output, buffer)?;
            self.cache.record_sources(output, &inputs)?;
            Ok(BuildReport {
                outputs: vec![OutputRecord {
                    path: output.path().to_string(),
                    status: OutputStatus::Written,
                    reason: Some(reason.to_string()),
                }],
                files,
            })
        })
    }

    fn compile_assets(&self, files: &[SourceFile]) -> Result<BuildReport, BundleError> {
        let results: Vec<_> = files
            .par_iter()
            .map(|file| self.compile_asset(file))
            .collect();
        merge_results(results)
    }

    fn compile_asset(&self, file: &SourceFile) -> Result<BuildReport, BundleError> {
        let output = self.asset_output(file);
        let inputs = [file.clone()];
        self.with_output_lock(&output, || {
            let Some(reason) = self.cache.check_output(&output, &inputs)? else {
                tracing::debug!(output = %output, "asset up to date");
                return Ok(BuildReport::fresh(output.path()));
            };
            tracing::debug!(output = %output, %reason, "compiling asset");

            let (record, status) = self
                .compiled_content(file)
                .inspect_err(|e| log_failure(file, e))?;
            self.write_output(&output, record.content)?;
            self.cache.record_sources(&output, &inputs)?;
            Ok(BuildReport {
                outputs: vec![OutputRecord {
                    path: output.path().to_string(),
                    status: OutputStatus::Written,
                    reason: Some(reason.to_string()),
                }],
                files: vec![FileRecord {
                    path: file.path().to_string(),
                    from_cache: status == CacheStatus::Hit,
                }],
            })
        })
    }

    /// Transpiled and post-transformed content of one file, from the cache
    /// when the cached copy is still fresh.
    fn compiled_content(&self, file: &SourceFile) -> Result<(CompiledRecord, CacheStatus), BundleError> {
        let output_file = file.with_extension(&self.transpiler.extension_for(file));
        self.cache.compute_or_load(&output_file, file, || {
            tracing::debug!(file = %file, "emitting");
            let result = self.transpiler.transpile(file)?;
            let content = self.transformer.on_post_transpile(
                &output_file,
                result.content,
                &self.context.output_folder,
            );
            Ok::<_, BundleError>(CompiledRecord {
                module_name: result.module_name,
                content,
            })
        })
    }

    fn write_output(&self, output: &SourceFile, content: String) -> Result<(), BundleError> {
        let content = self
            .transformer
            .on_pre_write(output, content, &self.context.output_folder);
        self.storage.make_directories(output.directory())?;
        self.storage.write(output.path(), content.as_bytes())?;
        tracing::debug!(output = %output, bytes = content.len(), "wrote output");
        Ok(())
    }

    /// Serializes check, rebuild and write for one output path.
    ///
    /// Output locks use the source-set key, so they never collide with the
    /// per-file compute locks taken inside.
    fn with_output_lock<R>(&self, output: &SourceFile, f: impl FnOnce() -> R) -> R {
        self.cache
            .locks()
            .with_lock(&sources_key(&cache_key(output)), f)
    }
}

fn log_failure(file: &SourceFile, error: &BundleError) {
    match error {
        BundleError::Transpile(e) => {
            tracing::error!(file = %file, diagnostics = %e.diagnostics(), "transpile failed");
        }
        other => tracing::error!(file = %file, error = %other, "compile failed"),
    }
}

/// Merges reports in order. Every error after the first is logged, the
/// first is returned.
fn merge_results(results: Vec<Result<BuildReport, BundleError>>) -> Result<BuildReport, BundleError> {
    let mut report = BuildReport::default();
    let mut first_error = None;
    for result in results {
        match result {
            Ok(part) => report.merge(part),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(e) => tracing::error!(error = %e, "build step failed"),
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(report),
    }
}
