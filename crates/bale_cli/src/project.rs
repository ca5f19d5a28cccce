//! Shared helpers for CLI commands.
//!
//! Project root discovery, config loading, wiring the default collaborators
//! into a [`Bundler`], and report printing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bale_bundler::{
    BuildReport, Bundler, Collaborators, JsonGraphFinder, NoopTransformer, OutputStatus,
    RegisterWrapper,
};
use bale_config::{BuildContext, ContextOverrides, ProjectConfig, CONFIG_FILE};
use bale_pipeline::{Pipeline, PipelineTranspiler};
use bale_storage::{LocalStorage, Storage};

use crate::{GlobalArgs, ReportFormat};

/// Walks up from `start` looking for the nearest directory containing `bale.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project directory and loads its configuration.
///
/// With `--config`, a file path is loaded directly and its parent becomes the
/// project directory; a directory path must contain `bale.toml`. Otherwise
/// the current directory and its parents are searched.
pub fn load_project(
    global: &GlobalArgs,
) -> Result<(PathBuf, ProjectConfig), Box<dyn std::error::Error>> {
    match &global.config {
        Some(config_path) => {
            let path = PathBuf::from(config_path);
            if path.is_file() {
                let config = bale_config::load_config_file(&path)?;
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                Ok((dir, config))
            } else {
                let config = bale_config::load_config(&path)?;
                Ok((path, config))
            }
        }
        None => {
            let dir = find_project_root(&std::env::current_dir()?)?;
            let config = bale_config::load_config(&dir)?;
            Ok((dir, config))
        }
    }
}

/// Builds a [`Bundler`] with the default collaborators: the dependency graph
/// file, the configured processor pipeline, `register()` wrapping and no
/// transforms.
pub fn make_bundler(
    project_dir: &Path,
    config: &ProjectConfig,
    overrides: &ContextOverrides,
) -> Result<Bundler, Box<dyn std::error::Error>> {
    let context = BuildContext::from_config(project_dir, config, overrides);
    let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(project_dir));

    let pipeline = Pipeline::from_config(&config.processors, Some(project_dir))?;
    let finder = JsonGraphFinder::load(storage.as_ref(), &context.graph)?;
    tracing::debug!(files = finder.len(), graph = %context.graph, "loaded dependency graph");

    let collaborators = Collaborators {
        finder: Arc::new(finder),
        transpiler: Arc::new(PipelineTranspiler::new(pipeline, storage.clone())),
        wrapper: Arc::new(RegisterWrapper),
        transformer: Arc::new(NoopTransformer),
    };
    Ok(Bundler::new(context, storage, collaborators))
}

/// Prints a build report in the requested format.
///
/// JSON goes to stdout; text goes to stderr and is suppressed by `--quiet`.
pub fn print_report(report: &BuildReport, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    match global.format {
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        ReportFormat::Text => {
            if global.quiet {
                return Ok(());
            }
            for output in &report.outputs {
                match (output.status, &output.reason) {
                    (OutputStatus::Written, Some(reason)) => {
                        eprintln!("     Wrote {} ({reason})", output.path)
                    }
                    (OutputStatus::Written, None) => eprintln!("     Wrote {}", output.path),
                    (OutputStatus::Fresh, _) if global.verbose => {
                        eprintln!("     Fresh {}", output.path)
                    }
                    (OutputStatus::Fresh, _) => {}
                }
            }
            eprintln!("  {}", summary(report));
        }
    }
    Ok(())
}

/// One-line summary of a report.
pub fn summary(report: &BuildReport) -> String {
    let written = report.written().count();
    format!(
        "Finished: {written} written, {} up to date, {} transpiled, {} from cache",
        report.outputs.len() - written,
        report.transpiled(),
        report.cached()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bale_bundler::{FileRecord, OutputRecord};

    #[test]
    fn find_root_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[project]\nname = \"x\"\n").unwrap();
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root(&nested).unwrap(), dir.path());
    }

    #[test]
    fn load_project_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[project]\nname = \"custom\"\n").unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(path.to_string_lossy().into_owned()),
            format: ReportFormat::Text,
        };
        let (root, config) = load_project(&global).unwrap();
        assert_eq!(root, dir.path());
        assert_eq!(config.project.name, "custom");
    }

    #[test]
    fn make_bundler_requires_graph() {
        let dir = tempfile::tempdir().unwrap();
        let config = bale_config::load_config_from_str("[project]\nname = \"x\"\n").unwrap();
        assert!(make_bundler(dir.path(), &config, &ContextOverrides::default()).is_err());

        std::fs::write(dir.path().join("bale-graph.json"), "{}").unwrap();
        let bundler = make_bundler(dir.path(), &config, &ContextOverrides::default()).unwrap();
        assert_eq!(bundler.context().output_root(), "web/dist");
    }

    #[test]
    fn summary_counts() {
        let report = BuildReport {
            outputs: vec![
                OutputRecord {
                    path: "web/dist/app.js".to_string(),
                    status: OutputStatus::Written,
                    reason: None,
                },
                OutputRecord {
                    path: "web/dist/app.vendor.js".to_string(),
                    status: OutputStatus::Fresh,
                    reason: None,
                },
            ],
            files: vec![FileRecord {
                path: "src/app.js".to_string(),
                from_cache: false,
            }],
        };
        assert_eq!(
            summary(&report),
            "Finished: 1 written, 1 up to date, 1 transpiled, 0 from cache"
        );
    }
}
