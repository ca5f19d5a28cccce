//! `bale build`: bundle every configured entry point.

use bale_config::ContextOverrides;

use crate::project::{load_project, make_bundler, print_report};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `bale build` command.
///
/// Returns exit code 0 on success. A failing entry point is returned as an
/// error after the others have finished.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (project_dir, config) = load_project(global)?;
    let overrides = ContextOverrides {
        dev: args.dev_override(),
        cache_dir: args.cache_dir.clone(),
    };
    let bundler = make_bundler(&project_dir, &config, &overrides)?;

    if !global.quiet {
        let mode = if bundler.context().dev { "dev" } else { "prod" };
        eprintln!(
            "   Bundling {} ({} entry points, {mode})",
            config.project.name,
            bundler.context().entry_points.len()
        );
    }

    let report = bundler.bundle()?;
    print_report(&report, global)?;
    Ok(0)
}
