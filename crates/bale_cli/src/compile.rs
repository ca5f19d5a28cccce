//! `bale compile`: compile standalone assets to their own outputs.

use bale_config::ContextOverrides;

use crate::project::{load_project, make_bundler, print_report};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `bale compile` command. Returns exit code 0 on success.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (project_dir, config) = load_project(global)?;
    let overrides = ContextOverrides {
        dev: args.dev_override(),
        cache_dir: args.cache_dir.clone(),
    };
    let bundler = make_bundler(&project_dir, &config, &overrides)?;

    if bundler.context().asset_files.is_empty() {
        if !global.quiet {
            eprintln!("   Nothing to compile: no assets configured in [build]");
        }
        return Ok(0);
    }
    if !global.quiet {
        eprintln!(
            "  Compiling {} assets for {}",
            bundler.context().asset_files.len(),
            config.project.name
        );
    }

    let report = bundler.compile()?;
    print_report(&report, global)?;
    Ok(0)
}
