//! `bale clean`: remove the compute cache and, optionally, generated outputs.

use bale_cache::Cache;
use bale_config::{BuildContext, ContextOverrides};
use bale_storage::{LocalStorage, Storage};
use std::sync::Arc;

use crate::project::load_project;
use crate::{CleanArgs, GlobalArgs};

/// Runs the `bale clean` command. Returns exit code 0 on success.
pub fn run(args: &CleanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (project_dir, config) = load_project(global)?;
    let context = BuildContext::from_config(&project_dir, &config, &ContextOverrides::default());
    let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(&project_dir));

    Cache::new(storage.clone(), context.cache_dir.clone(), true).clear()?;
    if !global.quiet {
        eprintln!("    Removed {}", context.cache_dir);
    }

    if args.outputs {
        let output_root = context.output_root();
        // Never wipe the web root itself.
        if context.output_folder.trim_matches('/').is_empty() {
            return Err(format!(
                "refusing to remove {output_root}: no output_folder is configured"
            )
            .into());
        }
        storage.remove_directory(&output_root)?;
        if !global.quiet {
            eprintln!("    Removed {output_root}");
        }
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReportFormat;

    fn global_for(dir: &std::path::Path) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(dir.to_string_lossy().into_owned()),
            format: ReportFormat::Text,
        }
    }

    #[test]
    fn clean_removes_cache_and_outputs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bale.toml"), "[project]\nname = \"x\"\n").unwrap();
        let cache = dir.path().join("var/cache/bale");
        let outputs = dir.path().join("web/dist");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::create_dir_all(&outputs).unwrap();
        std::fs::write(cache.join("abcde_app.js"), "x").unwrap();
        std::fs::write(outputs.join("app.js"), "x").unwrap();

        run(&CleanArgs { outputs: false }, &global_for(dir.path())).unwrap();
        assert!(!cache.exists());
        assert!(outputs.join("app.js").exists());

        run(&CleanArgs { outputs: true }, &global_for(dir.path())).unwrap();
        assert!(!outputs.exists());
        assert!(dir.path().join("web").exists());
    }

    #[test]
    fn clean_refuses_bare_web_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bale.toml"),
            "[project]\nname = \"x\"\n\n[paths]\noutput_folder = \"\"\n",
        )
        .unwrap();
        assert!(run(&CleanArgs { outputs: true }, &global_for(dir.path())).is_err());
    }
}
