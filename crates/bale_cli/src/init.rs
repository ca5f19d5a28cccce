//! `bale init`: project scaffolding.
//!
//! Creates a project with a `bale.toml`, a `src/app.js` entry point and an
//! empty dependency graph so that `bale build` works right away.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bale_config::CONFIG_FILE;

use crate::GlobalArgs;

/// Runs the `bale init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory.
/// Returns exit code 0 on success.
pub fn run(name: Option<String>, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{n}' already exists").into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => std::env::current_dir()?,
    };
    if project_dir.join(CONFIG_FILE).exists() {
        return Err(format!("{CONFIG_FILE} already exists in {}", project_dir.display()).into());
    }

    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("my_project");

    if !global.quiet {
        eprintln!("  Creating new bale project `{project_name}`");
    }

    scaffold(&project_dir, project_name)?;

    if !global.quiet {
        for created in [CONFIG_FILE, "src/app.js", "bale-graph.json"] {
            eprintln!("     Created {}", project_dir.join(created).display());
        }
    }
    Ok(0)
}

/// Writes the project files into `root`.
fn scaffold(root: &Path, name: &str) -> io::Result<()> {
    fs::create_dir_all(root.join("src"))?;
    fs::create_dir_all(root.join("web"))?;
    fs::write(root.join(CONFIG_FILE), config_template(name))?;
    fs::write(
        root.join("src").join("app.js"),
        "module.exports = function () {\n    return \"hello\";\n};\n",
    )?;
    fs::write(
        root.join("bale-graph.json"),
        "{\n  \"src/app.js\": [\n    { \"path\": \"src/app.js\" }\n  ]\n}\n",
    )
}

fn config_template(name: &str) -> String {
    format!(
        r#"[project]
name = "{name}"

[paths]
web_root = "web"
output_folder = "dist"
source_root = "src"
graph = "bale-graph.json"

[build]
dev = true
entry_points = ["app.js"]

# Convert other languages by piping through an external program:
#
# [[processors]]
# from = "ts"
# to = "js"
# command = "tsc-stdin"
"#
    )
}
