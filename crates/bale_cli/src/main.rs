//! bale CLI: the command-line interface for the bale asset bundler.
//!
//! Provides `bale init` for project scaffolding, `bale build` for bundling
//! entry points, `bale compile` for standalone assets and `bale clean` for
//! dropping the compute cache.

#![warn(missing_docs)]

mod build;
mod clean;
mod compile;
mod init;
mod project;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter that overrides `--quiet`
/// and `--verbose`.
const LOG_ENV: &str = "BALE_LOG";

/// bale: an incremental front-end asset bundler.
#[derive(Parser, Debug)]
#[command(name = "bale", version, about = "Incremental asset bundler")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `bale.toml` configuration file or its directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output format for build reports.
    #[arg(long, global = true, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new bale project.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,
    },
    /// Bundle every configured entry point.
    Build(BuildArgs),
    /// Compile the configured standalone assets.
    Compile(BuildArgs),
    /// Remove the compute cache.
    Clean(CleanArgs),
}

/// Arguments shared by `bale build` and `bale compile`.
#[derive(Parser, Debug, Default)]
pub struct BuildArgs {
    /// Force development mode (incremental compute cache).
    #[arg(long, conflicts_with = "prod")]
    pub dev: bool,

    /// Force production mode (no compute cache).
    #[arg(long)]
    pub prod: bool,

    /// Override the configured cache directory.
    #[arg(long)]
    pub cache_dir: Option<String>,
}

impl BuildArgs {
    /// The development flag requested on the command line, if any.
    pub fn dev_override(&self) -> Option<bool> {
        match (self.dev, self.prod) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Arguments for the `bale clean` subcommand.
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Also remove the generated output folder.
    #[arg(long)]
    pub outputs: bool,
}

/// Build report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
    /// How to print reports.
    pub format: ReportFormat,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
        format: cli.format,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Init { name } => init::run(name, &global),
        Command::Build(ref args) => build::run(args, &global),
        Command::Compile(ref args) => compile::run(args, &global),
        Command::Clean(ref args) => clean::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(global)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Filter used when `BALE_LOG` is not set.
fn default_filter(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn global(quiet: bool, verbose: bool) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            config: None,
            format: ReportFormat::Text,
        }
    }

    #[test]
    fn parse_init_default() {
        let cli = Cli::parse_from(["bale", "init"]);
        match cli.command {
            Command::Init { name } => assert!(name.is_none()),
            _ => panic!("expected Init command"),
        }
    }

    #[test]
    fn parse_init_with_name() {
        let cli = Cli::parse_from(["bale", "init", "shop"]);
        match cli.command {
            Command::Init { name } => assert_eq!(name.as_deref(), Some("shop")),
            _ => panic!("expected Init command"),
        }
    }

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["bale", "build"]);
        match cli.command {
            Command::Build(ref args) => {
                assert!(!args.dev);
                assert!(!args.prod);
                assert!(args.cache_dir.is_none());
                assert_eq!(args.dev_override(), None);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_dev() {
        let cli = Cli::parse_from(["bale", "build", "--dev", "--cache-dir", "/tmp/c"]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.dev_override(), Some(true));
                assert_eq!(args.cache_dir.as_deref(), Some("/tmp/c"));
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_compile_prod() {
        let cli = Cli::parse_from(["bale", "compile", "--prod"]);
        match cli.command {
            Command::Compile(ref args) => assert_eq!(args.dev_override(), Some(false)),
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn dev_and_prod_conflict() {
        assert!(Cli::try_parse_from(["bale", "build", "--dev", "--prod"]).is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["bale", "-q", "-v", "build"]).is_err());
    }

    #[test]
    fn parse_clean_outputs() {
        let cli = Cli::parse_from(["bale", "clean", "--outputs"]);
        match cli.command {
            Command::Clean(ref args) => assert!(args.outputs),
            _ => panic!("expected Clean command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "bale",
            "--quiet",
            "--format",
            "json",
            "--config",
            "/path/to/bale.toml",
            "build",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.format, ReportFormat::Json);
        assert_eq!(cli.config.as_deref(), Some("/path/to/bale.toml"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["bale", "build", "--verbose"]);
        assert!(cli.verbose);
        assert_eq!(cli.format, ReportFormat::Text);
    }

    #[test]
    fn default_filter_levels() {
        assert_eq!(default_filter(&global(true, false)), "error");
        assert_eq!(default_filter(&global(false, true)), "debug");
        assert_eq!(default_filter(&global(false, false)), "warn");
    }
}
