//! Parsing and validation of `bale.toml` project configuration files.
//!
//! This crate reads the project configuration file into a strongly-typed
//! [`ProjectConfig`] and resolves it, together with the working directory,
//! into the [`BuildContext`] value that every build operation receives.

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod loader;
pub mod types;

pub use context::{BuildContext, ContextOverrides};
pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use types::*;
