//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the configuration file in a project directory.
pub const CONFIG_FILE: &str = "bale.toml";

/// Loads and validates a `bale.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a `bale.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name"));
    }
    if config.paths.web_root.is_empty() {
        return Err(ConfigError::MissingField("paths.web_root"));
    }
    if config.paths.cache_dir.is_empty() {
        return Err(ConfigError::MissingField("paths.cache_dir"));
    }
    let inputs = config
        .build
        .entry_points
        .iter()
        .map(|name| ("build.entry_points", name))
        .chain(config.build.assets.iter().map(|name| ("build.assets", name)));
    for (list, name) in inputs {
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidInput {
                list,
                name: name.clone(),
                reason: "name is blank",
            });
        }
    }
    for (index, p) in config.processors.iter().enumerate() {
        let reason = if p.from.is_empty() || p.to.is_empty() {
            Some("`from` and `to` extensions are required")
        } else if p.from.starts_with('.') || p.to.starts_with('.') {
            Some("extensions are written without a leading dot")
        } else if p.command.is_empty() {
            Some("`command` is required")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ConfigError::Processor {
                index,
                from: p.from.clone(),
                to: p.to.clone(),
                reason,
            });
        }
    }
    Ok(())
}
