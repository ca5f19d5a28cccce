//! Errors raised while reading `bale.toml`.

use std::path::PathBuf;

/// Why a `bale.toml` could not be turned into a [`ProjectConfig`](crate::ProjectConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected layout.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required setting is absent or empty.
    #[error("missing required setting `{0}`")]
    MissingField(&'static str),

    /// An entry point or asset name is unusable.
    #[error("invalid {list} entry {name:?}: {reason}")]
    InvalidInput {
        /// `build.entry_points` or `build.assets`.
        list: &'static str,
        /// The offending name as written.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A `[[processors]]` table is unusable.
    #[error("processors[{index}] ({from} -> {to}): {reason}")]
    Processor {
        /// Position of the table in the file.
        index: usize,
        /// Its `from` extension.
        from: String,
        /// Its `to` extension.
        to: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_names_the_file() {
        let err = ConfigError::Read {
            path: PathBuf::from("shop/bale.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.to_string(), "failed to read shop/bale.toml: no such file");
    }

    #[test]
    fn processor_error_names_the_table() {
        let err = ConfigError::Processor {
            index: 1,
            from: "less".to_string(),
            to: "css".to_string(),
            reason: "`command` is required",
        };
        assert_eq!(err.to_string(), "processors[1] (less -> css): `command` is required");
    }

    #[test]
    fn invalid_input_quotes_the_name() {
        let err = ConfigError::InvalidInput {
            list: "build.assets",
            name: " ".to_string(),
            reason: "name is blank",
        };
        assert_eq!(err.to_string(), "invalid build.assets entry \" \": name is blank");
    }
}
