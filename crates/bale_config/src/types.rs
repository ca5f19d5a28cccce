//! Configuration types deserialized from `bale.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// The top-level project configuration parsed from `bale.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Where sources, outputs, the cache and the dependency graph live.
    #[serde(default)]
    pub paths: PathsConfig,
    /// What to build and in which mode.
    #[serde(default)]
    pub build: BuildConfig,
    /// External command processors plugged into the content pipeline.
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,
}

/// Core project metadata required in every `bale.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
}

/// Directory layout of the project, all relative to the working directory.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// The public web root that outputs are written under.
    #[serde(default = "default_web_root")]
    pub web_root: String,
    /// Subfolder of the web root for generated files.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,
    /// Optional prefix applied to every entry point and asset name.
    #[serde(default)]
    pub source_root: Option<String>,
    /// Directory holding compute cache records.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Pre-computed dependency graph produced by the import scanner.
    #[serde(default = "default_graph")]
    pub graph: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            web_root: default_web_root(),
            output_folder: default_output_folder(),
            source_root: None,
            cache_dir: default_cache_dir(),
            graph: default_graph(),
        }
    }
}

fn default_web_root() -> String {
    "web".to_string()
}

fn default_output_folder() -> String {
    "dist".to_string()
}

fn default_cache_dir() -> String {
    "var/cache/bale".to_string()
}

fn default_graph() -> String {
    "bale-graph.json".to_string()
}

/// Build settings.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BuildConfig {
    /// Development mode: enables the per-file compute cache and source-set checks.
    #[serde(default)]
    pub dev: bool,
    /// Entry point files, each bundled into its own output.
    ///
    /// Accepts either a single string or a list of strings.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub entry_points: Vec<String>,
    /// Standalone asset files, each compiled to its own output.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub assets: Vec<String>,
}

/// An external program that converts one extension into another.
///
/// The program receives the content on stdin and must print the converted
/// content on stdout.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorConfig {
    /// The extension this processor accepts (without the dot).
    pub from: String,
    /// The extension it produces.
    pub to: String,
    /// When `true` the result is an intermediate form that another processor continues.
    #[serde(default)]
    pub intermediate: bool,
    /// When `true` the processor accepts the intermediate output of another
    /// processor instead of raw files.
    #[serde(default)]
    pub chained: bool,
    /// The program to run.
    pub command: String,
    /// Arguments passed to the program.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `entry_points = "app.js"` as well as `entry_points = ["app.js", "admin.js"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
