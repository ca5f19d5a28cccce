//! Cache keys derived from logical output paths.
//!
//! A key is a short hash prefix of the path followed by the path itself with
//! separators replaced by dots: `3f2a1_web.dist.app.js`. The literal suffix
//! keeps records recognizable on disk and unique per location; the prefix
//! disambiguates paths that sanitize to the same suffix.

use bale_common::{ContentHash, SourceFile};

/// Number of hash characters in a cache key prefix.
pub const KEY_HASH_LEN: usize = 5;

/// Suffix of the record listing the inputs an output was built from.
pub const SOURCES_SUFFIX: &str = ".sources";

/// Derives the cache key for an output file.
pub fn cache_key(output: &SourceFile) -> String {
    let path = output.path();
    let prefix = ContentHash::from_bytes(path.as_bytes()).hex_prefix(KEY_HASH_LEN);
    let sanitized: String = path
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '.',
            other => other,
        })
        .collect();
    format!("{prefix}_{sanitized}")
}

/// The key of the source-set record belonging to `key`.
pub fn sources_key(key: &str) -> String {
    format!("{key}{SOURCES_SUFFIX}")
}
