//! Path-addressed source files.
//!
//! Paths are logical, `/`-separated strings relative to the working
//! directory unless they are explicitly absolute. They are never touched
//! by the host filesystem here; resolution happens in the storage layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A path-addressed unit of content.
///
/// Immutable after construction. The directory, name and extension parts
/// are derived once from the normalized path.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SourceFile {
    path: String,
}

impl SourceFile {
    /// Creates a source file from a logical path.
    ///
    /// Backslashes are normalized to `/` and a leading `./` is dropped.
    pub fn new(path: impl Into<String>) -> Self {
        let mut path = path.into().replace('\\', "/");
        while let Some(rest) = path.strip_prefix("./") {
            path = rest.to_string();
        }
        Self { path }
    }

    /// The full logical path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The directory part of the path, or `"."` for a root-level relative file.
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(0) => "/",
            Some(idx) => &self.path[..idx],
            None => ".",
        }
    }

    /// The file name including its extension.
    pub fn name(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[idx + 1..],
            None => &self.path,
        }
    }

    /// The file name without its last extension.
    ///
    /// Dotfiles such as `.babelrc` have no extension and keep their full name.
    pub fn base_name(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }

    /// The last extension without the dot, or `""` when there is none.
    pub fn extension(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[idx + 1..],
            _ => "",
        }
    }

    /// Returns `true` if the path is absolute on any supported platform.
    pub fn is_absolute(&self) -> bool {
        is_absolute_path(&self.path)
    }

    /// Returns a sibling of this file with the same base name and a new extension.
    ///
    /// `src/app.ts` with `js` becomes `src/app.js`.
    pub fn with_extension(&self, extension: &str) -> SourceFile {
        let name = if extension.is_empty() {
            self.base_name().to_string()
        } else {
            format!("{}.{extension}", self.base_name())
        };
        SourceFile::new(join_path(self.directory(), &name))
    }
}

impl From<String> for SourceFile {
    fn from(path: String) -> Self {
        SourceFile::new(path)
    }
}

impl From<&str> for SourceFile {
    fn from(path: &str) -> Self {
        SourceFile::new(path)
    }
}

impl From<SourceFile> for String {
    fn from(file: SourceFile) -> Self {
        file.path
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceFile({})", self.path)
    }
}

/// Returns `true` for `/unix/paths`, `C:\windows` / `C:/windows` paths and UNC shares.
pub fn is_absolute_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    if bytes.first() == Some(&b'/') || path.starts_with("\\\\") {
        return true;
    }
    bytes.len() > 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

/// Joins two logical paths.
///
/// An absolute `tail` replaces `head`; an empty or `"."` head yields `tail`
/// unchanged; empty segments are not duplicated.
pub fn join_path(head: &str, tail: &str) -> String {
    if is_absolute_path(tail) || head.is_empty() || head == "." {
        return tail.to_string();
    }
    if tail.is_empty() {
        return head.to_string();
    }
    let head = if head == "/" { head } else { head.trim_end_matches('/') };
    let tail = tail.trim_start_matches('/');
    if head == "/" {
        format!("/{tail}")
    } else {
        format!("{head}/{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_of_nested_path() {
        let f = SourceFile::new("src/components/button.tsx");
        assert_eq!(f.directory(), "src/components");
        assert_eq!(f.name(), "button.tsx");
        assert_eq!(f.base_name(), "button");
        assert_eq!(f.extension(), "tsx");
    }

    #[test]
    fn root_level_file_has_dot_directory() {
        let f = SourceFile::new("app.ts");
        assert_eq!(f.directory(), ".");
        assert_eq!(f.base_name(), "app");
    }

    #[test]
    fn multiple_dots_keep_inner_ones_in_base_name() {
        let f = SourceFile::new("lib/jquery.min.js");
        assert_eq!(f.base_name(), "jquery.min");
        assert_eq!(f.extension(), "js");
    }

    #[test]
    fn dotfile_has_no_extension() {
        let f = SourceFile::new(".babelrc");
        assert_eq!(f.base_name(), ".babelrc");
        assert_eq!(f.extension(), "");
    }

    #[test]
    fn backslashes_and_leading_dot_slash_normalized() {
        let f = SourceFile::new(".\\src\\app.js");
        assert_eq!(f.path(), "src/app.js");
    }

    #[test]
    fn absolute_detection() {
        assert!(is_absolute_path("/var/www/app.js"));
        assert!(is_absolute_path("C:\\project\\app.js"));
        assert!(is_absolute_path("d:/project/app.js"));
        assert!(is_absolute_path("\\\\share\\app.js"));
        assert!(!is_absolute_path("src/app.js"));
        assert!(!is_absolute_path("c:"));
        assert!(SourceFile::new("/abs/app.js").is_absolute());
    }

    #[test]
    fn absolute_root_directory() {
        let f = SourceFile::new("/app.js");
        assert_eq!(f.directory(), "/");
    }

    #[test]
    fn with_extension_keeps_directory() {
        let f = SourceFile::new("src/app.ts");
        assert_eq!(f.with_extension("js").path(), "src/app.js");
        assert_eq!(SourceFile::new("app.ts").with_extension("js").path(), "app.js");
    }

    #[test]
    fn join_rules() {
        assert_eq!(join_path("web", "dist/app.js"), "web/dist/app.js");
        assert_eq!(join_path("web/", "app.js"), "web/app.js");
        assert_eq!(join_path(".", "app.js"), "app.js");
        assert_eq!(join_path("", "app.js"), "app.js");
        assert_eq!(join_path("web", ""), "web");
        assert_eq!(join_path("web", "/abs/app.js"), "/abs/app.js");
        assert_eq!(join_path("/", "app.js"), "/app.js");
    }

    #[test]
    fn serde_as_plain_string() {
        let f = SourceFile::new("src/app.js");
        let json = serde_json::to_string(&f).unwrap();
        assert_eq!(json, "\"src/app.js\"");
        let back: SourceFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }
}
