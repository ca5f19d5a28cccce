//! Entry points and their bundle, vendor and asset views.

use bale_common::{join_path, Dependency, SourceFile};

/// A root file plus its resolved, ordered dependency list.
///
/// The three views are derived once on construction and keep the resolver's
/// order:
///
/// - **asset files**: static, non-virtual dependencies, each compiled to its
///   own output file;
/// - **vendor files**: non-static dependencies inside a `node_modules/`
///   directory;
/// - **bundle files**: everything else, virtual references included.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    file: SourceFile,
    dependencies: Vec<Dependency>,
    bundle: Vec<Dependency>,
    vendor: Vec<Dependency>,
    assets: Vec<SourceFile>,
}

impl EntryPoint {
    /// Classifies `dependencies` for `file`.
    pub fn new(file: SourceFile, dependencies: Vec<Dependency>) -> Self {
        let mut bundle = Vec::new();
        let mut vendor = Vec::new();
        let mut assets = Vec::new();
        for dep in &dependencies {
            if dep.is_static {
                if !dep.is_virtual {
                    assets.push(dep.file.clone());
                }
            } else if dep.is_vendor() {
                vendor.push(dep.clone());
            } else {
                bundle.push(dep.clone());
            }
        }
        Self {
            file,
            dependencies,
            bundle,
            vendor,
            assets,
        }
    }

    /// The root file.
    pub fn file(&self) -> &SourceFile {
        &self.file
    }

    /// Every dependency, in resolver order.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Application code concatenated into the bundle output.
    pub fn bundle_files(&self) -> &[Dependency] {
        &self.bundle
    }

    /// Third-party code concatenated into the vendor output.
    pub fn vendor_files(&self) -> &[Dependency] {
        &self.vendor
    }

    /// Standalone assets compiled individually.
    pub fn asset_files(&self) -> &[SourceFile] {
        &self.assets
    }

    /// `<output_root>/<base name>.<extension>`.
    pub fn bundle_output(&self, output_root: &str, extension: &str) -> SourceFile {
        SourceFile::new(join_path(
            output_root,
            &format!("{}.{extension}", self.file.base_name()),
        ))
    }

    /// `<output_root>/<base name>.vendor.<extension>`.
    pub fn vendor_output(&self, output_root: &str, extension: &str) -> SourceFile {
        SourceFile::new(join_path(
            output_root,
            &format!("{}.vendor.{extension}", self.file.base_name()),
        ))
    }
}

/// Files of the non-virtual dependencies, in order.
pub(crate) fn real_files(dependencies: &[Dependency]) -> Vec<SourceFile> {
    dependencies
        .iter()
        .filter(|d| !d.is_virtual)
        .map(|d| d.file.clone())
        .collect()
}
