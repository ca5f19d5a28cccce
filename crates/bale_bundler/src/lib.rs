//! Incremental bundle assembly for bale.
//!
//! The [`Bundler`] resolves every configured entry point into its dependency
//! list, splits it into bundle, vendor and asset groups, and regenerates only
//! the outputs whose inputs changed. Import discovery, transpilation, module
//! wrapping and content transforms are collaborators behind traits so the
//! engine never needs to know a source language.

#![warn(missing_docs)]

pub mod bundler;
pub mod entry_point;
pub mod error;
pub mod finder;
pub mod report;
pub mod transform;
pub mod wrapper;

pub use bale_pipeline::{TranspileError, TranspileResult, Transpiler};
pub use bundler::{Bundler, Collaborators};
pub use entry_point::EntryPoint;
pub use error::{BundleError, ResolveError};
pub use finder::{ImportFinder, JsonGraphFinder};
pub use report::{BuildReport, FileRecord, OutputRecord, OutputStatus};
pub use transform::{NoopTransformer, Transformer};
pub use wrapper::{ModuleWrapper, RegisterWrapper};
