//! Incremental build cache for the bale bundler.
//!
//! This crate decides whether an output needs regenerating (source-set and
//! timestamp staleness checks) and persists per-file compute results as
//! versioned, checksummed records so unchanged files are not transpiled again
//! during development builds.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod key;
pub mod lock;
pub mod record;
pub mod staleness;

pub use cache::{Cache, CacheStatus};
pub use error::CacheError;
pub use key::{cache_key, sources_key};
pub use lock::KeyedLocks;
pub use record::{CompiledRecord, RecordStore, SourcesRecord};
pub use staleness::{SourceSetDiff, StaleReason};
