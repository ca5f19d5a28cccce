//! High-level cache orchestrator.
//!
//! The `Cache` type ties together the record store, the staleness checks and
//! the per-key lock table into the interface the bundler uses: "does this
//! output need regenerating?" and "give me this file's compiled content,
//! computing it only if the cached copy is stale".

use std::sync::Arc;

use bale_common::SourceFile;
use bale_storage::Storage;

use crate::error::CacheError;
use crate::key::{cache_key, sources_key};
use crate::lock::KeyedLocks;
use crate::record::{CompiledRecord, RecordStore, SourcesRecord};
use crate::staleness::{check_timestamps, SourceSetDiff, StaleReason};

/// Where a compiled result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Read from a fresh record.
    Hit,
    /// Computed and written to the cache.
    Miss,
    /// Computed without touching the cache (production mode).
    Bypassed,
}

/// Cache manager for incremental builds.
///
/// In development mode the source-set check and the per-file compute cache
/// are active. Outside development mode no record is read or written and
/// every compiled result is recomputed; only the timestamp check remains.
pub struct Cache {
    /// Record persistence.
    records: RecordStore,

    /// Development mode flag.
    dev: bool,

    /// Serializes check + compute + write per cache key.
    locks: KeyedLocks,
}

impl Cache {
    /// Creates a cache keeping its records in `cache_dir`.
    pub fn new(storage: Arc<dyn Storage>, cache_dir: impl Into<String>, dev: bool) -> Self {
        Self {
            records: RecordStore::new(storage, cache_dir),
            dev,
            locks: KeyedLocks::new(),
        }
    }

    /// Whether development mode is active.
    pub fn is_dev(&self) -> bool {
        self.dev
    }

    /// The storage adapter the cache reads and writes through.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        self.records.storage()
    }

    /// The per-key lock table, shared with callers that need to serialize
    /// work on an output path.
    pub fn locks(&self) -> &KeyedLocks {
        &self.locks
    }

    /// The record store.
    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Decides whether `output` must be regenerated from `inputs`.
    ///
    /// In development mode a missing, unreadable or different source-set
    /// record makes the output stale. The timestamp check always runs.
    /// Returns `None` when the output is fresh.
    pub fn check_output(
        &self,
        output: &SourceFile,
        inputs: &[SourceFile],
    ) -> Result<Option<StaleReason>, CacheError> {
        if self.dev {
            let key = sources_key(&cache_key(output));
            let current = SourcesRecord::from_files(inputs);
            match self.records.read::<SourcesRecord>(&key) {
                Ok(None) => return Ok(Some(StaleReason::NoSourceRecord)),
                Ok(Some(recorded)) => {
                    let diff = SourceSetDiff::between(&recorded.sources, &current.sources);
                    if !diff.is_empty() {
                        return Ok(Some(StaleReason::SourcesChanged(diff)));
                    }
                }
                Err(e) if e.is_corruption() => {
                    tracing::warn!(output = %output, error = %e, "discarding unreadable source record");
                    return Ok(Some(StaleReason::CorruptSourceRecord));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(check_timestamps(
            self.storage().as_ref(),
            output.path(),
            inputs,
        )?)
    }

    /// Persists the input set `output` was just built from.
    ///
    /// A no-op outside development mode.
    pub fn record_sources(&self, output: &SourceFile, inputs: &[SourceFile]) -> Result<(), CacheError> {
        if !self.dev {
            return Ok(());
        }
        let key = sources_key(&cache_key(output));
        self.records.write(&key, &SourcesRecord::from_files(inputs))
    }

    /// Returns the compiled result for `source`, whose output is `output`.
    ///
    /// In development mode the record for `output` is used if it is at least
    /// as new as `source`; otherwise `compute` runs and its result is
    /// persisted. The whole sequence holds the lock for the output's key, so
    /// concurrent callers for the same output compute at most once between
    /// them. Outside development mode `compute` always runs and nothing is
    /// persisted.
    pub fn compute_or_load<E, F>(
        &self,
        output: &SourceFile,
        source: &SourceFile,
        compute: F,
    ) -> Result<(CompiledRecord, CacheStatus), E>
    where
        F: FnOnce() -> Result<CompiledRecord, E>,
        E: From<CacheError>,
    {
        if !self.dev {
            return compute().map(|record| (record, CacheStatus::Bypassed));
        }

        let key = cache_key(output);
        self.locks.with_lock(&key, || {
            if let Some(record) = self.load_fresh(&key, source)? {
                tracing::debug!(file = %source, "emitting from cache");
                return Ok((record, CacheStatus::Hit));
            }
            let record = compute()?;
            self.records.write(&key, &record)?;
            Ok((record, CacheStatus::Miss))
        })
    }

    /// Reads the record for `key` unless it is missing, older than `source`
    /// or corrupt.
    fn load_fresh(
        &self,
        key: &str,
        source: &SourceFile,
    ) -> Result<Option<CompiledRecord>, CacheError> {
        let storage = self.storage();
        let path = self.records.record_path(key);
        let Some(record_time) = storage.modified_time_if_exists(&path)? else {
            return Ok(None);
        };
        if storage.modified_time(source.path())? > record_time {
            return Ok(None);
        }
        match self.records.read::<CompiledRecord>(key) {
            Ok(record) => Ok(record),
            Err(e) if e.is_corruption() => {
                tracing::warn!(file = %source, error = %e, "discarding unreadable cache record");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Removes every record in the cache directory.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.storage().remove_directory(self.records.cache_dir())?;
        Ok(())
    }
}
