//! Versioned, checksummed cache records.
//!
//! Every record is stored as a 4-byte little-endian header length, a bincode
//! header (magic bytes, format version, record kind, producing bale version,
//! payload checksum) and the bincode payload. Anything that fails to validate
//! is reported as an error instead of being deserialized into a wrong shape.

use std::sync::Arc;

use bale_common::{ContentHash, SourceFile};
use bale_storage::Storage;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Magic bytes identifying a bale cache record.
const RECORD_MAGIC: [u8; 4] = *b"BALE";

/// Current record format version. Increment on breaking changes to
/// the header or payload format.
pub const RECORD_FORMAT_VERSION: u32 = 1;

/// Upper bound on the decoded size of a record header.
const MAX_HEADER_BYTES: usize = 4 * 1024;

/// Upper bound on the decoded size of a record payload.
///
/// Length prefixes read from disk are checked against these limits before
/// anything is allocated for them.
pub const MAX_RECORD_BYTES: usize = 256 * 1024 * 1024;

/// What a record's payload holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// A [`CompiledRecord`].
    Compiled,
    /// A [`SourcesRecord`].
    Sources,
}

/// Header prepended to every record for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordHeader {
    /// Magic bytes: must be `b"BALE"`.
    pub magic: [u8; 4],

    /// Record format version.
    pub format_version: u32,

    /// Kind of payload that follows.
    pub kind: RecordKind,

    /// bale version that produced this record.
    pub bale_version: String,

    /// Content hash of the payload data.
    pub checksum: ContentHash,
}

/// A payload type that can be stored as a record.
pub trait Record: Serialize + DeserializeOwned {
    /// The kind tag written into the header.
    const KIND: RecordKind;
}

/// The cached compute result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledRecord {
    /// Logical module name used for wrapping.
    pub module_name: String,
    /// Fully processed content.
    pub content: String,
}

impl Record for CompiledRecord {
    const KIND: RecordKind = RecordKind::Compiled;
}

/// The sorted input paths an output was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesRecord {
    /// Sorted, de-duplicated logical paths.
    pub sources: Vec<String>,
}

impl SourcesRecord {
    /// Builds a record from input files, sorting and de-duplicating their paths.
    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a SourceFile>) -> Self {
        let mut sources: Vec<String> = files.into_iter().map(|f| f.path().to_string()).collect();
        sources.sort();
        sources.dedup();
        Self { sources }
    }
}

impl Record for SourcesRecord {
    const KIND: RecordKind = RecordKind::Sources;
}

/// Reads and writes records through a storage adapter.
///
/// Each record lives at `<cache_dir>/<key>`.
#[derive(Clone)]
pub struct RecordStore {
    storage: Arc<dyn Storage>,
    cache_dir: String,
}

impl RecordStore {
    /// Creates a record store writing below `cache_dir`.
    pub fn new(storage: Arc<dyn Storage>, cache_dir: impl Into<String>) -> Self {
        Self {
            storage,
            cache_dir: cache_dir.into(),
        }
    }

    /// Returns the logical path for a record key.
    pub fn record_path(&self, key: &str) -> String {
        bale_common::join_path(&self.cache_dir, key)
    }

    /// The storage adapter records are kept in.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// The directory records are kept in.
    pub fn cache_dir(&self) -> &str {
        &self.cache_dir
    }

    /// Writes a record, creating the cache directory if needed.
    pub fn write<R: Record>(&self, key: &str, record: &R) -> Result<(), CacheError> {
        let path = self.record_path(key);
        let bytes = encode(record, &path)?;
        self.storage.make_directories(&self.cache_dir)?;
        self.storage.write(&path, &bytes)?;
        Ok(())
    }

    /// Reads a record.
    ///
    /// Returns `Ok(None)` if no record exists, and an error if it exists but
    /// fails validation.
    pub fn read<R: Record>(&self, key: &str) -> Result<Option<R>, CacheError> {
        let path = self.record_path(key);
        if !self.storage.exists(&path) {
            return Ok(None);
        }
        let raw = self.storage.read(&path)?;
        decode(&raw, &path).map(Some)
    }
}

/// Encodes a record: header length + header + payload.
pub fn encode<R: Record>(record: &R, path: &str) -> Result<Vec<u8>, CacheError> {
    let serialization = |e: bincode::error::EncodeError| CacheError::Serialization {
        path: path.to_string(),
        reason: e.to_string(),
    };
    let payload =
        bincode::serde::encode_to_vec(record, bincode::config::standard()).map_err(serialization)?;

    let header = RecordHeader {
        magic: RECORD_MAGIC,
        format_version: RECORD_FORMAT_VERSION,
        kind: R::KIND,
        bale_version: env!("CARGO_PKG_VERSION").to_string(),
        checksum: ContentHash::from_bytes(&payload),
    };
    let header_bytes =
        bincode::serde::encode_to_vec(&header, bincode::config::standard()).map_err(serialization)?;

    let header_len = header_bytes.len() as u32;
    let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&payload);
    Ok(output)
}

/// Decodes and validates a record.
pub fn decode<R: Record>(raw: &[u8], path: &str) -> Result<R, CacheError> {
    let invalid = |reason: &str| CacheError::InvalidHeader {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if raw.len() < 4 {
        return Err(invalid("record shorter than the header length prefix"));
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&raw[..4]);
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    let header_end = match 4usize.checked_add(header_len) {
        Some(end) if end <= raw.len() => end,
        _ => return Err(invalid("truncated header")),
    };
    if header_len > MAX_HEADER_BYTES {
        return Err(invalid("header exceeds the size limit"));
    }

    let (header, _): (RecordHeader, usize) = bincode::serde::decode_from_slice(
        &raw[4..header_end],
        bincode::config::standard().with_limit::<MAX_HEADER_BYTES>(),
    )
    .map_err(|e| invalid(&e.to_string()))?;

    if header.magic != RECORD_MAGIC {
        return Err(invalid("missing magic bytes"));
    }
    if header.format_version != RECORD_FORMAT_VERSION {
        return Err(CacheError::VersionMismatch {
            path: path.to_string(),
            expected: RECORD_FORMAT_VERSION,
            actual: header.format_version,
        });
    }
    if header.kind != R::KIND {
        return Err(invalid(&format!(
            "expected a {:?} record, found {:?}",
            R::KIND,
            header.kind
        )));
    }

    let payload = &raw[header_end..];
    let actual = ContentHash::from_bytes(payload);
    if actual != header.checksum {
        return Err(CacheError::ChecksumMismatch {
            path: path.to_string(),
            expected: header.checksum.to_string(),
            actual: actual.to_string(),
        });
    }

    let (record, _): (R, usize) =
        bincode::serde::decode_from_slice(
            payload,
            bincode::config::standard().with_limit::<MAX_RECORD_BYTES>(),
        )
        .map_err(|e| CacheError::Serialization {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    Ok(record)
}
