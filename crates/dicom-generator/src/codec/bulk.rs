//! Out-of-band storage for large binary payloads.
//!
//! The JSON codec inlines binary values as base64 until they pass the bulk
//! data threshold; beyond it a [`BulkDataSink`] stores the bytes and the
//! document carries only a `BulkDataURI`. Decoding resolves that URI through
//! a [`BulkDataSource`].

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::BulkDataError;
use crate::limits::MAX_ELEMENT_LEN;
use crate::model::Tag;

/// Stores payloads and hands back a URI for each.
pub trait BulkDataSink {
    fn store(&mut self, tag: Tag, bytes: &[u8]) -> Result<String, BulkDataError>;
}

/// Resolves URIs produced by a [`BulkDataSink`].
pub trait BulkDataSource {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, BulkDataError>;
}

/// Keeps payloads in memory under `bulk:<n>` URIs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBulkStore {
    payloads: FxHashMap<String, Vec<u8>>,
    next: usize,
}

impl InMemoryBulkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

impl BulkDataSink for InMemoryBulkStore {
    fn store(&mut self, _tag: Tag, bytes: &[u8]) -> Result<String, BulkDataError> {
        let uri = format!("bulk:{}", self.next);
        self.next += 1;
        self.payloads.insert(uri.clone(), bytes.to_vec());
        Ok(uri)
    }
}

impl BulkDataSource for InMemoryBulkStore {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, BulkDataError> {
        self.payloads
            .get(uri)
            .cloned()
            .ok_or_else(|| BulkDataError::NotFound {
                uri: uri.to_string(),
            })
    }
}

/// Writes each payload zstd-compressed to `<dir>/<TAG>-<n>.bin.zst`.
///
/// The directory is created on the first store. URIs are file names
/// relative to the directory; anything that would escape it is rejected.
#[derive(Debug, Clone)]
pub struct DirectoryBulkStore {
    dir: PathBuf,
    level: i32,
    next: usize,
}

impl DirectoryBulkStore {
    /// Default zstd compression level.
    pub const DEFAULT_LEVEL: i32 = 3;

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            level: Self::DEFAULT_LEVEL,
            next: 0,
        }
    }

    /// Sets the zstd compression level.
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, uri: &str) -> Result<PathBuf, BulkDataError> {
        if uri.is_empty() || uri.contains(['/', '\\']) || uri.contains("..") {
            return Err(BulkDataError::NotFound {
                uri: uri.to_string(),
            });
        }
        Ok(self.dir.join(uri))
    }
}

impl BulkDataSink for DirectoryBulkStore {
    fn store(&mut self, tag: Tag, bytes: &[u8]) -> Result<String, BulkDataError> {
        let uri = format!("{}-{}.bin.zst", tag.to_hex(), self.next);
        self.next += 1;

        let compressed = zstd::encode_all(bytes, self.level).map_err(|e| {
            BulkDataError::Compression {
                uri: uri.clone(),
                message: e.to_string(),
            }
        })?;
        let path = self.dir.join(&uri);
        fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(&path, &compressed))
            .map_err(|e| BulkDataError::Io {
                uri: uri.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            path = %path.display(),
            raw = bytes.len(),
            compressed = compressed.len(),
            "stored bulk data"
        );
        Ok(uri)
    }
}

impl BulkDataSource for DirectoryBulkStore {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, BulkDataError> {
        let path = self.path_for(uri)?;
        let file = fs::File::open(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BulkDataError::NotFound {
                uri: uri.to_string(),
            },
            _ => BulkDataError::Io {
                uri: uri.to_string(),
                message: e.to_string(),
            },
        })?;

        let decoder = zstd::Decoder::new(file).map_err(|e| BulkDataError::Compression {
            uri: uri.to_string(),
            message: e.to_string(),
        })?;
        let mut decompressed = Vec::new();
        decoder
            .take(MAX_ELEMENT_LEN as u64 + 1)
            .read_to_end(&mut decompressed)
            .map_err(|e| BulkDataError::Compression {
                uri: uri.to_string(),
                message: e.to_string(),
            })?;
        if decompressed.len() > MAX_ELEMENT_LEN {
            return Err(BulkDataError::Compression {
                uri: uri.to_string(),
                message: format!("payload exceeds {MAX_ELEMENT_LEN} bytes"),
            });
        }

        tracing::debug!(path = %path.display(), len = decompressed.len(), "loaded bulk data");
        Ok(decompressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0010);

    #[test]
    fn test_in_memory_store() {
        let mut store = InMemoryBulkStore::new();
        let a = store.store(PIXEL_DATA, b"first").unwrap();
        let b = store.store(PIXEL_DATA, b"second").unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.fetch(&a).unwrap(), b"first");
        assert_eq!(store.fetch(&b).unwrap(), b"second");
        assert!(matches!(store.fetch("bulk:99"), Err(BulkDataError::NotFound { .. })));
    }

    #[test]
    fn test_directory_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirectoryBulkStore::new(dir.path());
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

        let uri = store.store(PIXEL_DATA, &payload).unwrap();
        assert_eq!(uri, "7FE00010-0.bin.zst");
        assert!(dir.path().join(&uri).exists());
        assert_eq!(store.fetch(&uri).unwrap(), payload);
    }

    #[test]
    fn test_directory_created_on_first_store() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("image_bulk");
        let mut store = DirectoryBulkStore::new(&target);
        assert!(!target.exists());

        let uri = store.store(PIXEL_DATA, b"payload").unwrap();
        assert!(target.join(&uri).exists());
        assert_eq!(store.fetch(&uri).unwrap(), b"payload");
    }

    #[test]
    fn test_directory_store_rejects_escaping_uris() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryBulkStore::new(dir.path());
        for uri in ["../secret", "a/b.bin.zst", "a\\b", ""] {
            assert!(matches!(store.fetch(uri), Err(BulkDataError::NotFound { .. })));
        }
        assert!(matches!(
            store.fetch("7FE00010-5.bin.zst"),
            Err(BulkDataError::NotFound { .. })
        ));
    }
}
