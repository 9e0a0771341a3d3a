use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use hyper::body::Bytes;
use parking_lot::RwLock;

use crate::EntityTag;

/// Metadata and contents of a file small enough to keep in memory.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// Size in bytes when the file was read.
    pub size: u64,
    /// Modification time when the file was read.
    pub modified: Option<SystemTime>,
    /// Strong tag over the contents.
    pub etag: EntityTag,
    /// Complete file contents.
    pub contents: Bytes,
}

/// Per-server cache of small files, keyed by resolved path.
///
/// Entries are never evicted or revalidated; a changed file is picked up on restart. Concurrent
/// misses for one path may both load the file, and the last insert wins. Both entries describe
/// the same contents, so either is correct. The lock is never held across an await point.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
}

impl MetadataCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry for a resolved path.
    pub fn get(&self, path: &Path) -> Option<CacheEntry> {
        self.entries.read().get(path).cloned()
    }

    /// Store the entry for a resolved path, replacing any previous one.
    pub fn insert(&self, path: PathBuf, entry: CacheEntry) {
        self.entries.write().insert(path, entry);
    }

    /// Whether an entry exists for a resolved path.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.read().contains_key(path)
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
