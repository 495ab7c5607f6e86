//! Segmented LRU block cache (§4.8).
//!
//! Keyed by `(file path, block offset)`, holding raw already-decompressed
//! block bytes. Splitting into independently locked segments means no
//! single global lock is ever held across the whole cache.

#[cfg(test)]
mod tests;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use tracing::trace;

use crate::hash::murmur3_32;

/// Cache key: the owning file's path plus the byte offset of the block
/// within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PathBuf,
    pub offset: u64,
}

impl CacheKey {
    pub fn new(path: impl Into<PathBuf>, offset: u64) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    fn hash(&self) -> u32 {
        let mut bytes = self.path.as_os_str().as_encoded_bytes().to_vec();
        bytes.extend_from_slice(&self.offset.to_le_bytes());
        murmur3_32(&bytes, 0)
    }
}

/// `spread(h) = h XOR (h >> 16)` (§4.8).
fn spread(h: u32) -> u32 {
    h ^ (h >> 16)
}

struct Segment {
    entries: LruCache<CacheKey, Arc<[u8]>>,
    bytes: u64,
    budget: u64,
}

impl Segment {
    fn new(budget: u64) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(usize::MAX).unwrap()),
            bytes: 0,
            budget,
        }
    }
}

/// A bounded, concurrent block cache split into `N` independently locked
/// segments.
pub struct BlockCache {
    segments: Vec<Mutex<Segment>>,
    mask: u32,
    total_bytes: AtomicU64,
}

impl BlockCache {
    /// Creates a cache with `max_bytes` total budget split evenly across
    /// `segments` segments. `segments` is rounded up to a power of two.
    pub fn new(max_bytes: u64, segments: usize) -> Self {
        let n = segments.max(1).next_power_of_two();
        let per_segment = max_bytes / n as u64;
        let segments = (0..n).map(|_| Mutex::new(Segment::new(per_segment))).collect();
        Self {
            segments,
            mask: n as u32 - 1,
            total_bytes: AtomicU64::new(0),
        }
    }

    fn segment_index(&self, key: &CacheKey) -> usize {
        (spread(key.hash()) & self.mask) as usize
    }

    /// Looks up `key`, moving it to most-recently-used on hit.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<[u8]>> {
        let idx = self.segment_index(key);
        let mut segment = self.segments[idx].lock().expect("cache segment lock poisoned");
        segment.entries.get(key).cloned()
    }

    /// Inserts `bytes` under `key`, evicting least-recently-used entries
    /// from the same segment until the segment's budget is restored.
    ///
    /// Entries larger than the segment's budget, or empty, are not
    /// inserted (§4.8).
    pub fn put(&self, key: CacheKey, bytes: Arc<[u8]>) {
        if bytes.is_empty() {
            return;
        }
        let idx = self.segment_index(&key);
        let len = bytes.len() as u64;

        let mut segment = self.segments[idx].lock().expect("cache segment lock poisoned");
        if len > segment.budget {
            return;
        }

        if let Some(old) = segment.entries.put(key, bytes) {
            segment.bytes = segment.bytes.saturating_sub(old.len() as u64);
        }
        segment.bytes += len;
        self.total_bytes.fetch_add(len, Ordering::Relaxed);

        while segment.bytes > segment.budget {
            match segment.entries.pop_lru() {
                Some((evicted_key, evicted_bytes)) => {
                    let freed = evicted_bytes.len() as u64;
                    segment.bytes = segment.bytes.saturating_sub(freed);
                    self.total_bytes.fetch_sub(freed, Ordering::Relaxed);
                    trace!(
                        segment = idx,
                        offset = evicted_key.offset,
                        freed_bytes = freed,
                        "evicted cache block"
                    );
                }
                None => break,
            }
        }
    }

    /// Removes `key` from the cache, if present.
    pub fn remove(&self, key: &CacheKey) {
        let idx = self.segment_index(key);
        let mut segment = self.segments[idx].lock().expect("cache segment lock poisoned");
        if let Some(bytes) = segment.entries.pop(key) {
            let freed = bytes.len() as u64;
            segment.bytes = segment.bytes.saturating_sub(freed);
            self.total_bytes.fetch_sub(freed, Ordering::Relaxed);
        }
    }

    /// Drops every entry in every segment.
    pub fn clear(&self) {
        for segment in &self.segments {
            let mut segment = segment.lock().expect("cache segment lock poisoned");
            segment.entries.clear();
            self.total_bytes.fetch_sub(segment.bytes, Ordering::Relaxed);
            segment.bytes = 0;
        }
    }

    /// Process-wide total bytes resident across all segments (§4.8
    /// "counters", for observability).
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    /// Number of segments in use.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}
