use std::sync::Arc;

use crate::cache::{BlockCache, CacheKey};

#[test]
fn total_bytes_stays_within_budget_under_load() {
    let max_bytes = 1024 * 1024;
    let cache = BlockCache::new(max_bytes, 16);
    let block = vec![0xABu8; 8 * 1024];

    for i in 0..1000u64 {
        cache.put(CacheKey::new("/tmp/table.sst", i * 8192), Arc::from(block.clone()));
    }

    // Per-segment eviction keeps each segment at or under its own budget,
    // so the process-wide total stays at or under the configured ceiling.
    assert!(cache.total_bytes() <= max_bytes);
}

#[test]
fn recently_used_entry_survives_eviction_pressure() {
    let cache = BlockCache::new(64 * 1024, 1); // single segment forces eviction
    let block = |n: u8| vec![n; 4096];

    let hot_key = CacheKey::new("/tmp/table.sst", 0);
    cache.put(hot_key.clone(), Arc::from(block(1)));

    for i in 1..30u64 {
        // Touch the hot key between insertions to keep it most-recently-used.
        let _ = cache.get(&hot_key);
        cache.put(CacheKey::new("/tmp/table.sst", i * 4096), Arc::from(block(2)));
    }

    assert!(cache.get(&hot_key).is_some());
}

#[test]
fn oldest_entry_is_evicted_first_within_a_segment() {
    let cache = BlockCache::new(3 * 4096, 1);
    let block = vec![1u8; 4096];

    let k0 = CacheKey::new("/tmp/t.sst", 0);
    let k1 = CacheKey::new("/tmp/t.sst", 4096);
    let k2 = CacheKey::new("/tmp/t.sst", 8192);
    let k3 = CacheKey::new("/tmp/t.sst", 12288);

    cache.put(k0.clone(), Arc::from(block.clone()));
    cache.put(k1.clone(), Arc::from(block.clone()));
    cache.put(k2.clone(), Arc::from(block.clone()));
    // Budget now full; inserting a fourth block evicts k0 (least recently used).
    cache.put(k3.clone(), Arc::from(block.clone()));

    assert!(cache.get(&k0).is_none());
    assert!(cache.get(&k1).is_some());
    assert!(cache.get(&k2).is_some());
    assert!(cache.get(&k3).is_some());
}
