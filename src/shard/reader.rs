//! [`ShardedReader`]: routes lookups to the owning shard and multi-way
//! merges scans across shards (§4.9).

use std::path::Path;

use tracing::debug;

use crate::cache::BlockCache;
use crate::error::{Error, Result};
use crate::hash::murmur3_32;
use crate::sstable::SstReader;

use super::{ShardingFunction, shard_file_name};

/// An open sharded table: N [`SstReader`]s jointly behaving as one
/// logical table.
#[derive(Debug)]
pub struct ShardedReader<S: ShardingFunction> {
    sharder: S,
    num_shards: u32,
    readers: Vec<SstReader>,
}

impl<S: ShardingFunction> ShardedReader<S> {
    /// Opens all `num_shards` shard files under `dir` and verifies that
    /// every shard's meta block agrees on `(sharderName, config,
    /// numShards)`.
    pub fn open(dir: impl AsRef<Path>, base: &str, num_shards: u32, sharder: S) -> Result<Self> {
        let dir = dir.as_ref();
        let mut readers = Vec::with_capacity(num_shards as usize);
        for shard_index in 0..num_shards {
            let file_name = shard_file_name(base, shard_index, num_shards);
            readers.push(SstReader::open(dir.join(file_name))?);
        }

        let expected_name = sharder.name();
        let expected_config = sharder.config();
        for reader in &readers {
            let meta = reader.metadata();
            if meta.sharder_name != expected_name
                || meta.num_shards != num_shards
                || reader.sharder_config() != expected_config.as_slice()
            {
                return Err(Error::corruption(
                    "sharded reader open",
                    "shard manifest skew",
                ));
            }
        }

        Ok(Self {
            sharder,
            num_shards,
            readers,
        })
    }

    /// Computes `shardOf(key, N)` and delegates the lookup to that shard
    /// only.
    pub fn get(&self, key: &[u8], cache: &BlockCache) -> Result<Option<Vec<u8>>> {
        let shard = self.sharder.shard_of(key, self.num_shards) as usize;
        debug!(
            key_hash = murmur3_32(key, 0),
            shard,
            "routed sharded get"
        );
        self.readers[shard].get(key, cache)
    }

    /// Multi-way merges entries in `[start_key, end_key)` across every
    /// shard, in unsigned key order.
    pub fn scan(
        &self,
        start_key: Option<&[u8]>,
        end_key: Option<&[u8]>,
        cache: &BlockCache,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut merged = Vec::new();
        for shard in self.sharder.shards_for_range(start_key, end_key, self.num_shards) {
            merged.extend(self.readers[shard as usize].scan(start_key, end_key, cache)?);
        }
        merged.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(merged)
    }

    /// Number of shards in this table.
    pub fn num_shards(&self) -> u32 {
        self.num_shards
    }
}
