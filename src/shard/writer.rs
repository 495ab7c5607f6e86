//! [`ShardedWriter`]: fans sorted input out across N shard files (§4.9).

use std::path::{Path, PathBuf};

use crate::config::TableConfig;
use crate::error::{Error, Result};
use crate::sstable::SstWriter;

use super::{ShardingFunction, shard_file_name};

/// Builds a sharded table: `num_shards` independent SST files, each
/// named `<base>-%05d-of-%05d.sst`.
///
/// Like [`SstWriter`], a `ShardedWriter` is single-threaded: the caller
/// streams sorted `(key, value)` pairs and the writer routes each to its
/// shard via `sharder.shard_of`. Keys routed to the same shard must
/// still arrive in non-decreasing order (the per-shard writer enforces
/// this), but keys may interleave freely across shards.
pub struct ShardedWriter<S: ShardingFunction> {
    sharder: S,
    num_shards: u32,
    writers: Vec<Option<SstWriter>>,
    base_path: PathBuf,
}

impl<S: ShardingFunction> ShardedWriter<S> {
    /// Creates one `SstWriter` per shard under `dir`, named from `base`.
    pub fn create(dir: impl AsRef<Path>, base: &str, num_shards: u32, sharder: S, config: TableConfig) -> Result<Self> {
        if num_shards == 0 {
            return Err(Error::invalid_input("numShards must be > 0"));
        }
        let dir = dir.as_ref();
        let mut writers = Vec::with_capacity(num_shards as usize);
        for shard_index in 0..num_shards {
            let file_name = shard_file_name(base, shard_index, num_shards);
            let mut writer = SstWriter::create(dir.join(&file_name), config.clone())?;
            writer.set_shard_metadata(sharder.name(), sharder.config(), num_shards);
            writers.push(Some(writer));
        }
        Ok(Self {
            sharder,
            num_shards,
            writers,
            base_path: dir.join(base),
        })
    }

    /// Routes `(key, value)` to its shard via `shardOf`.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let shard = self.sharder.shard_of(key, self.num_shards) as usize;
        let writer = self.writers[shard]
            .as_mut()
            .expect("shard writer taken before finish");
        writer.add(key, value)
    }

    /// Finishes and atomically publishes every shard file.
    pub fn finish(mut self) -> Result<()> {
        for slot in &mut self.writers {
            if let Some(writer) = slot.take() {
                writer.finish()?;
            }
        }
        Ok(())
    }

    /// The directory-relative base path shards were created under.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}
