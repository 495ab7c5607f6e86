//! Configuration knobs (§6): every tunable shared by the writer, reader,
//! and cache, with one `Default` impl.

use crate::bloom::{DEFAULT_BITS, DEFAULT_HASHES};
use crate::compress::DEFAULT_LEVEL;

/// Target pre-compression payload size of a data block, in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024;

/// Number of entries between restart points inside a data block.
pub const DEFAULT_RESTART_INTERVAL: u32 = 16;

/// Default block cache budget, in bytes.
pub const DEFAULT_CACHE_MAX_BYTES: u64 = 64 * 1024 * 1024;

/// Knobs shared by the writer, reader, and cache.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Target block payload size before a flush is triggered.
    pub block_size: usize,
    /// Number of entries between block restart points.
    pub restart_interval: u32,
    /// Zstd compression level used for data blocks.
    pub compression_level: i32,
    /// Bloom filter bit-array size.
    pub bloom_bits: u32,
    /// Bloom filter hash-probe count.
    pub bloom_hashes: u8,
    /// Block cache byte budget.
    pub cache_max_bytes: u64,
    /// Number of cache segments; `None` selects `clamp(nextPow2(2*cores), 8, 64)`.
    pub cache_segments: Option<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            restart_interval: DEFAULT_RESTART_INTERVAL,
            compression_level: DEFAULT_LEVEL,
            bloom_bits: DEFAULT_BITS,
            bloom_hashes: DEFAULT_HASHES,
            cache_max_bytes: DEFAULT_CACHE_MAX_BYTES,
            cache_segments: None,
        }
    }
}

impl TableConfig {
    /// Resolves `cache_segments`, applying the `clamp(nextPow2(2*cores), 8, 64)`
    /// default (§4.8) when unset.
    pub fn resolved_cache_segments(&self) -> usize {
        match self.cache_segments {
            Some(n) => n.next_power_of_two().max(1),
            None => {
                let cores = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4);
                (2 * cores).next_power_of_two().clamp(8, 64)
            }
        }
    }
}
