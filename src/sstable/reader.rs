//! SST reader (§4.7): opens a file, validates the footer, loads the
//! index and filter, and serves point and range queries through the
//! block cache.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;
use tracing::{debug, warn};

use crate::bloom::BloomFilter;
use crate::block::{BlockReader as RawBlockReader, BlockType, read_framed};
use crate::cache::{BlockCache, CacheKey};
use crate::compress::ZstdCodec;
use crate::error::{Error, Result};

use super::{FOOTER_SIZE, Footer, IndexEntry, Metadata, decode_index, locate_block};

/// An open, immutable SST file.
///
/// The whole file is memory-mapped at [`SstReader::open`]: blocks are
/// sliced straight out of `mmap` rather than re-read with a positional
/// file read, so concurrent `get`/`scan`/`might_contain` calls never
/// contend on a shared file cursor (§5).
///
/// # Safety
///
/// `unsafe { Mmap::map(...) }` is sound here because the file is never
/// written to after [`SstWriter::finish`](super::SstWriter::finish)
/// renames it into place, the mapping is read-only, and every slice
/// taken from it is bounds-checked against lengths read from the
/// footer/index before use.
#[derive(Debug)]
pub struct SstReader {
    path: PathBuf,
    mmap: Mmap,
    index: Vec<IndexEntry>,
    filter: BloomFilter,
    entry_count: u64,
    unique_key_count: u64,
    sharder_name: String,
    sharder_config: Vec<u8>,
    num_shards: u32,
    codec: ZstdCodec,
}

impl SstReader {
    /// Opens `path`, validates the footer magic, and loads the index and
    /// filter blocks into memory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(&path, e))?;
        let file_len = mmap.len();

        if file_len < FOOTER_SIZE {
            return Err(Error::corruption("sstable reader", "file smaller than footer"));
        }

        let footer_buf = slice_at(&mmap, (file_len - FOOTER_SIZE) as u64, FOOTER_SIZE)?;
        let footer = Footer::decode(footer_buf)?;

        let codec = ZstdCodec;

        let index_raw = slice_at(&mmap, footer.index_offset, footer.index_length as usize)?;
        let index_framed = read_framed(index_raw, &codec)?;
        if index_framed.block_type != BlockType::Index {
            return Err(Error::corruption("sstable reader", "index block has wrong type tag"));
        }
        let index = decode_index(&index_framed.payload)?;

        let filter_raw = slice_at(&mmap, footer.filter_offset, footer.filter_length as usize)?;
        let filter_framed = read_framed(filter_raw, &codec)?;
        if filter_framed.block_type != BlockType::Filter {
            return Err(Error::corruption("sstable reader", "filter block has wrong type tag"));
        }
        let filter = BloomFilter::decode(&filter_framed.payload)?;

        let meta_raw = slice_at(&mmap, footer.meta_offset, footer.meta_length as usize)?;
        let meta_framed = read_framed(meta_raw, &codec)?;
        if meta_framed.block_type != BlockType::Meta {
            return Err(Error::corruption("sstable reader", "meta block has wrong type tag"));
        }
        let meta = super::TableMeta::decode(&meta_framed.payload)?;

        debug!(
            path = %path.display(),
            file_size = file_len,
            index_entries = index.len(),
            bloom_bits = filter.m(),
            "opened sstable"
        );

        Ok(Self {
            path,
            mmap,
            index,
            filter,
            entry_count: meta.entry_count,
            unique_key_count: meta.unique_key_count,
            sharder_name: meta.sharder_name,
            sharder_config: meta.sharder_config,
            num_shards: meta.num_shards,
            codec,
        })
    }

    /// `Bloom.mightContain(key)`; `false` means the key is definitely
    /// absent from this table.
    pub fn might_contain(&self, key: &[u8]) -> bool {
        self.filter.might_contain(key)
    }

    /// Looks up `key`, consulting `cache` for the containing block
    /// before falling back to a file read.
    pub fn get(&self, key: &[u8], cache: &BlockCache) -> Result<Option<Vec<u8>>> {
        if !self.filter.might_contain(key) {
            return Ok(None);
        }
        let Some(idx) = locate_block(&self.index, key) else {
            return Ok(None);
        };

        let entry = &self.index[idx];
        let payload = self.load_block(entry, cache)?;
        let reader = RawBlockReader::new(&payload)?;
        Ok(reader.get(key)?.map(|e| e.value.to_vec()))
    }

    /// Iterates entries in `[start_key, end_key)` (either bound `None`
    /// means unbounded on that side), fetching blocks through `cache`.
    pub fn scan(
        &self,
        start_key: Option<&[u8]>,
        end_key: Option<&[u8]>,
        cache: &BlockCache,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let first_idx = match start_key {
            Some(key) => locate_block(&self.index, key).unwrap_or(0),
            None => 0,
        };

        let mut out = Vec::new();
        for entry in &self.index[first_idx..] {
            if let Some(end) = end_key {
                if entry.first_key.as_slice() >= end {
                    break;
                }
            }
            let payload = self.load_block(entry, cache)?;
            let reader = RawBlockReader::new(&payload)?;
            for decoded in reader.iter_from(start_key)? {
                if let Some(end) = end_key {
                    if decoded.key.as_slice() >= end {
                        break;
                    }
                }
                out.push((decoded.key, decoded.value.to_vec()));
            }
        }
        Ok(out)
    }

    fn load_block(&self, entry: &IndexEntry, cache: &BlockCache) -> Result<Arc<[u8]>> {
        let key = CacheKey::new(&self.path, entry.offset);
        if let Some(cached) = cache.get(&key) {
            return Ok(cached);
        }

        let raw = slice_at(&self.mmap, entry.offset, entry.length as usize)?;
        let framed = match read_framed(raw, &self.codec) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %self.path.display(), offset = entry.offset, error = %e, "corrupt data block");
                return Err(e);
            }
        };
        let bytes: Arc<[u8]> = Arc::from(framed.payload);
        cache.put(key, bytes.clone());
        Ok(bytes)
    }

    /// Returns a metadata summary (§6 library surface).
    pub fn metadata(&self) -> Metadata {
        Metadata {
            entries: self.entry_count,
            unique_keys: self.unique_key_count,
            num_shards: self.num_shards,
            sharder_name: self.sharder_name.clone(),
            path: self.path.clone(),
        }
    }

    /// Sharder configuration bytes recorded in this shard's meta block.
    pub fn sharder_config(&self) -> &[u8] {
        &self.sharder_config
    }
}

fn slice_at(mmap: &Mmap, offset: u64, len: usize) -> Result<&[u8]> {
    let start = offset as usize;
    let end = start
        .checked_add(len)
        .ok_or_else(|| Error::corruption("sstable reader", "block length overflow"))?;
    mmap.get(start..end)
        .ok_or_else(|| Error::corruption("sstable reader", "block runs past end of file"))
}
