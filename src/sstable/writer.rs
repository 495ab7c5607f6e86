//! SST writer (§4.6): assembles data blocks, the filter, index, and meta
//! blocks, and the footer, then atomically publishes the file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::block::{BlockBuilder, BlockType, write_framed};
use crate::bloom::BloomFilter;
use crate::compress::ZstdCodec;
use crate::config::TableConfig;
use crate::error::{Error, Result};

use super::{Footer, HEADER_PAD_SIZE, IndexEntry, TableMeta, encode_index};

/// Builds a complete SST file on disk.
///
/// A writer is single-threaded: exactly one caller streams entries into
/// one instance (§5). On any failure before [`SstWriter::finish`]
/// completes, the `.tmp` file is removed and the final path never comes
/// into existence.
pub struct SstWriter {
    final_path: PathBuf,
    tmp_path: PathBuf,
    file: Option<BufWriter<File>>,
    offset: u64,
    config: TableConfig,
    codec: ZstdCodec,
    builder: BlockBuilder,
    current_block_first_key: Option<Vec<u8>>,
    last_key: Option<Vec<u8>>,
    index_entries: Vec<IndexEntry>,
    bloom: BloomFilter,
    entry_count: u64,
    unique_key_count: u64,
    sharder_name: String,
    sharder_config: Vec<u8>,
    num_shards: u32,
    finished: bool,
}

impl SstWriter {
    /// Creates a `.tmp` sibling of `path` and reserves the header pad.
    pub fn create(path: impl AsRef<Path>, config: TableConfig) -> Result<Self> {
        let final_path = path.as_ref().to_path_buf();
        let tmp_path = tmp_sibling(&final_path);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|e| Error::io(&tmp_path, e))?;
        let mut file = BufWriter::new(file);
        file.write_all(&vec![0u8; HEADER_PAD_SIZE as usize])
            .map_err(|e| Error::io(&tmp_path, e))?;

        let restart_interval = config.restart_interval;
        let bloom = BloomFilter::new(config.bloom_bits, config.bloom_hashes);

        Ok(Self {
            final_path,
            tmp_path,
            file: Some(file),
            offset: HEADER_PAD_SIZE,
            config,
            codec: ZstdCodec,
            builder: BlockBuilder::new(restart_interval),
            current_block_first_key: None,
            last_key: None,
            index_entries: Vec::new(),
            bloom,
            entry_count: 0,
            unique_key_count: 0,
            sharder_name: String::new(),
            sharder_config: Vec::new(),
            num_shards: 1,
            finished: false,
        })
    }

    /// Records the sharder identity for this shard's meta block (used by
    /// [`crate::shard::writer::ShardedWriter`]; single-file tables can
    /// leave this unset).
    pub fn set_shard_metadata(&mut self, sharder_name: &str, sharder_config: Vec<u8>, num_shards: u32) {
        self.sharder_name = sharder_name.to_string();
        self.sharder_config = sharder_config;
        self.num_shards = num_shards;
    }

    /// Appends one entry. `key` must be greater than or equal to the
    /// previously added key; a repeated key is allowed and is not
    /// deduplicated (§3).
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if let Some(last) = &self.last_key {
            if key < last.as_slice() {
                return Err(Error::invalid_input(
                    "sstable writer requires non-decreasing keys",
                ));
            }
            self.unique_key_count += if key == last.as_slice() { 0 } else { 1 };
        } else {
            self.unique_key_count += 1;
        }

        self.bloom.insert(key);
        if self.current_block_first_key.is_none() {
            self.current_block_first_key = Some(key.to_vec());
        }
        self.builder.add(key, value)?;
        self.last_key = Some(key.to_vec());
        self.entry_count += 1;

        if self.builder.estimated_size() >= self.config.block_size {
            self.flush_data_block()?;
        }
        Ok(())
    }

    fn flush_data_block(&mut self) -> Result<()> {
        if self.builder.is_empty() {
            return Ok(());
        }
        let restart_interval = self.config.restart_interval;
        let builder = std::mem::replace(&mut self.builder, BlockBuilder::new(restart_interval));
        let block_first_key = self
            .current_block_first_key
            .take()
            .expect("a non-empty builder always has a recorded first key");
        let payload = builder.finish();

        let framed = write_framed(BlockType::Data, &payload, Some((&self.codec, self.config.compression_level)))?;
        let offset = self.offset;
        self.write_raw(&framed)?;

        trace!(
            block_type = "data",
            offset,
            length = framed.len(),
            "flushed block"
        );

        self.index_entries.push(IndexEntry {
            first_key: block_first_key,
            offset,
            length: framed.len() as u32,
        });
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.file
            .as_mut()
            .expect("file taken before writer finished")
            .write_all(bytes)
            .map_err(|e| Error::io(&self.tmp_path, e))?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    /// Flushes any residual block, emits the filter/index/meta blocks and
    /// footer, and atomically publishes the file plus its `.bf` sidecar.
    pub fn finish(mut self) -> Result<()> {
        self.flush_data_block()?;

        let filter_bytes = self.bloom.encode();
        let filter_offset = self.offset;
        let framed_filter = write_framed(BlockType::Filter, &filter_bytes, None)?;
        self.write_raw(&framed_filter)?;
        trace!(block_type = "filter", offset = filter_offset, length = framed_filter.len(), "flushed block");

        let index_bytes = encode_index(&self.index_entries);
        let index_offset = self.offset;
        let framed_index = write_framed(BlockType::Index, &index_bytes, None)?;
        self.write_raw(&framed_index)?;
        trace!(block_type = "index", offset = index_offset, length = framed_index.len(), "flushed block");

        let meta = TableMeta {
            entry_count: self.entry_count,
            unique_key_count: self.unique_key_count,
            sharder_name: self.sharder_name.clone(),
            sharder_config: self.sharder_config.clone(),
            num_shards: self.num_shards,
            creator: "sstable-core".to_string(),
        };
        let meta_bytes = meta.encode();
        let meta_offset = self.offset;
        let framed_meta = write_framed(BlockType::Meta, &meta_bytes, None)?;
        self.write_raw(&framed_meta)?;
        trace!(block_type = "meta", offset = meta_offset, length = framed_meta.len(), "flushed block");

        let footer = Footer {
            index_offset,
            index_length: framed_index.len() as u32,
            filter_offset,
            filter_length: framed_filter.len() as u32,
            meta_offset,
            meta_length: framed_meta.len() as u32,
        };
        self.write_raw(&footer.encode())?;

        let mut buf_writer = self.file.take().expect("file taken before writer finished");
        buf_writer.flush().map_err(|e| Error::io(&self.tmp_path, e))?;
        let file = buf_writer.into_inner().map_err(|e| Error::io(&self.tmp_path, e.into_error()))?;
        file.sync_all().map_err(|e| Error::io(&self.tmp_path, e))?;
        drop(file);

        fs::rename(&self.tmp_path, &self.final_path).map_err(|e| Error::io(&self.final_path, e))?;
        fsync_parent_dir(&self.final_path)?;

        let bf_path = bf_sidecar_path(&self.final_path);
        fs::write(&bf_path, &filter_bytes).map_err(|e| Error::io(&bf_path, e))?;
        let bf_file = File::open(&bf_path).map_err(|e| Error::io(&bf_path, e))?;
        bf_file.sync_all().map_err(|e| Error::io(&bf_path, e))?;

        self.finished = true;
        Ok(())
    }
}

impl Drop for SstWriter {
    fn drop(&mut self) {
        if !self.finished {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

/// Derives `<path>.bf` from the final SST path (§3, §6).
pub fn bf_sidecar_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".bf");
    PathBuf::from(os)
}

fn fsync_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent).map_err(|e| Error::io(parent, e))?;
            dir.sync_all().map_err(|e| Error::io(parent, e))?;
        }
    }
    Ok(())
}
