//! Sorted String Table (SST) format — immutable, sorted, on-disk key/value
//! tables (§3, §4.6, §4.7).
//!
//! An SST is a sequence of framed blocks (data, filter, index, meta)
//! followed by a fixed-size footer. Data is keyed by opaque byte strings
//! in unsigned lexicographic order; this module owns the structures
//! shared by [`writer`] and [`reader`] — the footer and index entries —
//! while the actual file I/O lives in those two submodules.

pub mod reader;
pub mod writer;

#[cfg(test)]
mod tests;

pub use reader::SstReader;
pub use writer::SstWriter;

use crate::codec::be;
use crate::error::{Error, Result};

/// Footer magic: the ASCII-derived constant `0x415453535441424C` ("LBATSTLA").
pub const FOOTER_MAGIC: u64 = 0x4154_5353_5441_424C;

/// Fixed on-disk footer size, in bytes (§3).
pub const FOOTER_SIZE: usize = 48;

/// Number of zero-filled reserved bytes at the start of a new SST file,
/// for a possible future superblock (§4.6 step 1).
pub const HEADER_PAD_SIZE: u64 = 64;

/// The fixed-size trailer written last, recording the offsets/lengths of
/// the filter, index, and meta blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub index_offset: u64,
    pub index_length: u32,
    pub filter_offset: u64,
    pub filter_length: u32,
    pub meta_offset: u64,
    pub meta_length: u32,
}

impl Footer {
    pub fn encode(&self) -> [u8; FOOTER_SIZE] {
        let mut buf = Vec::with_capacity(FOOTER_SIZE);
        be::write_u64(&mut buf, self.index_offset);
        be::write_u32(&mut buf, self.index_length);
        be::write_u64(&mut buf, self.filter_offset);
        be::write_u32(&mut buf, self.filter_length);
        be::write_u64(&mut buf, self.meta_offset);
        be::write_u32(&mut buf, self.meta_length);
        be::write_u64(&mut buf, FOOTER_MAGIC);
        buf.try_into().expect("footer is exactly FOOTER_SIZE bytes")
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != FOOTER_SIZE {
            return Err(Error::corruption("footer", "wrong footer size"));
        }
        let magic = be::read_u64(&buf[44..48])?;
        if magic != FOOTER_MAGIC {
            return Err(Error::corruption("footer", "bad footer magic"));
        }
        Ok(Self {
            index_offset: be::read_u64(&buf[0..8])?,
            index_length: be::read_u32(&buf[8..12])?,
            filter_offset: be::read_u64(&buf[12..20])?,
            filter_length: be::read_u32(&buf[20..24])?,
            meta_offset: be::read_u64(&buf[24..32])?,
            meta_length: be::read_u32(&buf[32..36])?,
        })
    }
}

/// One entry of the index block: the first key of a data block, and
/// where to find that block in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub first_key: Vec<u8>,
    pub offset: u64,
    pub length: u32,
}

/// Encodes the index block payload: for each entry,
/// `varint(keyLen), keyBytes, u64 offset, u32 length` (§4.6).
pub fn encode_index(entries: &[IndexEntry]) -> Vec<u8> {
    let mut buf = Vec::new();
    for entry in entries {
        crate::codec::write_varint(&mut buf, entry.first_key.len() as u32);
        buf.extend_from_slice(&entry.first_key);
        be::write_u64(&mut buf, entry.offset);
        be::write_u32(&mut buf, entry.length);
    }
    buf
}

/// Decodes the index block payload produced by [`encode_index`].
pub fn decode_index(buf: &[u8]) -> Result<Vec<IndexEntry>> {
    let mut entries = Vec::new();
    let mut offset = 0usize;
    while offset < buf.len() {
        let (key_len, n) = crate::codec::read_varint(&buf[offset..])?;
        offset += n;
        let key_end = offset + key_len as usize;
        if key_end + 12 > buf.len() {
            return Err(Error::corruption("index block", "entry runs past buffer"));
        }
        let first_key = buf[offset..key_end].to_vec();
        offset = key_end;
        let block_offset = be::read_u64(&buf[offset..offset + 8])?;
        offset += 8;
        let length = be::read_u32(&buf[offset..offset + 4])?;
        offset += 4;
        entries.push(IndexEntry {
            first_key,
            offset: block_offset,
            length,
        });
    }
    Ok(entries)
}

/// Binary-searches `entries` (sorted by `first_key`) for the greatest
/// entry with `first_key <= key`.
pub fn locate_block(entries: &[IndexEntry], key: &[u8]) -> Option<usize> {
    if entries.is_empty() {
        return None;
    }
    match entries.binary_search_by(|e| e.first_key.as_slice().cmp(key)) {
        Ok(i) => Some(i),
        Err(0) => None,
        Err(i) => Some(i - 1),
    }
}

/// Small text meta-block payload: sharder name, config, and counts
/// (§4.6 step "emit the meta block").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableMeta {
    pub entry_count: u64,
    pub unique_key_count: u64,
    pub sharder_name: String,
    pub sharder_config: Vec<u8>,
    pub num_shards: u32,
    pub creator: String,
}

impl TableMeta {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        be::write_u64(&mut buf, self.entry_count);
        be::write_u64(&mut buf, self.unique_key_count);
        crate::codec::write_varint(&mut buf, self.sharder_name.len() as u32);
        buf.extend_from_slice(self.sharder_name.as_bytes());
        crate::codec::write_varint(&mut buf, self.sharder_config.len() as u32);
        buf.extend_from_slice(&self.sharder_config);
        be::write_u32(&mut buf, self.num_shards);
        crate::codec::write_varint(&mut buf, self.creator.len() as u32);
        buf.extend_from_slice(self.creator.as_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut offset = 0usize;
        let entry_count = be::read_u64(&buf[offset..offset + 8])?;
        offset += 8;
        let unique_key_count = be::read_u64(&buf[offset..offset + 8])?;
        offset += 8;

        let (name_len, n) = crate::codec::read_varint(&buf[offset..])?;
        offset += n;
        let name_end = offset + name_len as usize;
        let sharder_name = String::from_utf8(buf[offset..name_end].to_vec())
            .map_err(|_| Error::corruption("meta block", "sharder name is not utf-8"))?;
        offset = name_end;

        let (cfg_len, n) = crate::codec::read_varint(&buf[offset..])?;
        offset += n;
        let cfg_end = offset + cfg_len as usize;
        let sharder_config = buf[offset..cfg_end].to_vec();
        offset = cfg_end;

        let num_shards = be::read_u32(&buf[offset..offset + 4])?;
        offset += 4;

        let (creator_len, n) = crate::codec::read_varint(&buf[offset..])?;
        offset += n;
        let creator_end = offset + creator_len as usize;
        let creator = String::from_utf8(buf[offset..creator_end].to_vec())
            .map_err(|_| Error::corruption("meta block", "creator is not utf-8"))?;

        Ok(Self {
            entry_count,
            unique_key_count,
            sharder_name,
            sharder_config,
            num_shards,
            creator,
        })
    }
}

/// Summary returned by [`reader::SstReader::metadata`] / a sharded
/// reader's metadata (§6 library surface).
#[derive(Debug, Clone)]
pub struct Metadata {
    pub entries: u64,
    pub unique_keys: u64,
    pub num_shards: u32,
    pub sharder_name: String,
    pub path: std::path::PathBuf,
}
