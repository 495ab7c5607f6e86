//! The outer block framing shared by every block type on disk (§3, §4.6).
//!
//! A "block variant" (data/index/filter/meta) is not a class hierarchy —
//! all four share one 12-byte header + CRC32C trailer framing,
//! parameterized only by [`BlockType`]. [`write_framed`] and
//! [`read_framed`] are the one framing function called for in §9
//! ("no inheritance").

pub mod builder;
pub mod reader;

#[cfg(test)]
mod tests;

pub use builder::BlockBuilder;
pub use reader::BlockReader;

use crate::codec::{be, crc32c};
use crate::compress::Codec;
use crate::error::{Error, Result};

/// Size in bytes of the outer block header (§3).
pub const BLOCK_HEADER_SIZE: usize = 12;

/// Size in bytes of the CRC32C trailer.
pub const BLOCK_CRC_SIZE: usize = 4;

/// Block type tag stored in the outer header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// A data block: prefix-compressed key/value entries.
    Data = 0,
    /// The index block: sorted `(firstKey, offset, length)` entries.
    Index = 1,
    /// The bloom filter block.
    Filter = 2,
    /// The meta (properties) block.
    Meta = 3,
}

impl BlockType {
    fn from_u8(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Data),
            1 => Ok(Self::Index),
            2 => Ok(Self::Filter),
            3 => Ok(Self::Meta),
            other => Err(Error::corruption(
                "block header",
                format!("unknown block type tag {other}"),
            )),
        }
    }
}

/// Bit 0 of the header's `flags` byte: the payload is compressed.
pub const FLAG_COMPRESSED: u8 = 0b0000_0001;

/// A decoded block record: its type, whether the on-disk payload was
/// compressed, and the raw (already decompressed) bytes.
#[derive(Debug)]
pub struct FramedBlock {
    /// The block's declared type.
    pub block_type: BlockType,
    /// Decompressed payload bytes, ready for the caller to interpret.
    pub payload: Vec<u8>,
}

/// Frames and writes one block: header, payload, CRC32C trailer, in that
/// order (§4.6 "Block emission procedure").
///
/// `raw` is the uncompressed payload. If `codec` is `Some`, compression is
/// attempted and used only if it strictly shrinks the payload; otherwise
/// the raw bytes are stored and the compressed flag is cleared.
///
/// Returns the fully framed bytes (header ‖ payload ‖ crc).
pub fn write_framed(
    block_type: BlockType,
    raw: &[u8],
    codec: Option<(&dyn Codec, i32)>,
) -> Result<Vec<u8>> {
    let (payload, compressed) = match codec {
        Some((codec, level)) => {
            let candidate = codec.compress(raw, level)?;
            if candidate.len() < raw.len() {
                (candidate, true)
            } else {
                (raw.to_vec(), false)
            }
        }
        None => (raw.to_vec(), false),
    };

    let mut header = Vec::with_capacity(BLOCK_HEADER_SIZE);
    be::write_u32(&mut header, payload.len() as u32);
    be::write_u32(&mut header, raw.len() as u32);
    header.push(block_type as u8);
    header.push(if compressed { FLAG_COMPRESSED } else { 0 });
    be::write_u16(&mut header, 0); // reserved

    let mut framed = Vec::with_capacity(BLOCK_HEADER_SIZE + payload.len() + BLOCK_CRC_SIZE);
    framed.extend_from_slice(&header);
    framed.extend_from_slice(&payload);
    let crc = crc32c(&framed);
    be::write_u32(&mut framed, crc);

    Ok(framed)
}

/// Parses and verifies a framed block exactly as written by
/// [`write_framed`], decompressing the payload if the compressed flag is
/// set.
///
/// `bytes` must be the full framed record: header ‖ payload ‖ crc.
pub fn read_framed(bytes: &[u8], codec: &dyn Codec) -> Result<FramedBlock> {
    if bytes.len() < BLOCK_HEADER_SIZE + BLOCK_CRC_SIZE {
        return Err(Error::corruption("block header", "block truncated"));
    }

    let crc_offset = bytes.len() - BLOCK_CRC_SIZE;
    let stored_crc = be::read_u32(&bytes[crc_offset..])?;
    let computed_crc = crc32c(&bytes[..crc_offset]);
    if stored_crc != computed_crc {
        return Err(Error::corruption("block header", "block CRC"));
    }

    let compressed_size = be::read_u32(&bytes[0..4])? as usize;
    let uncompressed_size = be::read_u32(&bytes[4..8])? as usize;
    let block_type = BlockType::from_u8(bytes[8])?;
    let flags = bytes[9];
    if flags & !FLAG_COMPRESSED != 0 {
        return Err(Error::corruption("block header", "unknown block flags"));
    }
    let compressed = flags & FLAG_COMPRESSED != 0;

    let payload_start = BLOCK_HEADER_SIZE;
    let payload_end = payload_start + compressed_size;
    if payload_end > crc_offset {
        return Err(Error::corruption("block header", "block truncated"));
    }
    let payload_bytes = &bytes[payload_start..payload_end];

    let payload = if compressed {
        codec.decompress(payload_bytes, uncompressed_size)?
    } else {
        if payload_bytes.len() != uncompressed_size {
            return Err(Error::corruption(
                "block header",
                "decompressed size mismatch",
            ));
        }
        payload_bytes.to_vec()
    };

    Ok(FramedBlock {
        block_type,
        payload,
    })
}
