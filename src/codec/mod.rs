//! Low-level wire primitives shared by every on-disk structure in this crate.
//!
//! This module owns exactly three things, deliberately kept separate from
//! any higher-level structured encoding:
//!
//! - **Varints** — unsigned LEB128, used for the `shared`/`nonShared`/
//!   `valueLen` triple prefixing each entry inside a data block.
//! - **CRC32C** — the Castagnoli polynomial, used to checksum every block
//!   record and the footer.
//! - **Fixed-width big-endian integers** — used for block headers, index
//!   entries, the footer, and restart arrays.
//!
//! Structured values (the footer, index entries, block headers) are encoded
//! by hand in [`crate::block`] and [`crate::sstable`] directly on top of
//! these primitives; there is no generic `Encode`/`Decode` trait here,
//! because the on-disk layout of every structure in this format is fixed
//! and small enough that a trait indirection buys nothing.

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};

/// Maximum encoded length of a varint in this format. A `u32` needs at
/// most five 7-bit groups (`ceil(32 / 7) == 5`); a sixth continuation
/// byte can only mean corrupted input.
pub const MAX_VARINT_LEN: usize = 5;

/// Appends `value` to `buf` as unsigned LEB128: little-endian 7-bit groups,
/// each byte's high bit set except the last.
pub fn write_varint(buf: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

/// Decodes a varint from the start of `buf`.
///
/// Returns `(value, bytesConsumed)`. Fails with
/// [`Error::Corruption`]`("varint too long")` if a sixth continuation byte
/// is encountered.
pub fn read_varint(buf: &[u8]) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(Error::corruption("varint", "varint too long"));
        }
        value |= u32::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }

    Err(Error::corruption(
        "varint",
        "buffer exhausted before varint terminated",
    ))
}

/// Castagnoli CRC32 (CRC32C) over `data`.
///
/// The on-disk value is the plain CRC32C output with no extra finalization
/// beyond the standard. Required for every on-disk block.
pub fn crc32c(data: &[u8]) -> u32 {
    crc32_castagnoli_table::hash(data)
}

/// Table-driven CRC32C (Castagnoli, polynomial `0x1EDC6F41`, reflected).
///
/// Hand-rolled rather than pulled from a crate: CRC32C (Castagnoli) is
/// distinct from the plain CRC-32 (IEEE) most general-purpose crates
/// expose, and this format's checksum must never change behavior because
/// of a dependency upgrade.
mod crc32_castagnoli_table {
    const POLY: u32 = 0x82f6_3b78; // reflected 0x1EDC6F41

    fn build_table() -> [u32; 256] {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                crc = if crc & 1 == 1 {
                    (crc >> 1) ^ POLY
                } else {
                    crc >> 1
                };
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    }

    pub fn hash(data: &[u8]) -> u32 {
        // Built once per call; the table is 1 KiB and this format never
        // hashes in a hot enough loop to need a lazily-cached static.
        let table = build_table();
        let mut crc = u32::MAX;
        for &byte in data {
            let idx = ((crc ^ u32::from(byte)) & 0xff) as usize;
            crc = table[idx] ^ (crc >> 8);
        }
        !crc
    }
}

/// Big-endian fixed-width integer helpers used for headers, index entries,
/// the footer, and restart arrays.
pub mod be {
    use super::{Error, Result};

    /// Appends `value` as a big-endian `u16`.
    pub fn write_u16(buf: &mut Vec<u8>, value: u16) {
        buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends `value` as a big-endian `u32`.
    pub fn write_u32(buf: &mut Vec<u8>, value: u32) {
        buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends `value` as a big-endian `u64`.
    pub fn write_u64(buf: &mut Vec<u8>, value: u64) {
        buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Reads a big-endian `u16` from the start of `buf`.
    pub fn read_u16(buf: &[u8]) -> Result<u16> {
        let bytes: [u8; 2] = buf
            .get(..2)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Error::corruption("be::read_u16", "buffer too short"))?;
        Ok(u16::from_be_bytes(bytes))
    }

    /// Reads a big-endian `u32` from the start of `buf`.
    pub fn read_u32(buf: &[u8]) -> Result<u32> {
        let bytes: [u8; 4] = buf
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Error::corruption("be::read_u32", "buffer too short"))?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Reads a big-endian `u64` from the start of `buf`.
    pub fn read_u64(buf: &[u8]) -> Result<u64> {
        let bytes: [u8; 8] = buf
            .get(..8)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Error::corruption("be::read_u64", "buffer too short"))?;
        Ok(u64::from_be_bytes(bytes))
    }
}

/// Returns the length of the longest common prefix of `a` and `b`.
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}
