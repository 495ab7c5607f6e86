//! Pluggable block compression.
//!
//! A block is compressed only if doing so strictly shrinks it (§4.2); the
//! writer decides per block and records the outcome in the block header's
//! `flags` bit. The reader trusts that bit rather than guessing.

use crate::error::{Error, Result};

/// Default Zstd compression level (§6).
pub const DEFAULT_LEVEL: i32 = 3;

/// A block compression codec.
///
/// Implementations must be exact inverses of each other: decompressing
/// what was compressed returns the original bytes unchanged.
pub trait Codec: Send + Sync {
    /// Compresses `input` at the given `level`. The meaning of `level` is
    /// codec-specific.
    fn compress(&self, input: &[u8], level: i32) -> Result<Vec<u8>>;

    /// Decompresses `input`, which must expand to exactly
    /// `expected_uncompressed_size` bytes.
    ///
    /// Fails with [`Error::Corruption`] if the decompressed length does
    /// not match `expected_uncompressed_size`.
    fn decompress(&self, input: &[u8], expected_uncompressed_size: usize) -> Result<Vec<u8>>;
}

/// Zstandard codec — the default per §6.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZstdCodec;

impl Codec for ZstdCodec {
    fn compress(&self, input: &[u8], level: i32) -> Result<Vec<u8>> {
        zstd::bulk::compress(input, level)
            .map_err(|e| Error::corruption("zstd compress", e.to_string()))
    }

    fn decompress(&self, input: &[u8], expected_uncompressed_size: usize) -> Result<Vec<u8>> {
        let out = zstd::bulk::decompress(input, expected_uncompressed_size)
            .map_err(|e| Error::corruption("zstd decompress", e.to_string()))?;
        if out.len() != expected_uncompressed_size {
            return Err(Error::corruption(
                "zstd decompress",
                "decompressed size mismatch",
            ));
        }
        Ok(out)
    }
}
