//! Shared error taxonomy for the SST core.
//!
//! Every module in this crate (codec, bloom, block, sstable, cache, shard)
//! reports failures through this single [`Error`] enum rather than a
//! per-module error type, because the taxonomy itself — `Io`, `Corruption`,
//! `InvalidInput` — is part of the public contract, not an implementation
//! detail of any one subsystem.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by SST core operations.
///
/// `get` returning "no such key" is `Ok(None)`, never an `Err` — see the
/// `NotFound` discussion on [`Error`] below. There is deliberately no
/// `NotFound` variant here; absence of a key is represented in-band by
/// `Option::None` at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Underlying read/write/rename/fsync failure. Propagated with the
    /// path that was being operated on, when known.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path the failing operation was acting on, if known.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A plain I/O error with no associated path (e.g. a generic seek
    /// failure deep inside a helper that doesn't carry a path).
    #[error("I/O error: {0}")]
    PathlessIo(#[from] io::Error),

    /// CRC mismatch, bad magic, truncated block, decompressed-size
    /// mismatch, varint overflow, unsorted keys on read, shard manifest
    /// skew — anything indicating the bytes on disk are not what this
    /// format requires.
    #[error("corruption at {context}: {detail}")]
    Corruption {
        /// Where the corruption was detected (path, block offset, field name).
        context: String,
        /// Human-readable description of what failed.
        detail: String,
    },

    /// Caller supplied input the format cannot represent: out-of-order
    /// writer keys, an oversized block, `numShards == 0`, an unknown
    /// sharder name, etc.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Build a [`Error::Corruption`] with a formatted context string.
    pub fn corruption(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Corruption {
            context: context.into(),
            detail: detail.into(),
        }
    }

    /// Build an [`Error::InvalidInput`].
    pub fn invalid_input(detail: impl Into<String>) -> Self {
        Error::InvalidInput(detail.into())
    }

    /// Attach a path to an I/O failure.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
