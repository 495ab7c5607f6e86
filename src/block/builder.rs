//! Data/index block construction with restart points (§4.4).
//!
//! Entries must be added in non-decreasing key order; the builder checks
//! this itself so a bug upstream is caught before it ever reaches disk.
//! A key may repeat across consecutive `add` calls; the builder does not
//! deduplicate (§3).

use crate::codec::{be, common_prefix_len, write_varint};
use crate::error::{Error, Result};

/// Builds one block's payload: a sequence of prefix-compressed entries
/// followed by a restart-offset array and a trailing count.
///
/// Every `restart_interval`-th entry is a "restart point": it stores its
/// key in full (`shared == 0`) so the reader can binary-search restart
/// first-keys without decoding every entry in between (§4.5).
pub struct BlockBuilder {
    restart_interval: u32,
    buf: Vec<u8>,
    restarts: Vec<u32>,
    last_key: Vec<u8>,
    entries_since_restart: u32,
    total_entries: usize,
    finished: bool,
}

impl BlockBuilder {
    /// Creates a builder that emits a restart point every
    /// `restart_interval` entries. A restart point is always emitted for
    /// the first entry.
    pub fn new(restart_interval: u32) -> Self {
        Self {
            restart_interval: restart_interval.max(1),
            buf: Vec::new(),
            restarts: Vec::new(),
            last_key: Vec::new(),
            entries_since_restart: 0,
            total_entries: 0,
            finished: false,
        }
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.total_entries
    }

    /// Whether any entries have been added.
    pub fn is_empty(&self) -> bool {
        self.total_entries == 0
    }

    /// Appends one entry. `key` must be greater than or equal to the
    /// previously added key.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        debug_assert!(!self.finished, "add() called after finish()");
        if self.total_entries > 0 && key < self.last_key.as_slice() {
            return Err(Error::invalid_input(
                "block entries must be added in non-decreasing key order",
            ));
        }

        let is_restart = self.restarts.is_empty() || self.entries_since_restart == self.restart_interval;
        let shared = if is_restart {
            0
        } else {
            common_prefix_len(&self.last_key, key)
        };
        let non_shared = &key[shared..];

        if is_restart {
            self.restarts.push(self.buf.len() as u32);
            self.entries_since_restart = 0;
        }

        write_varint(&mut self.buf, shared as u32);
        write_varint(&mut self.buf, non_shared.len() as u32);
        write_varint(&mut self.buf, value.len() as u32);
        self.buf.extend_from_slice(non_shared);
        self.buf.extend_from_slice(value);

        self.last_key.clear();
        self.last_key.extend_from_slice(key);
        self.entries_since_restart += 1;
        self.total_entries += 1;

        Ok(())
    }

    /// Rough current size of the block if finished right now. Callers use
    /// this to decide when to flush (§6: `block_size_target`).
    pub fn estimated_size(&self) -> usize {
        self.buf.len() + self.restarts.len() * 4 + 4
    }

    /// Appends the restart-offset array and entry count, consuming the
    /// builder and returning the finished block payload.
    pub fn finish(mut self) -> Vec<u8> {
        self.finished = true;
        for &offset in &self.restarts {
            be::write_u32(&mut self.buf, offset);
        }
        be::write_u32(&mut self.buf, self.restarts.len() as u32);
        self.buf
    }

    /// The most recently added key, or empty if none has been added yet.
    pub fn last_key(&self) -> &[u8] {
        &self.last_key
    }
}
