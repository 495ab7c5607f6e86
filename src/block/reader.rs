//! Block payload reading with binary search over restart points (§4.5).
//!
//! Decision recorded in the grounding ledger: restart lookups use binary
//! search on decoded restart first-keys, not a linear scan of every
//! restart point.

use crate::codec::{be, read_varint};
use crate::error::{Error, Result};

/// A decoded view over one block's payload (the bytes between the outer
/// framing header and its CRC trailer, after decompression).
pub struct BlockReader<'a> {
    payload: &'a [u8],
    restarts: Vec<u32>,
    entries_end: usize,
}

/// One decoded entry: an owned key (reconstructed from its shared prefix)
/// and a borrowed value slice.
pub struct Entry<'a> {
    pub key: Vec<u8>,
    pub value: &'a [u8],
}

impl<'a> BlockReader<'a> {
    /// Parses the restart-offset trailer out of `payload` and validates
    /// that at least one restart point is present for any non-empty block.
    pub fn new(payload: &'a [u8]) -> Result<Self> {
        if payload.len() < 4 {
            return Err(Error::corruption("block reader", "payload too short"));
        }
        let count_offset = payload.len() - 4;
        let count = be::read_u32(&payload[count_offset..])? as usize;

        let restarts_bytes = count.checked_mul(4).ok_or_else(|| {
            Error::corruption("block reader", "restart count overflow")
        })?;
        if restarts_bytes > count_offset {
            return Err(Error::corruption(
                "block reader",
                "restart array longer than payload",
            ));
        }
        let restarts_offset = count_offset - restarts_bytes;

        let mut restarts = Vec::with_capacity(count);
        for i in 0..count {
            let start = restarts_offset + i * 4;
            let offset = be::read_u32(&payload[start..start + 4])?;
            if offset as usize >= restarts_offset {
                return Err(Error::corruption(
                    "block reader",
                    "restart offset points past entries region",
                ));
            }
            restarts.push(offset);
        }

        Ok(Self {
            payload,
            restarts,
            entries_end: restarts_offset,
        })
    }

    /// Number of restart points in this block.
    pub fn restart_count(&self) -> usize {
        self.restarts.len()
    }

    /// Decodes the entry starting at byte offset `offset` in the entries
    /// region, given the key reconstructed for the preceding entry (used
    /// to expand the shared prefix).
    fn decode_entry_at(&self, offset: usize, preceding_key: &[u8]) -> Result<(Entry<'a>, usize)> {
        let buf = &self.payload[offset..self.entries_end];
        let (shared, n1) = read_varint(buf)?;
        let (non_shared, n2) = read_varint(&buf[n1..])?;
        let (value_len, n3) = read_varint(&buf[n1 + n2..])?;
        let header_len = n1 + n2 + n3;

        let key_start = header_len;
        let key_end = key_start + non_shared as usize;
        let value_end = key_end + value_len as usize;
        if value_end > buf.len() {
            return Err(Error::corruption("block reader", "entry overruns block"));
        }

        let mut key = Vec::with_capacity(shared as usize + non_shared as usize);
        if shared as usize > preceding_key.len() {
            return Err(Error::corruption(
                "block reader",
                "shared prefix longer than preceding key",
            ));
        }
        key.extend_from_slice(&preceding_key[..shared as usize]);
        key.extend_from_slice(&buf[key_start..key_end]);

        let value = &buf[key_end..value_end];
        let next_offset = offset + value_end;
        Ok((Entry { key, value }, next_offset))
    }

    /// Decodes every entry in the restart group starting at `restart_idx`,
    /// stopping at the next restart point or end of entries.
    fn decode_restart_group(&self, restart_idx: usize) -> Result<Vec<Entry<'a>>> {
        let start = self.restarts[restart_idx] as usize;
        let end = self
            .restarts
            .get(restart_idx + 1)
            .map(|&o| o as usize)
            .unwrap_or(self.entries_end);

        let mut entries = Vec::new();
        let mut offset = start;
        let mut preceding_key: Vec<u8> = Vec::new();
        while offset < end {
            let (entry, next) = self.decode_entry_at(offset, &preceding_key)?;
            preceding_key = entry.key.clone();
            entries.push(entry);
            offset = next;
        }
        Ok(entries)
    }

    /// Returns the full first key stored at restart point `idx` (which is
    /// always stored unshared, so no preceding context is needed).
    fn restart_first_key(&self, idx: usize) -> Result<Vec<u8>> {
        let (entry, _) = self.decode_entry_at(self.restarts[idx] as usize, &[])?;
        Ok(entry.key)
    }

    /// Looks up `target` by binary-searching restart first-keys, then
    /// scanning the matching restart group.
    ///
    /// A key may have been added more than once (§3, §4.4); since entries
    /// are stored in the order they were added, the last matching entry
    /// in the group is the last one written, so scanning keeps overwriting
    /// the result instead of returning on the first match.
    pub fn get(&self, target: &[u8]) -> Result<Option<Entry<'a>>> {
        if self.restarts.is_empty() {
            return Ok(None);
        }

        let restart_idx = self.locate_restart(target)?;
        let mut found = None;
        for entry in self.decode_restart_group(restart_idx)? {
            if entry.key.as_slice() > target {
                break;
            }
            if entry.key == target {
                found = Some(entry);
            }
        }
        Ok(found)
    }

    /// Finds the last restart index whose first key is `<= target`, via
    /// binary search (§4.5: "never a linear scan").
    fn locate_restart(&self, target: &[u8]) -> Result<usize> {
        let mut lo = 0usize;
        let mut hi = self.restarts.len();
        while lo + 1 < hi {
            let mid = lo + (hi - lo) / 2;
            let mid_key = self.restart_first_key(mid)?;
            if mid_key.as_slice() <= target {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }

    /// Iterates every entry in the block in key order, starting from the
    /// restart group that could contain `start_key` (or from the
    /// beginning if `start_key` is `None`).
    pub fn iter_from(&self, start_key: Option<&[u8]>) -> Result<Vec<Entry<'a>>> {
        let first_idx = match start_key {
            Some(key) if !self.restarts.is_empty() => self.locate_restart(key)?,
            _ => 0,
        };

        let mut out = Vec::new();
        for idx in first_idx..self.restarts.len() {
            for entry in self.decode_restart_group(idx)? {
                if let Some(key) = start_key {
                    if entry.key.as_slice() < key {
                        continue;
                    }
                }
                out.push(entry);
            }
        }
        Ok(out)
    }
}
