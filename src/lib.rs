//! # sstable-core
//!
//! An immutable, sorted, on-disk key/value table ("sorted string table",
//! SST) — the storage substrate of a Bigtable-style engine. This crate
//! is the CORE: the file format, its writer and reader, a segmented LRU
//! block cache, and the sharding protocol that partitions one logical
//! table across multiple shard files.
//!
//! The mutable in-memory memtable, the write-ahead log, row/column
//! record models, and compaction scheduling are out of scope here — the
//! core accepts opaque byte keys and values and a `Path` to publish to.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                ShardedWriter / ShardedReader                 │
//! │    routes keys across N shard files via a ShardingFunction   │
//! └───────────────┬───────────────────────────────┬─────────────┘
//!                 │                               │
//!         ┌───────▼────────┐             ┌────────▼───────┐
//!         │   SstWriter     │             │   SstReader     │
//!         │ block builder   │             │ index + filter  │
//!         │ bloom + index   │             │ in memory       │
//!         │ atomic publish  │             │ mmap'd file     │
//!         └───────┬────────┘             └────────┬───────┘
//!                 │                               │
//!         ┌───────▼───────────────────────────────▼───────┐
//!         │      block (framing) ── compress ── codec      │
//!         └─────────────────────────────────────────────────┘
//!                                 │
//!                         ┌───────▼────────┐
//!                         │   BlockCache    │
//!                         │ segmented LRU   │
//!                         └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`sstable`] | SST file format, writer, and reader |
//! | [`block`] | Outer block framing shared by every block type, plus the builder/reader for prefix-compressed entries |
//! | [`bloom`] | Fixed-layout Bloom filter, shared between the in-file filter block and the `.bf` sidecar |
//! | [`cache`] | Segmented LRU block cache bounded by a global byte budget |
//! | [`shard`] | Sharding functions (`mod`, `range:v1`, `fingerprint:v2`) and the sharded writer/reader |
//! | [`codec`] | Varints, CRC32C, big-endian primitives |
//! | [`compress`] | Pluggable per-block compression (Zstd by default) |
//! | [`hash`] | Hand-rolled MurmurHash3, used by the Bloom filter and by `mod`/`fingerprint:v2` sharding |
//! | [`config`] | `TableConfig`: every tunable knob and its default |
//! | [`error`] | Shared error taxonomy |
//!
//! ## Key properties
//!
//! - **Crash-safe publish** — a table is written to a `.tmp` sibling,
//!   fsynced, renamed into place, and the parent directory is fsynced;
//!   readers never observe a partially written file.
//! - **Integrity** — every on-disk block carries a CRC32C trailer;
//!   corruption is detected before it reaches a caller.
//! - **Bloom filter lookups** — each table carries a Bloom filter, also
//!   persisted as a standalone sidecar for out-of-band membership checks.
//! - **Bounded memory** — the block cache evicts by an explicit byte
//!   budget, sharded across segments to reduce lock contention.
//! - **Horizontal partitioning** — a sharded table is a set of ordinary
//!   SST files plus a deterministic, durable key-to-shard mapping.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use sstable_core::cache::BlockCache;
//! use sstable_core::config::TableConfig;
//! use sstable_core::sstable::{SstReader, SstWriter};
//!
//! let mut writer = SstWriter::create("/tmp/table.sst", TableConfig::default()).unwrap();
//! writer.add(b"a", b"1").unwrap();
//! writer.add(b"b", b"2").unwrap();
//! writer.finish().unwrap();
//!
//! let reader = SstReader::open("/tmp/table.sst").unwrap();
//! let cache = BlockCache::new(64 * 1024 * 1024, 8);
//! assert_eq!(reader.get(b"a", &cache).unwrap(), Some(b"1".to_vec()));
//! ```

#![allow(dead_code)]

pub mod block;
pub mod bloom;
pub mod cache;
pub mod codec;
pub mod compress;
pub mod config;
pub mod error;
pub mod hash;
pub mod shard;
pub mod sstable;
