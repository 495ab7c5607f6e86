use tempfile::tempdir;

use crate::cache::BlockCache;
use crate::config::TableConfig;
use crate::sstable::{SstReader, SstWriter};

#[test]
fn thousand_key_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("table.sst");

    let mut writer = SstWriter::create(&path, TableConfig::default()).unwrap();
    for i in 0..1000u32 {
        let key = format!("k{i:03}");
        let value = format!("v{key}");
        writer.add(key.as_bytes(), value.as_bytes()).unwrap();
    }
    writer.finish().unwrap();

    let reader = SstReader::open(&path).unwrap();
    let cache = BlockCache::new(1024 * 1024, 8);

    for i in 0..1000u32 {
        let key = format!("k{i:03}");
        let expected = format!("v{key}");
        let got = reader.get(key.as_bytes(), &cache).unwrap().unwrap();
        assert_eq!(got, expected.as_bytes());
    }

    assert!(reader.get(b"zzz", &cache).unwrap().is_none());
}

#[test]
fn small_restart_interval_reconstructs_shared_prefixes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("table.sst");

    let config = TableConfig {
        restart_interval: 2,
        ..TableConfig::default()
    };
    let mut writer = SstWriter::create(&path, config).unwrap();
    for key in ["aa", "ab", "ac", "b", "ba"] {
        writer.add(key.as_bytes(), format!("v-{key}").as_bytes()).unwrap();
    }
    writer.finish().unwrap();

    let reader = SstReader::open(&path).unwrap();
    let cache = BlockCache::new(1024 * 1024, 8);

    for key in ["aa", "ab", "ac", "b", "ba"] {
        let got = reader.get(key.as_bytes(), &cache).unwrap().unwrap();
        assert_eq!(got, format!("v-{key}").as_bytes());
    }
}

#[test]
fn large_value_spans_multiple_blocks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("table.sst");

    let config = TableConfig {
        block_size: 4 * 1024,
        ..TableConfig::default()
    };
    let mut writer = SstWriter::create(&path, config).unwrap();
    let big_value = vec![0x42u8; 10 * 1024 * 1024];
    writer.add(b"big", &big_value).unwrap();
    writer.add(b"small", b"tiny").unwrap();
    writer.finish().unwrap();

    let reader = SstReader::open(&path).unwrap();
    let cache = BlockCache::new(32 * 1024 * 1024, 8);

    assert_eq!(reader.get(b"big", &cache).unwrap().unwrap(), big_value);
    assert_eq!(reader.get(b"small", &cache).unwrap().unwrap(), b"tiny");
}

#[test]
fn might_contain_is_true_for_every_inserted_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("table.sst");

    let mut writer = SstWriter::create(&path, TableConfig::default()).unwrap();
    let keys: Vec<String> = (0..500).map(|i| format!("key-{i:04}")).collect();
    for key in &keys {
        writer.add(key.as_bytes(), b"v").unwrap();
    }
    writer.finish().unwrap();

    let reader = SstReader::open(&path).unwrap();
    for key in &keys {
        assert!(reader.might_contain(key.as_bytes()));
    }
}

#[test]
fn repeated_key_is_allowed_and_last_value_wins() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("table.sst");

    let mut writer = SstWriter::create(&path, TableConfig::default()).unwrap();
    writer.add(b"k", b"first").unwrap();
    writer.add(b"k", b"second").unwrap();
    writer.add(b"z", b"last").unwrap();
    writer.finish().unwrap();

    let reader = SstReader::open(&path).unwrap();
    let cache = BlockCache::new(1024 * 1024, 8);

    assert_eq!(reader.get(b"k", &cache).unwrap().unwrap(), b"second");

    let meta = reader.metadata();
    assert_eq!(meta.entries, 3);
    assert_eq!(meta.unique_keys, 2);
}

#[test]
fn metadata_reports_entry_and_unique_key_counts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("table.sst");

    let mut writer = SstWriter::create(&path, TableConfig::default()).unwrap();
    for i in 0..42u32 {
        writer.add(format!("k{i:03}").as_bytes(), b"v").unwrap();
    }
    writer.finish().unwrap();

    let reader = SstReader::open(&path).unwrap();
    let meta = reader.metadata();
    assert_eq!(meta.entries, 42);
    assert_eq!(meta.unique_keys, 42);
    assert_eq!(meta.path, path);
}
