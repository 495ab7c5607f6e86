use tempfile::tempdir;

use crate::cache::BlockCache;
use crate::config::TableConfig;
use crate::sstable::{SstReader, SstWriter};

fn build_table(path: &std::path::Path, keys: &[&str]) {
    let mut writer = SstWriter::create(path, TableConfig::default()).unwrap();
    for key in keys {
        writer.add(key.as_bytes(), format!("v-{key}").as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn scan_yields_entries_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("table.sst");
    let keys: Vec<String> = (0..1000).map(|i| format!("k{i:04}")).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    build_table(&path, &key_refs);

    let reader = SstReader::open(&path).unwrap();
    let cache = BlockCache::new(1024 * 1024, 8);

    let scanned = reader.scan(None, None, &cache).unwrap();
    assert_eq!(scanned.len(), 1000);
    for (i, (k, v)) in scanned.iter().enumerate() {
        assert_eq!(k, keys[i].as_bytes());
        assert_eq!(v, format!("v-{}", keys[i]).as_bytes());
    }
}

#[test]
fn scan_respects_start_and_end_bounds() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("table.sst");
    build_table(&path, &["a", "b", "c", "d", "e", "f"]);

    let reader = SstReader::open(&path).unwrap();
    let cache = BlockCache::new(1024 * 1024, 8);

    let scanned = reader.scan(Some(b"b"), Some(b"e"), &cache).unwrap();
    let keys: Vec<&[u8]> = scanned.iter().map(|(k, _)| k.as_slice()).collect();
    assert_eq!(keys, vec![b"b".as_slice(), b"c", b"d"]);
}

#[test]
fn scan_over_empty_bounds_returns_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("table.sst");
    build_table(&path, &["a", "b", "c"]);

    let reader = SstReader::open(&path).unwrap();
    let cache = BlockCache::new(1024 * 1024, 8);

    let scanned = reader.scan(Some(b"x"), Some(b"y"), &cache).unwrap();
    assert!(scanned.is_empty());
}
