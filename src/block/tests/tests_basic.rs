use crate::block::{BlockBuilder, BlockReader, BlockType, read_framed, write_framed};
use crate::compress::ZstdCodec;

fn sample_entries(n: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
    (0..n)
        .map(|i| (format!("key-{i:06}").into_bytes(), format!("value-{i}").into_bytes()))
        .collect()
}

#[test]
fn builder_reader_round_trip_small_restart_interval() {
    let entries = sample_entries(100);
    let mut builder = BlockBuilder::new(4);
    for (k, v) in &entries {
        builder.add(k, v).unwrap();
    }
    let payload = builder.finish();
    let reader = BlockReader::new(&payload).unwrap();

    for (k, v) in &entries {
        let found = reader.get(k).unwrap().expect("entry present");
        assert_eq!(found.key, *k);
        assert_eq!(found.value, v.as_slice());
    }
}

#[test]
fn reader_returns_none_for_absent_key() {
    let entries = sample_entries(50);
    let mut builder = BlockBuilder::new(8);
    for (k, v) in &entries {
        builder.add(k, v).unwrap();
    }
    let payload = builder.finish();
    let reader = BlockReader::new(&payload).unwrap();

    assert!(reader.get(b"key-999999").unwrap().is_none());
    assert!(reader.get(b"aaa").unwrap().is_none());
}

#[test]
fn iter_from_none_yields_all_entries_in_order() {
    let entries = sample_entries(40);
    let mut builder = BlockBuilder::new(5);
    for (k, v) in &entries {
        builder.add(k, v).unwrap();
    }
    let payload = builder.finish();
    let reader = BlockReader::new(&payload).unwrap();

    let collected = reader.iter_from(None).unwrap();
    assert_eq!(collected.len(), entries.len());
    for (got, (k, v)) in collected.iter().zip(entries.iter()) {
        assert_eq!(&got.key, k);
        assert_eq!(got.value, v.as_slice());
    }
}

#[test]
fn iter_from_start_key_skips_earlier_entries() {
    let entries = sample_entries(40);
    let mut builder = BlockBuilder::new(5);
    for (k, v) in &entries {
        builder.add(k, v).unwrap();
    }
    let payload = builder.finish();
    let reader = BlockReader::new(&payload).unwrap();

    let start = &entries[10].0;
    let collected = reader.iter_from(Some(start)).unwrap();
    assert_eq!(collected.len(), entries.len() - 10);
    assert_eq!(&collected[0].key, start);
}

#[test]
fn repeated_key_is_allowed_and_last_value_wins() {
    let mut builder = BlockBuilder::new(4);
    builder.add(b"k", b"first").unwrap();
    builder.add(b"k", b"second").unwrap();
    builder.add(b"z", b"last").unwrap();
    let payload = builder.finish();
    let reader = BlockReader::new(&payload).unwrap();

    let found = reader.get(b"k").unwrap().expect("key present");
    assert_eq!(found.value, b"second");
}

#[test]
fn add_rejects_out_of_order_keys() {
    let mut builder = BlockBuilder::new(4);
    builder.add(b"b", b"1").unwrap();
    let err = builder.add(b"a", b"2").unwrap_err();
    assert!(format!("{err}").contains("increasing"));
}

#[test]
fn framing_round_trips_with_compression() {
    let mut builder = BlockBuilder::new(16);
    for (k, v) in sample_entries(200) {
        builder.add(&k, &v).unwrap();
    }
    let payload = builder.finish();

    let codec = ZstdCodec;
    let framed = write_framed(BlockType::Data, &payload, Some((&codec, 3))).unwrap();
    let decoded = read_framed(&framed, &codec).unwrap();

    assert_eq!(decoded.block_type, BlockType::Data);
    assert_eq!(decoded.payload, payload);
}

#[test]
fn framing_round_trips_without_compression() {
    let payload = b"tiny".to_vec();
    let codec = ZstdCodec;
    let framed = write_framed(BlockType::Meta, &payload, None).unwrap();
    let decoded = read_framed(&framed, &codec).unwrap();
    assert_eq!(decoded.block_type, BlockType::Meta);
    assert_eq!(decoded.payload, payload);
}
