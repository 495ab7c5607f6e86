use crate::shard::{FingerprintV2Sharder, ModSharder, RangeV1Sharder, ShardingFunction};

#[test]
fn mod_sharder_reaches_every_shard() {
    let sharder = ModSharder;
    let num_shards = 4;
    let mut seen = std::collections::HashSet::new();
    for i in 0..1000u32 {
        seen.insert(sharder.shard_of(format!("key-{i}").as_bytes(), num_shards));
    }
    assert_eq!(seen, (0..num_shards).collect());
}

#[test]
fn fingerprint_v2_sharder_reaches_every_shard() {
    let sharder = FingerprintV2Sharder;
    let num_shards = 4;
    let mut seen = std::collections::HashSet::new();
    for i in 0..1000u32 {
        seen.insert(sharder.shard_of(format!("key-{i}").as_bytes(), num_shards));
    }
    assert_eq!(seen, (0..num_shards).collect());
}

#[test]
fn mod_sharder_is_deterministic() {
    let sharder = ModSharder;
    let a = sharder.shard_of(b"same-key", 7);
    let b = sharder.shard_of(b"same-key", 7);
    assert_eq!(a, b);
}

#[test]
fn fingerprint_v2_sharder_is_deterministic() {
    let sharder = FingerprintV2Sharder;
    let a = sharder.shard_of(b"same-key", 7);
    let b = sharder.shard_of(b"same-key", 7);
    assert_eq!(a, b);
}

#[test]
fn range_v1_shard_of_boundary_is_the_following_shard() {
    let boundaries = vec![b"b".to_vec(), b"d".to_vec(), b"f".to_vec()];
    let sharder = RangeV1Sharder::new(boundaries.clone()).unwrap();
    let num_shards = boundaries.len() as u32 + 1;

    for (i, boundary) in boundaries.iter().enumerate() {
        assert_eq!(
            sharder.shard_of(boundary, num_shards),
            (i + 1) as u32,
            "boundary {i} should route to shard {}",
            i + 1
        );
    }
    assert_eq!(sharder.shard_of(b"a", num_shards), 0);
    assert_eq!(sharder.shard_of(b"z", num_shards), num_shards - 1);
}

#[test]
fn range_v1_rejects_non_increasing_boundaries() {
    assert!(RangeV1Sharder::new(vec![b"b".to_vec(), b"a".to_vec()]).is_err());
    assert!(RangeV1Sharder::new(vec![b"a".to_vec(), b"a".to_vec()]).is_err());
}

#[test]
fn range_v1_config_round_trips_through_decode() {
    let boundaries = vec![b"apple".to_vec(), b"mango".to_vec(), b"peach".to_vec()];
    let sharder = RangeV1Sharder::new(boundaries.clone()).unwrap();
    let decoded = RangeV1Sharder::decode_config(&sharder.config()).unwrap();
    assert_eq!(decoded.boundaries(), boundaries.as_slice());
}

#[test]
fn range_v1_shards_for_range_intersects_only_overlapping_shards() {
    let boundaries = vec![b"b".to_vec(), b"d".to_vec(), b"f".to_vec(), b"h".to_vec()];
    let sharder = RangeV1Sharder::new(boundaries).unwrap();
    let num_shards = 5;

    // Shard layout: [.., b) -> 0, [b, d) -> 1, [d, f) -> 2, [f, h) -> 3, [h, ..) -> 4
    assert_eq!(
        sharder.shards_for_range(Some(b"c"), Some(b"e"), num_shards),
        vec![1, 2]
    );
    assert_eq!(
        sharder.shards_for_range(None, None, num_shards),
        vec![0, 1, 2, 3, 4]
    );
    assert_eq!(sharder.shards_for_range(Some(b"a"), Some(b"a"), num_shards), vec![0]);
}

#[test]
fn default_shards_for_range_covers_all_shards() {
    let sharder = ModSharder;
    assert_eq!(
        sharder.shards_for_range(Some(b"x"), Some(b"y"), 6),
        vec![0, 1, 2, 3, 4, 5]
    );
}

#[test]
fn shard_file_name_format() {
    assert_eq!(crate::shard::shard_file_name("table", 3, 10), "table-00003-of-00010.sst");
}
