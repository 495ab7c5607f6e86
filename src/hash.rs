//! MurmurHash3, hand-implemented.
//!
//! Used by the Bloom filter's double-hashing scheme (§4.3) and by the
//! `mod` and `fingerprint:v2` sharding functions (§4.9). Both call sites
//! need *exact*, platform-independent bit output forever — a sharder's
//! `shardOf` result is a durable routing decision baked into file names
//! on disk — so this is hand-rolled rather than pulled from a hashing
//! crate whose output could shift across major versions.
//!
//! Implements the reference algorithm bit-for-bit: `murmur3_32` is
//! MurmurHash3_x86_32, `murmur3_128` is MurmurHash3_x64_128.

/// 32-bit MurmurHash3 (`MurmurHash3_x86_32`) of `data` with the given seed.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;

    let mut h1 = seed;
    let chunks = data.chunks_exact(4);
    let tail = chunks.remainder();

    for chunk in chunks {
        let mut k1 = u32::from_le_bytes(chunk.try_into().expect("chunk of 4"));
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(15);
        k1 = k1.wrapping_mul(C2);

        h1 ^= k1;
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let mut k1: u32 = 0;
    match tail.len() {
        3 => {
            k1 ^= u32::from(tail[2]) << 16;
            k1 ^= u32::from(tail[1]) << 8;
            k1 ^= u32::from(tail[0]);
        }
        2 => {
            k1 ^= u32::from(tail[1]) << 8;
            k1 ^= u32::from(tail[0]);
        }
        1 => {
            k1 ^= u32::from(tail[0]);
        }
        _ => {}
    }
    if !tail.is_empty() {
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(15);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;
    }

    h1 ^= data.len() as u32;
    fmix32(h1)
}

fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// 128-bit MurmurHash3 (`MurmurHash3_x64_128`) of `data` with the given
/// seed. Returns `(low64, high64)`.
pub fn murmur3_128(data: &[u8], seed: u64) -> (u64, u64) {
    const C1: u64 = 0x87c3_7b91_1142_53d5;
    const C2: u64 = 0x4cf5_ad43_2745_937f;

    let mut h1 = seed;
    let mut h2 = seed;

    let chunks = data.chunks_exact(16);
    let tail = chunks.remainder();

    for chunk in chunks {
        let mut k1 = u64::from_le_bytes(chunk[0..8].try_into().expect("8 bytes"));
        let mut k2 = u64::from_le_bytes(chunk[8..16].try_into().expect("8 bytes"));

        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;

        h1 = h1.rotate_left(27);
        h1 = h1.wrapping_add(h2);
        h1 = h1.wrapping_mul(5).wrapping_add(0x52dc_e729);

        k2 = k2.wrapping_mul(C2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(C1);
        h2 ^= k2;

        h2 = h2.rotate_left(31);
        h2 = h2.wrapping_add(h1);
        h2 = h2.wrapping_mul(5).wrapping_add(0x3849_5ab5);
    }

    let mut k1: u64 = 0;
    let mut k2: u64 = 0;

    if tail.len() >= 15 {
        k2 ^= u64::from(tail[14]) << 48;
    }
    if tail.len() >= 14 {
        k2 ^= u64::from(tail[13]) << 40;
    }
    if tail.len() >= 13 {
        k2 ^= u64::from(tail[12]) << 32;
    }
    if tail.len() >= 12 {
        k2 ^= u64::from(tail[11]) << 24;
    }
    if tail.len() >= 11 {
        k2 ^= u64::from(tail[10]) << 16;
    }
    if tail.len() >= 10 {
        k2 ^= u64::from(tail[9]) << 8;
    }
    if tail.len() >= 9 {
        k2 ^= u64::from(tail[8]);
        k2 = k2.wrapping_mul(C2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(C1);
        h2 ^= k2;
    }

    if tail.len() >= 8 {
        k1 ^= u64::from(tail[7]) << 56;
    }
    if tail.len() >= 7 {
        k1 ^= u64::from(tail[6]) << 48;
    }
    if tail.len() >= 6 {
        k1 ^= u64::from(tail[5]) << 40;
    }
    if tail.len() >= 5 {
        k1 ^= u64::from(tail[4]) << 32;
    }
    if tail.len() >= 4 {
        k1 ^= u64::from(tail[3]) << 24;
    }
    if tail.len() >= 3 {
        k1 ^= u64::from(tail[2]) << 16;
    }
    if tail.len() >= 2 {
        k1 ^= u64::from(tail[1]) << 8;
    }
    if tail.len() >= 1 {
        k1 ^= u64::from(tail[0]);
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;
    }

    h1 ^= data.len() as u64;
    h2 ^= data.len() as u64;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    h1 = fmix64(h1);
    h2 = fmix64(h2);

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    (h1, h2)
}

fn fmix64(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h
}
