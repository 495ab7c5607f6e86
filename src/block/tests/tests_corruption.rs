use crate::block::{BlockType, read_framed, write_framed};
use crate::compress::ZstdCodec;

#[test]
fn read_framed_detects_single_bit_flip() {
    let codec = ZstdCodec;
    let mut framed = write_framed(BlockType::Data, b"some payload bytes", None).unwrap();
    let mid = framed.len() / 2;
    framed[mid] ^= 0x01;
    let err = read_framed(&framed, &codec).unwrap_err();
    assert!(format!("{err}").contains("CRC"));
}

#[test]
fn read_framed_rejects_unknown_flags() {
    let codec = ZstdCodec;
    let mut framed = write_framed(BlockType::Data, b"payload", None).unwrap();
    // flags byte sits right after the two u32 size fields and the type byte.
    framed[9] |= 0b1000_0000;
    // Recompute trailing CRC so the corruption is attributable to the flags
    // check, not the CRC check.
    let crc_offset = framed.len() - 4;
    let crc = crate::codec::crc32c(&framed[..crc_offset]);
    framed[crc_offset..].copy_from_slice(&crc.to_be_bytes());
    let err = read_framed(&framed, &codec).unwrap_err();
    assert!(format!("{err}").contains("unknown block flags"));
}

#[test]
fn read_framed_rejects_truncated_block() {
    let codec = ZstdCodec;
    let framed = write_framed(BlockType::Data, b"payload", None).unwrap();
    let truncated = &framed[..framed.len() - 10];
    let err = read_framed(truncated, &codec).unwrap_err();
    assert!(format!("{err}").contains("CRC") || format!("{err}").contains("truncated"));
}
