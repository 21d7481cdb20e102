// Integration tests for src/gzip/types.rs: GzipTrailer.

use gzchunk::gzip::{GzipTrailer, TRAILER_SIZE};

#[test]
fn trailer_of_known_payload() {
    // CRC-32 of "123456789" is the standard check value.
    let t = GzipTrailer { crc32: crc32fast::hash(b"123456789"), isize: 9 };
    assert_eq!(t.crc32, 0xcbf4_3926);
    let bytes = t.encode();
    assert_eq!(bytes.len(), TRAILER_SIZE);
    assert_eq!(&bytes[..4], &[0x26, 0x39, 0xf4, 0xcb]);
    assert_eq!(&bytes[4..], &[9, 0, 0, 0]);
}

#[test]
fn decode_reads_only_first_eight_bytes() {
    let mut bytes = GzipTrailer { crc32: 1, isize: 2 }.encode().to_vec();
    bytes.extend_from_slice(&[0xff; 4]);
    assert_eq!(GzipTrailer::decode(&bytes), Some(GzipTrailer { crc32: 1, isize: 2 }));
}

#[test]
fn decode_short_input() {
    assert_eq!(GzipTrailer::decode(&[]), None);
    assert_eq!(GzipTrailer::decode(&[0; 7]), None);
}
