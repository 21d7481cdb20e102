//! E2E Suite: error handling
//!
//! Corrupt, truncated and misused streams must surface as typed errors (and
//! the matching `io::ErrorKind` through the adapters) without panicking.

use std::io::{self, Read, Write};

use gzchunk::engine::{EngineCode, Runtime};
use gzchunk::gzip::GzipHeader;
use gzchunk::stream::{DeflateStream, InflateStream, Misuse, StreamError};
use gzchunk::{GzReader, GzWriter};

fn runtime() -> Runtime {
    Runtime::load_from("flate2").expect("built-in engine")
}

fn member() -> Vec<u8> {
    gzchunk::compress_bytes(&runtime(), &b"error handling payload ".repeat(200), 2).unwrap()
}

// ═════════════════════════════════════════════════════════════════════════════
// Corruption
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn flipped_crc_is_incorrect_checksum() {
    let mut gz = member();
    let n = gz.len();
    gz[n - 8] ^= 0xff;
    assert_eq!(
        gzchunk::decompress_bytes(&runtime(), &gz),
        Err(StreamError::Engine(EngineCode::IncorrectChecksum))
    );
}

#[test]
fn wrong_isize_is_incorrect_checksum() {
    let mut gz = member();
    let n = gz.len();
    gz[n - 1] ^= 0x01;
    let mut r = GzReader::new(&runtime(), &gz[..]);
    let err = r.read_to_end(&mut Vec::new()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn bad_magic_is_invalid_wrapper() {
    let mut gz = member();
    gz[1] = 0x8c;
    assert_eq!(
        gzchunk::decompress_bytes(&runtime(), &gz),
        Err(StreamError::Engine(EngineCode::InvalidWrapper))
    );
}

#[test]
fn reserved_flag_bits_are_invalid_wrapper() {
    let mut gz = member();
    gz[3] |= 0x80;
    assert_eq!(
        gzchunk::decompress_bytes(&runtime(), &gz),
        Err(StreamError::Engine(EngineCode::InvalidWrapper))
    );
}

#[test]
fn overlong_name_is_name_overflow() {
    let mut gz = vec![0x1f, 0x8b, 8, 0x08, 0, 0, 0, 0, 0, 3];
    gz.extend(std::iter::repeat(b'n').take(5000));
    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 64];
    assert_eq!(
        s.decompress(&gz, &mut out, Some(&mut GzipHeader::new())),
        Err(StreamError::Engine(EngineCode::NameOverflow))
    );
}

#[test]
fn garbage_body_is_invalid_block() {
    let mut gz = member();
    // Header is the 10 fixed bytes; stomp on the start of the body.
    gz[10] = 0xff;
    gz[11] = 0xff;
    let err = gzchunk::decompress_bytes(&runtime(), &gz).unwrap_err();
    assert!(matches!(
        err,
        StreamError::Engine(EngineCode::InvalidBlock) | StreamError::Engine(EngineCode::IncorrectChecksum)
    ));
}

// ═════════════════════════════════════════════════════════════════════════════
// Truncation
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn truncated_anywhere_is_end_input() {
    let gz = member();
    for cut in [0, 5, 10, 20, gz.len() / 2, gz.len() - 8, gz.len() - 1] {
        assert_eq!(
            gzchunk::decompress_bytes(&runtime(), &gz[..cut]),
            Err(StreamError::Engine(EngineCode::EndInput)),
            "cut at {}",
            cut
        );
    }
}

#[test]
fn reader_reports_unexpected_eof() {
    let gz = member();
    let mut r = GzReader::new(&runtime(), &gz[..gz.len() - 3]);
    let err = r.read_to_end(&mut Vec::new()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

// ═════════════════════════════════════════════════════════════════════════════
// Misuse
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn writer_rejects_levels_above_three() {
    match GzWriter::with_level(&runtime(), Vec::new(), 4) {
        Err(StreamError::Engine(EngineCode::InvalidLevel)) => {}
        other => panic!("expected InvalidLevel, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn calls_after_finish_until_reset() {
    let rt = runtime();
    let mut d = DeflateStream::init(&rt, 1).unwrap();
    let mut out = vec![0u8; 128];
    d.compress(b"x", &mut out, true, None).unwrap();
    assert_eq!(d.compress(b"y", &mut out, false, None), Err(Misuse::AfterFinish.into()));
    assert_eq!(d.compress_stateless(b"y", &mut out, None), Err(Misuse::AfterFinish.into()));
    d.reset();
    assert!(d.compress(b"y", &mut out, true, None).unwrap().finished);
}

#[test]
fn misuse_maps_to_invalid_input() {
    let mut d = DeflateStream::init(&runtime(), 1).unwrap();
    d.teardown().unwrap();
    let err: io::Error = d.teardown().unwrap_err().into();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[test]
fn writer_errors_surface_from_the_sink() {
    struct Broken;
    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
    let mut w = GzWriter::with_level(&runtime(), Broken, 1).unwrap();
    let err = w.write_all(b"anything").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}
