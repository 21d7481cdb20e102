// Error reporting across the protocol entry points.

use gzchunk::engine::{EngineCode, Runtime};
use gzchunk::gzip::GzipHeader;
use gzchunk::stream::{
    DeflateStream, InflateStream, Misuse, StreamError, StreamPhase, MISUSE_CODE, RESOURCE_CODE,
};

fn runtime() -> Runtime {
    Runtime::load_from("flate2").unwrap()
}

#[test]
fn stateless_output_too_small_is_overflow() {
    let data = b"0123456789abcdef".repeat(8);
    let mut s = DeflateStream::init(&runtime(), 1).unwrap();
    // Room for the whole input but not for header and trailer as well.
    let mut out = vec![0u8; 20];
    match s.compress_stateless(&data[..4], &mut out, Some(&GzipHeader::new())) {
        Err(StreamError::Engine(EngineCode::StatelessOverflow)) => {}
        other => panic!("expected StatelessOverflow, got {:?}", other),
    }
    assert_eq!(s.phase(), StreamPhase::Idle);
}

#[test]
fn stateless_is_repeatable_on_an_idle_stream() {
    let mut s = DeflateStream::init(&runtime(), 2).unwrap();
    let mut a = vec![0u8; 128];
    let mut b = vec![0u8; 128];
    let pa = s.compress_stateless(b"same input", &mut a, None).unwrap();
    let pb = s.compress_stateless(b"same input", &mut b, None).unwrap();
    assert_eq!(&a[..pa.produced], &b[..pb.produced]);
}

#[test]
fn garbage_is_rejected_by_header_parsing() {
    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 64];
    assert_eq!(
        s.decompress(b"PK\x03\x04 not gzip at all", &mut out, Some(&mut GzipHeader::new())),
        Err(StreamError::Engine(EngineCode::InvalidWrapper))
    );
}

#[test]
fn header_error_repeats_until_reset() {
    let valid = gzchunk::compress_bytes(&runtime(), b"valid member", 1).unwrap();
    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 64];
    let bad = Err(StreamError::Engine(EngineCode::InvalidWrapper));
    assert_eq!(
        s.decompress(b"PK\x03\x04 not gzip at all", &mut out, Some(&mut GzipHeader::new())),
        bad
    );
    let total_in = s.total_in();
    assert_eq!(s.decompress(&valid, &mut out, None), bad);
    assert_eq!(s.decompress_buffered(b"more garbage bytes", &mut out, None, 0), bad);
    assert_eq!(s.total_in(), total_in);
    assert_eq!(s.failed(), Some(EngineCode::InvalidWrapper));

    s.reset();
    assert_eq!(s.failed(), None);
    let p = s.decompress(&valid, &mut out, Some(&mut GzipHeader::new())).unwrap();
    assert!(p.finished);
    assert_eq!(&out[p.out_offset..p.out_offset + p.produced], b"valid member");
}

#[test]
fn body_error_repeats_until_reset() {
    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 64];
    let bad = Err(StreamError::Engine(EngineCode::InvalidBlock));
    assert_eq!(s.decompress_buffered(&[0x07, 0, 0], &mut out, None, 0), bad);
    assert_eq!(s.decompress_buffered(&[0x03, 0x00], &mut out, None, 0), bad);
    assert_eq!(s.total_out(), 0);
}

#[test]
fn bad_method_is_unsupported() {
    let mut gz = gzchunk::compress_bytes(&runtime(), b"abc", 1).unwrap();
    gz[2] = 7;
    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 64];
    assert_eq!(
        s.decompress_stateless(&gz, &mut out, Some(&mut GzipHeader::new())),
        Err(StreamError::Engine(EngineCode::UnsupportedMethod))
    );
}

#[test]
fn invalid_block_type_is_reported() {
    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 64];
    // BFINAL=1, BTYPE=11 (reserved).
    assert_eq!(
        s.decompress_stateless(&[0x07, 0x00, 0x00], &mut out, None),
        Err(StreamError::Engine(EngineCode::InvalidBlock))
    );
}

#[test]
fn incomplete_stateless_input_is_a_status() {
    let gz = gzchunk::compress_bytes(&runtime(), &b"partial ".repeat(30), 1).unwrap();
    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 1024];
    let p = s
        .decompress_stateless(&gz[..gz.len() - 4], &mut out, Some(&mut GzipHeader::new()))
        .unwrap();
    assert_eq!(p.status, EngineCode::EndInput);
    assert!(!p.finished);
}

#[test]
fn raw_codes_for_the_abi() {
    assert_eq!(StreamError::from(Misuse::StreamInProgress).raw_code(), MISUSE_CODE);
    assert_eq!(StreamError::from(EngineCode::IncorrectChecksum).raw_code(), -4);
    let alloc_err = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
    assert_eq!(StreamError::from(alloc_err).raw_code(), RESOURCE_CODE);
}

#[test]
fn errors_chain_to_their_source() {
    use std::error::Error;
    let e = StreamError::from(EngineCode::InvalidBlock);
    let src = e.source().expect("engine code is the source");
    assert_eq!(src.to_string(), EngineCode::InvalidBlock.to_string());
}
