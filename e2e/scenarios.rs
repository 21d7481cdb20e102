//! E2E Suite: protocol scenarios
//!
//! Call sequences a real caller makes against the buffer protocol, checked
//! end to end:
//! - multi-call compression with the end marked on an empty final call
//! - the header flag arriving late (ignored) or on every call (written once)
//! - buffered decompression with the segment counter restarted mid-stream
//! - stateless compression chosen when the output is larger than the input

use std::io::Read;

use gzchunk::engine::{EngineCode, Runtime};
use gzchunk::gzip::GzipHeader;
use gzchunk::stream::{DeflateStream, InflateStream, StreamPhase};

fn runtime() -> Runtime {
    Runtime::load_from("flate2").expect("built-in engine")
}

fn gunzip(gz: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::GzDecoder::new(gz).read_to_end(&mut out).expect("valid gzip");
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario 1: two body calls, then an empty end-of-stream call
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn two_chunks_then_empty_end_of_stream() {
    let header = GzipHeader::new();
    let mut s = DeflateStream::init(&runtime(), 1).unwrap();
    let mut out = vec![0u8; 256];
    let mut gz = Vec::new();

    let p = s.compress(b"AAAA", &mut out, false, Some(&header)).unwrap();
    assert_eq!(p.consumed, 4);
    assert!(!p.finished);
    gz.extend_from_slice(&out[..p.produced]);

    let p = s.compress(b"BBBB", &mut out, false, Some(&header)).unwrap();
    assert_eq!(p.consumed, 4);
    gz.extend_from_slice(&out[..p.produced]);

    let p = s.compress(b"", &mut out, true, Some(&header)).unwrap();
    assert!(p.finished);
    assert_eq!(p.total_in, 8);
    gz.extend_from_slice(&out[..p.produced]);

    assert_eq!(p.total_out, gz.len() as u64);
    assert_eq!(gunzip(&gz), b"AAAABBBB");
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario 2: header flag only on a later call is ignored
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn late_header_flag_is_ignored() {
    let mut s = DeflateStream::init(&runtime(), 2).unwrap();
    let mut out = vec![0u8; 256];
    let mut body = Vec::new();
    let p = s.compress(b"no header ", &mut out, false, None).unwrap();
    body.extend_from_slice(&out[..p.produced]);
    let p = s.compress(b"was asked for", &mut out, true, Some(&GzipHeader::new())).unwrap();
    assert!(p.finished);
    body.extend_from_slice(&out[..p.produced]);

    // Trailer only: a raw deflate body followed by CRC-32 and ISIZE.
    assert_ne!(&body[..2], &[0x1f, 0x8b]);
    let payload = b"no header was asked for";
    let n = body.len();
    assert_eq!(&body[n - 4..], &(payload.len() as u32).to_le_bytes());
    assert_eq!(&body[n - 8..n - 4], &crc32fast::hash(payload).to_le_bytes());
    let mut raw = Vec::new();
    flate2::read::DeflateDecoder::new(&body[..n - 8]).read_to_end(&mut raw).unwrap();
    assert_eq!(raw, payload);

    // The same bytes decode as a header-less stream.
    let mut d = InflateStream::init(&runtime());
    let mut plain = vec![0u8; 64];
    let p = d.decompress(&body, &mut plain, None).unwrap();
    assert!(p.finished);
    assert_eq!(&plain[..p.produced], payload);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario 3: buffered decompression with a restarted segment
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn buffered_counter_restart() {
    let data: Vec<u8> = (0..20_000u32).map(|i| (i / 3) as u8).collect();
    let gz = gzchunk::compress_bytes(&runtime(), &data, 1).unwrap();
    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 4096];
    let mut header = GzipHeader::new();
    let mut got = Vec::new();
    let mut pos = 0;

    let mut so_far = 0;
    for _ in 0..2 {
        let p = s.decompress_buffered(&gz[pos..], &mut out, Some(&mut header), so_far).unwrap();
        got.extend_from_slice(&out[..p.produced]);
        pos += p.consumed;
        so_far = p.segment_out;
    }
    assert_eq!(so_far, 8192);

    let p = s.decompress_buffered(&gz[pos..], &mut out, None, 0).unwrap();
    got.extend_from_slice(&out[..p.produced]);
    pos += p.consumed;
    assert_eq!(p.segment_out, p.produced as u64);
    assert_eq!(p.total_out, 8192 + p.produced as u64);

    so_far = p.segment_out;
    while !s.is_finished() {
        let p = s.decompress_buffered(&gz[pos..], &mut out, None, so_far).unwrap();
        got.extend_from_slice(&out[..p.produced]);
        pos += p.consumed;
        so_far = p.segment_out;
    }
    assert_eq!(got, data);
    assert_eq!(pos, gz.len());
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario 4: header bytes trickle in one at a time
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn header_trickles_in() {
    let mut h = GzipHeader::new();
    h.mtime = 1_700_000_000;
    h.name = Some(b"trickle.bin".to_vec());
    h.extra = Some(vec![b'A', b'B', 2, 0, 7, 9]);
    h.hcrc = true;
    let mut d = DeflateStream::init(&runtime(), 0).unwrap();
    let mut gz = vec![0u8; 512];
    let p = d.compress_stateless(b"trickled body", &mut gz, Some(&h)).unwrap();
    gz.truncate(p.produced);

    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 64];
    let mut parsed = GzipHeader::new();
    let mut got = Vec::new();
    let mut pos = 0;
    while !s.is_finished() {
        assert!(pos < gz.len(), "ran out of input before the trailer");
        let p = s.decompress_buffered(&gz[pos..pos + 1], &mut out, Some(&mut parsed), 1).unwrap();
        got.extend_from_slice(&out[..p.produced]);
        pos += p.consumed;
        if s.phase() == StreamPhase::AwaitingHeader {
            assert_eq!(p.status, EngineCode::EndInput);
        }
    }
    assert_eq!(pos, gz.len());
    assert_eq!(got, b"trickled body");
    assert_eq!(s.gzip_header(), Some(&h));
    assert_eq!(parsed, h);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario 5: the stateless / streaming choice by buffer size
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn stateless_when_output_exceeds_input() {
    let rt = runtime();
    let header = GzipHeader::new();
    let data = b"choose the path by buffer size ".repeat(20);

    let mut one_shot = DeflateStream::init(&rt, 3).unwrap();
    let mut big = vec![0u8; data.len() + 128];
    let p = one_shot.compress_stateless(&data, &mut big, Some(&header)).unwrap();
    assert!(p.finished);
    assert_eq!(one_shot.phase(), StreamPhase::Idle);
    let stateless = big[..p.produced].to_vec();

    let mut chunked = DeflateStream::init(&rt, 3).unwrap();
    let mut small = vec![0u8; 32];
    let mut streamed = Vec::new();
    let mut rest = &data[..];
    loop {
        let p = chunked.compress(rest, &mut small, true, Some(&header)).unwrap();
        streamed.extend_from_slice(&small[..p.produced]);
        rest = &rest[p.consumed..];
        if p.finished {
            break;
        }
    }
    assert_eq!(gunzip(&stateless), data);
    assert_eq!(gunzip(&streamed), data);
}
