//! E2E Suite: interoperability with flate2
//!
//! Members produced here must decode with flate2's GZIP / DEFLATE readers,
//! and members produced by flate2 must decode here, headers included.

use std::io::{Read, Write};

use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::{Compression, GzBuilder};
use gzchunk::engine::Runtime;
use gzchunk::gzip::GzipHeader;
use gzchunk::stream::{DeflateStream, InflateStream};
use gzchunk::{GzReader, GzWriter};

fn runtime() -> Runtime {
    Runtime::load_from("flate2").expect("built-in engine")
}

fn payload() -> Vec<u8> {
    let mut v = Vec::new();
    for i in 0..20_000u32 {
        v.extend_from_slice(format!("{} ", i * 37 % 1000).as_bytes());
    }
    v
}

#[test]
fn our_members_decode_with_flate2() {
    let rt = runtime();
    let data = payload();
    for level in 0..=3 {
        let gz = gzchunk::compress_bytes(&rt, &data, level).unwrap();
        let mut d = flate2::read::GzDecoder::new(&gz[..]);
        let mut back = Vec::new();
        d.read_to_end(&mut back).unwrap();
        assert_eq!(back, data, "level {}", level);
    }
}

#[test]
fn flate2_members_decode_here() {
    let rt = runtime();
    let data = payload();
    let mut enc = GzEncoder::new(Vec::new(), Compression::best());
    enc.write_all(&data).unwrap();
    let gz = enc.finish().unwrap();
    assert_eq!(gzchunk::decompress_bytes(&rt, &gz).unwrap(), data);
}

#[test]
fn flate2_header_fields_are_parsed() {
    let rt = runtime();
    let mut enc = GzBuilder::new()
        .filename("report.csv")
        .comment("nightly export")
        .extra(vec![b'R', b'P', 1, 0, 42])
        .mtime(1_234_567_890)
        .write(Vec::new(), Compression::fast());
    enc.write_all(b"id,value\n1,2\n").unwrap();
    let gz = enc.finish().unwrap();

    let mut r = GzReader::new(&rt, &gz[..]);
    let mut s = String::new();
    r.read_to_string(&mut s).unwrap();
    assert_eq!(s, "id,value\n1,2\n");
    let h = r.header().unwrap();
    assert_eq!(h.name.as_deref(), Some(&b"report.csv"[..]));
    assert_eq!(h.comment.as_deref(), Some(&b"nightly export"[..]));
    assert_eq!(h.extra.as_deref(), Some(&[b'R', b'P', 1, 0, 42][..]));
    assert_eq!(h.mtime, 1_234_567_890);
}

#[test]
fn our_header_fields_reach_flate2() {
    let rt = runtime();
    let mut w = GzWriter::with_level(&rt, Vec::new(), 1).unwrap();
    w.header_mut().name = Some(b"out.bin".to_vec());
    w.header_mut().comment = Some(b"made here".to_vec());
    w.header_mut().mtime = 42;
    w.write_all(b"payload").unwrap();
    let gz = w.finish().unwrap();

    let mut d = flate2::read::GzDecoder::new(&gz[..]);
    let mut back = Vec::new();
    d.read_to_end(&mut back).unwrap();
    assert_eq!(back, b"payload");
    let h = d.header().unwrap();
    assert_eq!(h.filename(), Some(&b"out.bin"[..]));
    assert_eq!(h.comment(), Some(&b"made here"[..]));
    assert_eq!(h.mtime(), 42);
}

#[test]
fn raw_deflate_both_ways() {
    let rt = runtime();
    let data = payload();

    let mut s = DeflateStream::init(&rt, 2).unwrap();
    let mut raw = vec![0u8; data.len() + 1024];
    let p = s.compress_stateless(&data, &mut raw, None).unwrap();
    raw.truncate(p.produced);
    let mut back = Vec::new();
    flate2::read::DeflateDecoder::new(&raw[..]).read_to_end(&mut back).unwrap();
    assert_eq!(back, data);

    let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
    enc.write_all(&data).unwrap();
    let theirs = enc.finish().unwrap();
    let mut i = InflateStream::init(&rt);
    let mut out = vec![0u8; data.len() + 64];
    let p = i.decompress_stateless(&theirs, &mut out, None).unwrap();
    assert!(p.finished);
    assert_eq!(&out[..p.produced], &data[..]);
}

#[test]
fn header_crc_interop() {
    let rt = runtime();
    let mut h = GzipHeader::new();
    h.hcrc = true;
    h.name = Some(b"crc.txt".to_vec());
    let mut s = DeflateStream::init(&rt, 1).unwrap();
    let mut gz = vec![0u8; 256];
    let p = s.compress_stateless(b"header crc", &mut gz, Some(&h)).unwrap();
    gz.truncate(p.produced);

    let mut d = flate2::read::GzDecoder::new(&gz[..]);
    let mut back = Vec::new();
    d.read_to_end(&mut back).unwrap();
    assert_eq!(back, b"header crc");
}
