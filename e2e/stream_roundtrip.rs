//! E2E Suite: streaming round trips
//!
//! Multi-chunk data through every level and every decompression mode, with
//! buffer sizes on both sides of the chunk constants.

use std::io::{Read, Write};

use gzchunk::config::{C_BUF_SIZE, D_BUF_SIZE};
use gzchunk::engine::Runtime;
use gzchunk::gzip::GzipHeader;
use gzchunk::stream::{DeflateStream, InflateStream};
use gzchunk::{GzReader, GzWriter};

fn runtime() -> Runtime {
    Runtime::load_from("flate2").expect("built-in engine")
}

/// Mixed corpus: text runs interleaved with pseudo-random noise.
fn corpus(len: usize) -> Vec<u8> {
    let text = b"streaming chunks through a buffer protocol; ";
    let mut x = 0x9e37_79b9_u32;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        out.extend_from_slice(text);
        for _ in 0..64 {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            out.push(x as u8);
        }
    }
    out.truncate(len);
    out
}

fn compress_streaming(rt: &Runtime, data: &[u8], level: u32, chunk: usize, window: usize) -> Vec<u8> {
    let header = GzipHeader::new();
    let mut s = DeflateStream::init(rt, level).unwrap();
    let mut buf = vec![0u8; window];
    let mut gz = Vec::new();
    let mut rest = data;
    loop {
        let take = rest.len().min(chunk);
        let p = s.compress(&rest[..take], &mut buf, take == rest.len(), Some(&header)).unwrap();
        gz.extend_from_slice(&buf[..p.produced]);
        rest = &rest[p.consumed..];
        if p.finished {
            return gz;
        }
    }
}

#[test]
fn every_level_round_trips_multi_chunk_input() {
    let rt = runtime();
    let data = corpus(3 * C_BUF_SIZE + 4321);
    let mut sizes = Vec::new();
    for level in 0..=3 {
        let gz = compress_streaming(&rt, &data, level, C_BUF_SIZE, C_BUF_SIZE);
        assert_eq!(gzchunk::decompress_bytes(&rt, &gz).unwrap(), data, "level {}", level);
        sizes.push(gz.len());
    }
    assert!(sizes.iter().all(|&n| n < data.len()));
}

#[test]
fn plain_and_buffered_agree() {
    let rt = runtime();
    let data = corpus(700_000);
    let gz = compress_streaming(&rt, &data, 2, 10_000, 3_000);

    let mut plain = InflateStream::init(&rt);
    let mut buf = vec![0u8; 5_000];
    let mut a = Vec::new();
    let mut pos = 0;
    while !plain.is_finished() {
        let end = (pos + 1_000).min(gz.len());
        let p = plain.decompress(&gz[pos..end], &mut buf, Some(&mut GzipHeader::new())).unwrap();
        a.extend_from_slice(&buf[p.out_offset..p.out_offset + p.produced]);
        pos += p.consumed;
    }

    let mut buffered = InflateStream::init(&rt);
    let mut out = vec![0u8; D_BUF_SIZE];
    let mut b = Vec::new();
    let mut pos = 0;
    let mut so_far = 0;
    while !buffered.is_finished() {
        let p = buffered
            .decompress_buffered(&gz[pos..], &mut out, Some(&mut GzipHeader::new()), so_far)
            .unwrap();
        b.extend_from_slice(&out[..p.produced]);
        pos += p.consumed;
        so_far = p.segment_out;
    }

    assert_eq!(a, data);
    assert_eq!(b, data);
    assert_eq!(plain.total_out(), buffered.total_out());
    assert_eq!(plain.total_in(), gz.len() as u64);
}

#[test]
fn writer_and_reader_over_large_input() {
    let rt = runtime();
    let data = corpus(2 * D_BUF_SIZE + 17);
    let mut w = GzWriter::with_level(&rt, Vec::new(), 1).unwrap();
    for piece in data.chunks(50_000) {
        w.write_all(piece).unwrap();
    }
    assert_eq!(w.total_in(), data.len() as u64);
    let gz = w.finish().unwrap();

    let mut r = GzReader::new(&rt, &gz[..]);
    let mut back = Vec::new();
    r.read_to_end(&mut back).unwrap();
    assert_eq!(back, data);
    assert_eq!(r.total_in(), gz.len() as u64);
}

#[test]
fn empty_stream_round_trips() {
    let rt = runtime();
    let gz = compress_streaming(&rt, b"", 0, 1, 64);
    assert!(gz.len() >= 18);
    let mut r = GzReader::new(&rt, &gz[..]);
    let mut back = Vec::new();
    assert_eq!(r.read_to_end(&mut back).unwrap(), 0);
}

#[test]
fn reused_streams_after_reset() {
    let rt = runtime();
    let header = GzipHeader::new();
    let mut d = DeflateStream::init(&rt, 3).unwrap();
    let mut i = InflateStream::init(&rt);
    let mut gz = vec![0u8; 4096];
    let mut out = vec![0u8; 4096];
    for round in 0..5u8 {
        let data = vec![round; 1000 + round as usize];
        let p = d.compress(&data, &mut gz, true, Some(&header)).unwrap();
        assert!(p.finished);
        assert_eq!(p.total_in, data.len() as u64);
        let q = i.decompress(&gz[..p.produced], &mut out, Some(&mut GzipHeader::new())).unwrap();
        assert!(q.finished);
        assert_eq!(&out[q.out_offset..q.out_offset + q.produced], &data[..]);
        d.reset();
        i.reset();
    }
}
