#![no_main]
use gzchunk::gzip::GzipHeader;
use gzchunk::stream::{DeflateStream, InflateStream};
use gzchunk::Runtime;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &[u8]| {
    // First two bytes pick the level and the window sizes; the rest is payload.
    let (level, in_chunk, window, data) = match input {
        [a, b, rest @ ..] => (u32::from(a & 3), usize::from(a >> 2) + 1, usize::from(*b) + 1, rest),
        _ => return,
    };
    let rt = Runtime::load_from("flate2").unwrap();
    let header = GzipHeader::new();

    let mut d = DeflateStream::init(&rt, level).unwrap();
    let mut buf = vec![0u8; window];
    let mut gz = Vec::new();
    let mut rest = data;
    loop {
        let take = rest.len().min(in_chunk);
        let p = d.compress(&rest[..take], &mut buf, take == rest.len(), Some(&header)).unwrap();
        gz.extend_from_slice(&buf[..p.produced]);
        rest = &rest[p.consumed..];
        if p.finished {
            break;
        }
    }

    let mut i = InflateStream::init(&rt);
    let mut got = Vec::new();
    let mut pos = 0;
    while !i.is_finished() {
        let end = (pos + in_chunk).min(gz.len());
        let p = i.decompress(&gz[pos..end], &mut buf, Some(&mut GzipHeader::new())).unwrap();
        got.extend_from_slice(&buf[p.out_offset..p.out_offset + p.produced]);
        pos += p.consumed;
        assert!(
            p.finished || p.consumed > 0 || p.produced > 0,
            "decompression stalled at {} of {} bytes",
            pos,
            gz.len()
        );
    }
    assert_eq!(pos, gz.len(), "finished before the end of the member");
    assert_eq!(got, data, "round-trip mismatch: {} bytes in, {} back", data.len(), got.len());
});
