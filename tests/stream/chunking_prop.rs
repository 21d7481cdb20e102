// Property: any split of the input and any output window size yields the
// same bytes back, and decompression finishes exactly at the end of input.

use proptest::prelude::*;

use gzchunk::engine::Runtime;
use gzchunk::gzip::GzipHeader;
use gzchunk::stream::{DeflateStream, InflateStream};

const MAX_CALLS: usize = 1 << 20;

fn runtime() -> Runtime {
    Runtime::load_from("flate2").unwrap()
}

fn compress_chunked(data: &[u8], level: u32, in_chunk: usize, window: usize) -> Vec<u8> {
    let header = GzipHeader::new();
    let mut s = DeflateStream::init(&runtime(), level).unwrap();
    let mut buf = vec![0u8; window];
    let mut gz = Vec::new();
    let mut rest = data;
    for _ in 0..MAX_CALLS {
        let take = rest.len().min(in_chunk);
        let eos = take == rest.len();
        let p = s.compress(&rest[..take], &mut buf, eos, Some(&header)).unwrap();
        gz.extend_from_slice(&buf[..p.produced]);
        rest = &rest[p.consumed..];
        if p.finished {
            assert!(rest.is_empty());
            return gz;
        }
    }
    panic!("compression made no progress");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_chunked_round_trip(
        data in prop::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), any::<u8>()], 0..4096),
        level in 0u32..=3,
        in_chunk in 1usize..512,
        c_window in 1usize..256,
        d_window in 1usize..256,
    ) {
        let gz = compress_chunked(&data, level, in_chunk, c_window);

        let mut s = InflateStream::init(&runtime());
        let mut buf = vec![0u8; d_window];
        let mut got = Vec::new();
        let mut pos = 0;
        let mut calls = 0;
        loop {
            let end = (pos + in_chunk).min(gz.len());
            let p = s.decompress(&gz[pos..end], &mut buf, Some(&mut GzipHeader::new())).unwrap();
            got.extend_from_slice(&buf[p.out_offset..p.out_offset + p.produced]);
            pos += p.consumed;
            if p.finished {
                break;
            }
            prop_assert!(pos < gz.len() || p.produced > 0, "stalled at {} of {}", pos, gz.len());
            calls += 1;
            prop_assert!(calls < MAX_CALLS);
        }
        prop_assert_eq!(pos, gz.len());
        prop_assert_eq!(got, data);
    }

    #[test]
    fn prop_buffered_segments_sum_to_total(
        data in prop::collection::vec(any::<u8>(), 1..4096),
        in_chunk in 1usize..300,
        d_window in 1usize..300,
        restart_every in 1usize..8,
    ) {
        let gz = gzchunk::compress_bytes(&runtime(), &data, 1).unwrap();
        let mut s = InflateStream::init(&runtime());
        let mut buf = vec![0u8; d_window];
        let mut pos = 0;
        let mut segment = 0u64;
        let mut segments_total = 0u64;
        let mut calls = 0usize;
        loop {
            let end = (pos + in_chunk).min(gz.len());
            let so_far = if calls % restart_every == 0 { 0 } else { segment };
            if so_far == 0 {
                segments_total += segment;
            }
            let p = s.decompress_buffered(&gz[pos..end], &mut buf, Some(&mut GzipHeader::new()), so_far).unwrap();
            pos += p.consumed;
            segment = p.segment_out;
            calls += 1;
            if p.finished {
                segments_total += segment;
                prop_assert_eq!(p.total_out, data.len() as u64);
                break;
            }
            prop_assert!(calls < MAX_CALLS);
        }
        prop_assert_eq!(segments_total, data.len() as u64);
    }
}
