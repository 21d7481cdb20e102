// Buffered decompression: fresh output per call and segment counters.

use gzchunk::engine::{EngineCode, Runtime};
use gzchunk::gzip::GzipHeader;
use gzchunk::stream::{InflateStream, StreamPhase};

fn runtime() -> Runtime {
    Runtime::load_from("flate2").unwrap()
}

fn member(data: &[u8]) -> Vec<u8> {
    gzchunk::compress_bytes(&runtime(), data, 1).unwrap()
}

#[test]
fn output_is_rearmed_every_call() {
    let data: Vec<u8> = (0..5000u32).map(|i| (i * 7 % 256) as u8).collect();
    let gz = member(&data);
    let mut s = InflateStream::init(&runtime());
    let mut got = Vec::new();
    let mut pos = 0;
    let mut so_far = 0;
    while !s.is_finished() {
        // A new, smaller buffer every call is fine for this mode.
        let mut out = vec![0u8; 100 + got.len() % 37];
        let p = s
            .decompress_buffered(&gz[pos..], &mut out, Some(&mut GzipHeader::new()), so_far)
            .unwrap();
        assert_eq!(p.out_offset, 0);
        got.extend_from_slice(&out[..p.produced]);
        pos += p.consumed;
        so_far = p.segment_out;
    }
    assert_eq!(got, data);
    assert_eq!(so_far, data.len() as u64);
}

/// Three 1000-byte calls over a 3000-byte member, optionally restarting the
/// segment on the last one.
fn three_calls(gz: &[u8], restart_last: bool) -> Vec<gzchunk::Progress> {
    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 1000];
    let mut pos = 0;
    let mut so_far = 0;
    let mut seen = Vec::new();
    for call in 0..3 {
        let mut header = (call == 0).then(GzipHeader::new);
        if call == 2 && restart_last {
            so_far = 0;
        }
        let p = s.decompress_buffered(&gz[pos..], &mut out, header.as_mut(), so_far).unwrap();
        pos += p.consumed;
        so_far = p.segment_out;
        seen.push(p);
    }
    seen
}

#[test]
fn zero_total_starts_a_new_segment() {
    let data = vec![0x5au8; 3000];
    let gz = member(&data);
    let seen = three_calls(&gz, true);
    let (p1, p2, p3) = (&seen[0], &seen[1], &seen[2]);

    assert_eq!(p1.produced, 1000);
    assert_eq!(p1.segment_out, 1000);
    assert_eq!(p2.segment_out, 2000);
    assert_eq!(p2.total_out, 2000);

    // Restarting the segment counts only this call's output.
    assert_eq!(p3.segment_out, p3.produced as u64);
    assert_eq!(p3.total_out, 3000);
    assert!(p3.finished);
}

#[test]
fn segment_restart_leaves_remaining_counts_alone() {
    let data = vec![0x5au8; 3000];
    let gz = member(&data);
    let restarted = three_calls(&gz, true);
    let running = three_calls(&gz, false);
    for (a, b) in restarted.iter().zip(&running) {
        assert_eq!((a.consumed, a.produced), (b.consumed, b.produced));
        assert_eq!((a.avail_in, a.avail_out), (b.avail_in, b.avail_out));
        assert_eq!((a.total_in, a.total_out), (b.total_in, b.total_out));
    }
    assert_eq!(restarted[2].avail_in, 0);
    assert_eq!(restarted[2].avail_out, 1000 - restarted[2].produced);
    assert_eq!(running[2].segment_out, 3000);
    assert_eq!(restarted[2].segment_out, 1000);
}

#[test]
fn empty_input_before_header_is_pending() {
    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 16];
    let p = s.decompress_buffered(&[], &mut out, Some(&mut GzipHeader::new()), 0).unwrap();
    assert_eq!(p.status, EngineCode::EndInput);
    assert_eq!((p.consumed, p.produced), (0, 0));
    assert_eq!(s.phase(), StreamPhase::AwaitingHeader);
}

#[test]
fn reset_returns_to_idle_with_zero_counters() {
    let gz = member(b"reset me");
    let mut s = InflateStream::init(&runtime());
    let mut out = vec![0u8; 64];
    let p = s.decompress_buffered(&gz, &mut out, Some(&mut GzipHeader::new()), 0).unwrap();
    assert!(p.finished);
    s.reset();
    assert_eq!(s.phase(), StreamPhase::Idle);
    assert_eq!((s.total_in(), s.total_out()), (0, 0));
    assert!(s.gzip_header().is_none());

    // The reset stream decodes a second member from scratch.
    let p = s.decompress_buffered(&gz, &mut out, Some(&mut GzipHeader::new()), 0).unwrap();
    assert!(p.finished);
    assert_eq!(&out[..p.produced], b"reset me");
    assert_eq!(p.total_in, gz.len() as u64);
}
