#![no_main]
use gzchunk::gzip::GzipHeader;
use gzchunk::stream::InflateStream;
use gzchunk::Runtime;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce an error or a bounded result.
    let rt = Runtime::load_from("flate2").unwrap();
    let _ = gzchunk::decompress_bytes(&rt, data);

    let mut s = InflateStream::init(&rt);
    let mut out = vec![0u8; 4096];
    let mut pos = 0;
    let mut so_far = 0;
    for _ in 0..1024 {
        match s.decompress_buffered(&data[pos..], &mut out, Some(&mut GzipHeader::new()), so_far) {
            Ok(p) => {
                pos += p.consumed;
                so_far = p.segment_out;
                if p.finished || (p.consumed == 0 && p.produced == 0) {
                    break;
                }
            }
            Err(_) => break,
        }
    }

    let mut raw = InflateStream::init(&rt);
    let _ = raw.decompress_stateless(data, &mut out, None);
});
