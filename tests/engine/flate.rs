// Integration tests for src/engine/flate.rs: the flate2-backed engine driven
// directly through the Deflater / Inflater traits.

use gzchunk::engine::{
    working_memory_size, CodecEngine, Cursors, Deflater, EngineCode, FlateEngine, Inflater, Wrapper,
};
use gzchunk::gzip::GzipHeader;

fn text(n: usize) -> Vec<u8> {
    b"It was the best of times, it was the worst of times. "
        .iter()
        .cycle()
        .take(n)
        .copied()
        .collect()
}

/// Compress `data` through the trait with a tiny output window per call.
fn deflate_in_windows(wrapper: Wrapper, data: &[u8], window: usize) -> Vec<u8> {
    let mut d = FlateEngine.deflater(1);
    let mut buf = vec![0u8; working_memory_size(1).unwrap()];
    d.begin(wrapper);
    let mut out = Vec::new();
    let mut pos = 0;
    let mut first = true;
    loop {
        let mut win = vec![0u8; window];
        let mut c = Cursors::new(&data[pos..], &mut win);
        if first && wrapper == Wrapper::Gzip {
            assert_eq!(d.write_header(&mut c, &GzipHeader::new()), EngineCode::Ok);
            first = false;
        }
        assert_eq!(d.deflate(&mut c, true, Some(&mut buf)), EngineCode::Ok);
        pos += c.consumed();
        let n = c.produced();
        out.extend_from_slice(&win[..n]);
        if d.is_finished() {
            break;
        }
    }
    assert_eq!(d.total_in(), data.len() as u64);
    assert_eq!(d.total_out(), out.len() as u64);
    out
}

#[test]
fn one_byte_windows_still_produce_valid_gzip() {
    use std::io::Read;
    let data = text(2000);
    let gz = deflate_in_windows(Wrapper::Gzip, &data, 1);
    let mut back = Vec::new();
    flate2::read::GzDecoder::new(&gz[..]).read_to_end(&mut back).unwrap();
    assert_eq!(back, data);
}

#[test]
fn raw_wrapper_is_bare_deflate() {
    use std::io::Read;
    let data = text(5000);
    let raw = deflate_in_windows(Wrapper::Raw, &data, 97);
    let mut back = Vec::new();
    flate2::read::DeflateDecoder::new(&raw[..]).read_to_end(&mut back).unwrap();
    assert_eq!(back, data);
}

#[test]
fn no_header_wrapper_appends_trailer_only() {
    let data = text(300);
    let raw = deflate_in_windows(Wrapper::Raw, &data, 4096);
    let tail = deflate_in_windows(Wrapper::GzipNoHeader, &data, 4096);
    assert_eq!(tail.len(), raw.len() + 8);
    assert_eq!(&tail[tail.len() - 4..], &(data.len() as u32).to_le_bytes());
}

#[test]
fn inflater_round_trips_in_one_byte_inputs() {
    let data = text(1500);
    let gz = deflate_in_windows(Wrapper::Gzip, &data, 512);
    let mut inf = FlateEngine.inflater();
    inf.begin(Wrapper::Gzip);
    let mut out = vec![0u8; data.len() + 16];
    let mut written = 0;
    let mut header = GzipHeader::new();
    let mut header_done = false;
    for b in gz.iter() {
        let mut c = Cursors::new(std::slice::from_ref(b), &mut out[written..]);
        if !header_done {
            match inf.read_header(&mut c, &mut header) {
                EngineCode::Ok => header_done = true,
                EngineCode::EndInput => continue,
                other => panic!("unexpected {:?}", other),
            }
        }
        let code = inf.inflate(&mut c);
        assert!(!code.is_error(), "{:?}", code);
        written += c.produced();
    }
    assert!(inf.is_finished());
    assert_eq!(&out[..written], &data[..]);
    assert_eq!(inf.total_in(), gz.len() as u64);
}

#[test]
fn stateless_inflate_reports_short_output() {
    let data = text(4000);
    let gz = deflate_in_windows(Wrapper::Gzip, &data, 8192);
    let mut inf = FlateEngine.inflater();
    inf.begin(Wrapper::Gzip);
    let mut out = vec![0u8; 100];
    let mut c = Cursors::new(&gz, &mut out);
    assert_eq!(inf.inflate_stateless(&mut c), EngineCode::OutOverflow);
    assert!(!inf.is_finished());
}

#[test]
fn write_header_after_body_is_invalid_state() {
    let mut d = FlateEngine.deflater(0);
    let mut buf = vec![0u8; working_memory_size(0).unwrap()];
    d.begin(Wrapper::Gzip);
    let mut out = vec![0u8; 256];
    let mut c = Cursors::new(b"body first", &mut out);
    assert_eq!(d.deflate(&mut c, false, Some(&mut buf)), EngineCode::Ok);
    assert_eq!(d.write_header(&mut c, &GzipHeader::new()), EngineCode::InvalidState);
}
