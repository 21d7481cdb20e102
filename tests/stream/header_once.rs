// The header flag is honoured on the first streaming call only. A counting
// engine wrapped around FlateEngine records how often the header hooks run.

use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gzchunk::engine::{
    CodecEngine, Cursors, Deflater, EngineCode, FlateEngine, Inflater, Runtime, Wrapper,
};
use gzchunk::gzip::GzipHeader;
use gzchunk::stream::{DeflateStream, InflateStream};

#[derive(Default)]
struct Counts {
    header_writes: AtomicUsize,
    header_reads_done: AtomicUsize,
}

struct CountingEngine {
    counts: Arc<Counts>,
}

struct CountingDeflater {
    inner: Box<dyn Deflater>,
    counts: Arc<Counts>,
}

struct CountingInflater {
    inner: Box<dyn Inflater>,
    counts: Arc<Counts>,
}

impl CodecEngine for CountingEngine {
    fn name(&self) -> &str {
        "counting"
    }

    fn deflater(&self, level: u32) -> Box<dyn Deflater> {
        Box::new(CountingDeflater { inner: FlateEngine.deflater(level), counts: self.counts.clone() })
    }

    fn inflater(&self) -> Box<dyn Inflater> {
        Box::new(CountingInflater { inner: FlateEngine.inflater(), counts: self.counts.clone() })
    }
}

impl Deflater for CountingDeflater {
    fn begin(&mut self, wrapper: Wrapper) {
        self.inner.begin(wrapper)
    }

    fn check_memory(&self, level_buf: Option<&[u8]>) -> EngineCode {
        self.inner.check_memory(level_buf)
    }

    fn write_header(&mut self, cursors: &mut Cursors<'_>, header: &GzipHeader) -> EngineCode {
        self.counts.header_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_header(cursors, header)
    }

    fn deflate(
        &mut self,
        cursors: &mut Cursors<'_>,
        end_of_stream: bool,
        level_buf: Option<&mut [u8]>,
    ) -> EngineCode {
        self.inner.deflate(cursors, end_of_stream, level_buf)
    }

    fn deflate_stateless(
        &mut self,
        cursors: &mut Cursors<'_>,
        level_buf: Option<&mut [u8]>,
    ) -> EngineCode {
        self.inner.deflate_stateless(cursors, level_buf)
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    fn total_out(&self) -> u64 {
        self.inner.total_out()
    }

    fn reset(&mut self) {
        self.inner.reset()
    }
}

impl Inflater for CountingInflater {
    fn begin(&mut self, wrapper: Wrapper) {
        self.inner.begin(wrapper)
    }

    fn read_header(&mut self, cursors: &mut Cursors<'_>, header: &mut GzipHeader) -> EngineCode {
        let code = self.inner.read_header(cursors, header);
        if code == EngineCode::Ok {
            self.counts.header_reads_done.fetch_add(1, Ordering::SeqCst);
        }
        code
    }

    fn inflate(&mut self, cursors: &mut Cursors<'_>) -> EngineCode {
        self.inner.inflate(cursors)
    }

    fn inflate_stateless(&mut self, cursors: &mut Cursors<'_>) -> EngineCode {
        self.inner.inflate_stateless(cursors)
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    fn total_out(&self) -> u64 {
        self.inner.total_out()
    }

    fn reset(&mut self) {
        self.inner.reset()
    }
}

fn counting_runtime() -> (Runtime, Arc<Counts>) {
    let counts = Arc::new(Counts::default());
    let rt = Runtime::with_engine(Arc::new(CountingEngine { counts: counts.clone() }));
    (rt, counts)
}

#[test]
fn compress_writes_header_once_per_stream() {
    let (rt, counts) = counting_runtime();
    let header = GzipHeader::new();
    let mut s = DeflateStream::init(&rt, 1).unwrap();
    let mut gz = Vec::new();
    let mut out = vec![0u8; 1024];
    for (chunk, eos) in [(&b"one "[..], false), (b"two ", false), (b"three", true)] {
        let p = s.compress(chunk, &mut out, eos, Some(&header)).unwrap();
        assert_eq!(p.consumed, chunk.len());
        gz.extend_from_slice(&out[..p.produced]);
    }
    assert!(s.is_finished());
    assert_eq!(counts.header_writes.load(Ordering::SeqCst), 1);

    let mut back = String::new();
    flate2::read::GzDecoder::new(&gz[..]).read_to_string(&mut back).unwrap();
    assert_eq!(back, "one two three");
}

#[test]
fn reset_allows_a_new_header() {
    let (rt, counts) = counting_runtime();
    let header = GzipHeader::new();
    let mut s = DeflateStream::init(&rt, 0).unwrap();
    let mut out = vec![0u8; 256];
    for _ in 0..3 {
        let p = s.compress(b"again", &mut out, true, Some(&header)).unwrap();
        assert!(p.finished);
        s.reset();
    }
    assert_eq!(counts.header_writes.load(Ordering::SeqCst), 3);
}

#[test]
fn decompress_reads_header_once_per_stream() {
    let (rt, counts) = counting_runtime();
    let data = b"header parsed exactly once ".repeat(40);
    let gz = gzchunk::compress_bytes(&rt, &data, 2).unwrap();
    assert_eq!(counts.header_writes.load(Ordering::SeqCst), 1);

    let mut s = InflateStream::init(&rt);
    let mut out = vec![0u8; data.len() + 64];
    let mut got = Vec::new();
    let mut pos = 0;
    while !s.is_finished() {
        let end = (pos + 64).min(gz.len());
        let mut header = GzipHeader::new();
        let p = s.decompress_buffered(&gz[pos..end], &mut out, Some(&mut header), 1).unwrap();
        pos += p.consumed;
        got.extend_from_slice(&out[..p.produced]);
    }
    assert_eq!(got, data);
    assert_eq!(counts.header_reads_done.load(Ordering::SeqCst), 1);
}
