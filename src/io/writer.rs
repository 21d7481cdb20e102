//! GZIP writer over any `Write` sink.

use std::io::{self, Write};

use crate::config::{init_c_level, CLEVEL_MAX, C_BUF_SIZE};
use crate::engine::{EngineCode, Runtime};
use crate::gzip::GzipHeader;
use crate::stream::{DeflateStream, StreamError};

/// Compresses everything written to it into one GZIP member on `inner`.
///
/// Input is fed to the stream in chunks of at most [`C_BUF_SIZE`] bytes and
/// compressed output leaves through a staging buffer of the same size.
/// Nothing is final until [`finish`](Self::finish) writes the end of the
/// stream; dropping the writer without it leaves a truncated member.
pub struct GzWriter<W: Write> {
    inner: W,
    stream: DeflateStream,
    header: GzipHeader,
    out_buf: Vec<u8>,
}

impl<W: Write> GzWriter<W> {
    /// Writer at the default level (`GZCHUNK_CLEVEL`, else 1).
    pub fn new(runtime: &Runtime, inner: W) -> Result<Self, StreamError> {
        Self::with_level(runtime, inner, init_c_level())
    }

    /// Writer at `level`; only `0..=3` are accepted.
    pub fn with_level(runtime: &Runtime, inner: W, level: u32) -> Result<Self, StreamError> {
        if level > CLEVEL_MAX {
            return Err(StreamError::Engine(EngineCode::InvalidLevel));
        }
        Ok(GzWriter {
            inner,
            stream: DeflateStream::init(runtime, level)?,
            header: GzipHeader::new(),
            out_buf: vec![0u8; C_BUF_SIZE],
        })
    }

    /// Header written ahead of the body. Changes after the first write have
    /// no effect.
    pub fn header_mut(&mut self) -> &mut GzipHeader {
        &mut self.header
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn level(&self) -> u32 {
        self.stream.level()
    }

    /// Uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Compressed bytes emitted so far.
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }

    fn step(&mut self, input: &[u8], end_of_stream: bool) -> io::Result<(usize, bool, bool)> {
        let p = self
            .stream
            .compress(input, &mut self.out_buf, end_of_stream, Some(&self.header))?;
        self.inner.write_all(&self.out_buf[..p.produced])?;
        Ok((p.consumed, p.avail_out == 0, p.finished))
    }

    /// Write the end of the stream and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        loop {
            let (_, _, finished) = self.step(&[], true)?;
            if finished {
                break;
            }
        }
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Start a new member on `inner`, keeping the stream allocation. Returns
    /// the previous sink with whatever was written to it; that member is not
    /// finished.
    pub fn reset(&mut self, inner: W) -> W {
        self.stream.reset();
        self.header = GzipHeader::new();
        std::mem::replace(&mut self.inner, inner)
    }
}

impl<W: Write> Write for GzWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut rest = buf;
        while !rest.is_empty() {
            let take = rest.len().min(C_BUF_SIZE);
            let mut chunk = &rest[..take];
            loop {
                let (consumed, out_full, _) = self.step(chunk, false)?;
                chunk = &chunk[consumed..];
                if chunk.is_empty() && !out_full {
                    break;
                }
            }
            rest = &rest[take..];
        }
        Ok(buf.len())
    }

    /// Flushes the sink only; bytes still inside the engine stay there until
    /// more input or [`GzWriter::finish`].
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
