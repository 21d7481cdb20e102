//! GZIP reader over any `Read` source.

use std::io::{self, Read};

use crate::config::D_BUF_SIZE;
use crate::engine::{EngineCode, Runtime};
use crate::gzip::GzipHeader;
use crate::stream::{InflateStream, StreamError};

/// Decompresses one GZIP member read from `inner`.
///
/// Compressed bytes are pulled into a [`D_BUF_SIZE`] buffer and decoded
/// straight into the caller's buffer with buffered decompression, which
/// arms each call's output afresh. Reads return `Ok(0)` once the member's
/// trailer has been verified; anything after it is left unread.
pub struct GzReader<R: Read> {
    inner: R,
    stream: InflateStream,
    header: GzipHeader,
    in_buf: Vec<u8>,
    in_pos: usize,
    in_len: usize,
    eof: bool,
    segment_out: u64,
}

impl<R: Read> GzReader<R> {
    pub fn new(runtime: &Runtime, inner: R) -> Self {
        GzReader {
            inner,
            stream: InflateStream::init(runtime),
            header: GzipHeader::new(),
            in_buf: vec![0u8; D_BUF_SIZE],
            in_pos: 0,
            in_len: 0,
            eof: false,
            segment_out: 0,
        }
    }

    /// The member header, once it has been parsed.
    pub fn header(&self) -> Option<&GzipHeader> {
        self.stream.gzip_header()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Compressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Decompressed bytes returned so far.
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }

    /// Read a new member from `inner`, keeping the allocations. Returns the
    /// previous source.
    pub fn reset(&mut self, inner: R) -> R {
        self.stream.reset();
        self.header = GzipHeader::new();
        self.in_pos = 0;
        self.in_len = 0;
        self.eof = false;
        self.segment_out = 0;
        std::mem::replace(&mut self.inner, inner)
    }

    fn refill(&mut self) -> io::Result<()> {
        loop {
            match self.inner.read(&mut self.in_buf) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => {
                    self.in_pos = 0;
                    self.in_len = n;
                    break;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<R: Read> Read for GzReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() || self.stream.is_finished() {
            return Ok(0);
        }
        loop {
            if self.in_pos == self.in_len && !self.eof {
                self.refill()?;
            }
            let p = self.stream.decompress_buffered(
                &self.in_buf[self.in_pos..self.in_len],
                out,
                Some(&mut self.header),
                self.segment_out,
            )?;
            self.in_pos += p.consumed;
            self.segment_out = p.segment_out;
            if p.produced > 0 {
                return Ok(p.produced);
            }
            if p.finished {
                return Ok(0);
            }
            if self.eof && self.in_pos == self.in_len {
                return Err(StreamError::Engine(EngineCode::EndInput).into());
            }
        }
    }
}
