//! `std::io` adapters over the buffer protocol.
//!
//! [`GzWriter`] and [`GzReader`] own a stream and a bounded staging buffer
//! and run the call loop the protocol leaves to its caller.
//! [`compress_bytes`] / [`decompress_bytes`] do the same for whole buffers.

pub mod reader;
pub mod writer;

use std::io;

use crate::config::C_BUF_SIZE;
use crate::engine::{EngineCode, Runtime};
use crate::gzip::{GzipHeader, TRAILER_SIZE};
use crate::stream::{DeflateStream, InflateStream, StreamError};

pub use reader::GzReader;
pub use writer::GzWriter;

impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> Self {
        let kind = match &e {
            StreamError::Engine(EngineCode::EndInput) => io::ErrorKind::UnexpectedEof,
            StreamError::Engine(_) => io::ErrorKind::InvalidData,
            StreamError::Misuse(_) => io::ErrorKind::InvalidInput,
            StreamError::Resource(_) => io::ErrorKind::OutOfMemory,
        };
        io::Error::new(kind, e)
    }
}

/// Upper bound on the GZIP member produced for `len` input bytes with
/// `header`.
pub fn compress_bound(len: usize, header: &GzipHeader) -> usize {
    len + (len >> 12) + (len >> 14) + (len >> 25) + 64 + header.encoded_len() + TRAILER_SIZE
}

/// Compress `input` into one GZIP member with a default header.
///
/// Inputs shorter than one compression chunk go through the stateless path
/// with an output buffer of [`compress_bound`] bytes; longer inputs are
/// streamed chunk by chunk.
pub fn compress_bytes(runtime: &Runtime, input: &[u8], level: u32) -> Result<Vec<u8>, StreamError> {
    let header = GzipHeader::new();
    let mut stream = DeflateStream::init(runtime, level)?;

    if input.len() < C_BUF_SIZE {
        let mut out = vec![0u8; compress_bound(input.len(), &header)];
        let p = stream.compress_stateless(input, &mut out, Some(&header))?;
        out.truncate(p.produced);
        return Ok(out);
    }

    let mut out = Vec::with_capacity(input.len() / 2);
    let mut buf = vec![0u8; C_BUF_SIZE];
    let mut rest = input;
    loop {
        let take = rest.len().min(C_BUF_SIZE);
        let end_of_stream = take == rest.len();
        let p = stream.compress(&rest[..take], &mut buf, end_of_stream, Some(&header))?;
        out.extend_from_slice(&buf[..p.produced]);
        rest = &rest[p.consumed..];
        if p.finished {
            break;
        }
    }
    Ok(out)
}

/// Decompress one GZIP member.
///
/// Bytes after the member's trailer are ignored. A member cut short is
/// reported as `Engine(EndInput)`.
pub fn decompress_bytes(runtime: &Runtime, input: &[u8]) -> Result<Vec<u8>, StreamError> {
    let mut stream = InflateStream::init(runtime);
    let mut header = GzipHeader::new();
    let mut out = Vec::with_capacity(input.len().saturating_mul(2));
    let mut buf = vec![0u8; C_BUF_SIZE];
    let mut pos = 0;
    loop {
        let p = stream.decompress(&input[pos..], &mut buf, Some(&mut header))?;
        out.extend_from_slice(&buf[p.out_offset..p.out_offset + p.produced]);
        pos += p.consumed;
        if p.finished {
            return Ok(out);
        }
        if p.consumed == 0 && p.produced == 0 {
            return Err(StreamError::Engine(EngineCode::EndInput));
        }
    }
}
