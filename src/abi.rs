//! C-ABI surface over the buffer protocol.
//!
//! Enabled with:
//!   cargo build --release --features c-abi
//!
//! Streams and headers are opaque heap handles. Every call returns the raw
//! engine status (`>= 0` progress, `< 0` failure); contract violations return
//! `MISUSE_CODE` (-100) and allocation failures `RESOURCE_CODE` (-101).
//! Per-call cursor results are written to an optional [`GzcProgress`].

use std::ptr;
use std::slice;
use std::sync::OnceLock;

use libc::{c_int, c_uint};

use crate::engine::Runtime;
use crate::gzip::GzipHeader;
use crate::stream::{DeflateStream, InflateStream, Progress, StreamError, MISUSE_CODE};

// ─── runtime ─────────────────────────────────────────────────────────────────

static RUNTIME: OnceLock<Option<Runtime>> = OnceLock::new();

fn runtime() -> Option<&'static Runtime> {
    RUNTIME
        .get_or_init(|| {
            crate::display::init_display_level();
            Runtime::load().ok()
        })
        .as_ref()
}

// ─── helpers ─────────────────────────────────────────────────────────────────

/// Cursor results of one call, C layout.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct GzcProgress {
    pub consumed: usize,
    pub produced: usize,
    pub out_offset: usize,
    pub avail_in: usize,
    pub avail_out: usize,
    pub total_in: u64,
    pub total_out: u64,
    pub segment_out: u64,
    pub finished: c_int,
}

impl From<&Progress> for GzcProgress {
    fn from(p: &Progress) -> Self {
        GzcProgress {
            consumed: p.consumed,
            produced: p.produced,
            out_offset: p.out_offset,
            avail_in: p.avail_in,
            avail_out: p.avail_out,
            total_in: p.total_in,
            total_out: p.total_out,
            segment_out: p.segment_out,
            finished: p.finished as c_int,
        }
    }
}

unsafe fn in_slice<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        Some(&[])
    } else if ptr.is_null() {
        None
    } else {
        Some(slice::from_raw_parts(ptr, len))
    }
}

unsafe fn out_slice<'a>(ptr: *mut u8, len: usize) -> Option<&'a mut [u8]> {
    if len == 0 {
        Some(&mut [])
    } else if ptr.is_null() {
        None
    } else {
        Some(slice::from_raw_parts_mut(ptr, len))
    }
}

/// Write `result` to `progress` (if given) and turn it into a return code.
unsafe fn report(result: Result<Progress, StreamError>, progress: *mut GzcProgress) -> c_int {
    match result {
        Ok(p) => {
            if !progress.is_null() {
                *progress = GzcProgress::from(&p);
            }
            p.status.as_raw()
        }
        Err(e) => {
            crate::displaylevel!(4, "gzchunk: {}\n", e);
            e.raw_code()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime and headers
// ─────────────────────────────────────────────────────────────────────────────

/// Bind the codec engine. Returns 1 when an engine is bound, 0 otherwise.
#[no_mangle]
pub extern "C" fn gzc_ready() -> c_int {
    runtime().is_some() as c_int
}

/// A zeroed header (`os` = Unix). Free with [`gzc_header_free`].
#[no_mangle]
pub extern "C" fn gzc_header_new() -> *mut GzipHeader {
    Box::into_raw(Box::new(GzipHeader::new()))
}

#[no_mangle]
pub unsafe extern "C" fn gzc_header_free(header: *mut GzipHeader) {
    if !header.is_null() {
        drop(Box::from_raw(header));
    }
}

/// Modification time of a header, 0 for a null handle.
#[no_mangle]
pub unsafe extern "C" fn gzc_header_mtime(header: *const GzipHeader) -> c_uint {
    header.as_ref().map_or(0, |h| h.mtime as c_uint)
}

#[no_mangle]
pub unsafe extern "C" fn gzc_header_set_mtime(header: *mut GzipHeader, mtime: c_uint) {
    if let Some(h) = header.as_mut() {
        h.mtime = mtime as u32;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compression
// ─────────────────────────────────────────────────────────────────────────────

/// New compression stream at `level`, or null when no engine is bound, the
/// level is negative or working memory cannot be allocated.
#[no_mangle]
pub extern "C" fn gzc_deflate_init(level: c_int) -> *mut DeflateStream {
    let Some(rt) = runtime() else {
        return ptr::null_mut();
    };
    if level < 0 {
        return ptr::null_mut();
    }
    match DeflateStream::init(rt, level as u32) {
        Ok(s) => Box::into_raw(Box::new(s)),
        Err(_) => ptr::null_mut(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn gzc_deflate_reset(stream: *mut DeflateStream) -> c_int {
    match stream.as_mut() {
        Some(s) => {
            s.reset();
            0
        }
        None => MISUSE_CODE,
    }
}

/// Release the stream's working memory. A second call is a misuse.
#[no_mangle]
pub unsafe extern "C" fn gzc_deflate_end(stream: *mut DeflateStream) -> c_int {
    match stream.as_mut() {
        Some(s) => match s.teardown() {
            Ok(()) => 0,
            Err(e) => e.raw_code(),
        },
        None => MISUSE_CODE,
    }
}

#[no_mangle]
pub unsafe extern "C" fn gzc_deflate_free(stream: *mut DeflateStream) {
    if !stream.is_null() {
        drop(Box::from_raw(stream));
    }
}

/// One-shot compression. With `gzip` non-zero a full member is written
/// using `header` (or a default header when null).
#[no_mangle]
pub unsafe extern "C" fn gzc_deflate_stateless(
    stream: *mut DeflateStream,
    src: *const u8,
    src_len: usize,
    dst: *mut u8,
    dst_capacity: usize,
    gzip: c_int,
    header: *const GzipHeader,
    progress: *mut GzcProgress,
) -> c_int {
    let (Some(s), Some(input), Some(output)) =
        (stream.as_mut(), in_slice(src, src_len), out_slice(dst, dst_capacity))
    else {
        return MISUSE_CODE;
    };
    let default = GzipHeader::new();
    let header = if gzip != 0 {
        Some(header.as_ref().unwrap_or(&default))
    } else {
        None
    };
    report(s.compress_stateless(input, output, header), progress)
}

/// One streaming compression step.
#[no_mangle]
pub unsafe extern "C" fn gzc_deflate(
    stream: *mut DeflateStream,
    src: *const u8,
    src_len: usize,
    dst: *mut u8,
    dst_capacity: usize,
    end_of_stream: c_int,
    gzip: c_int,
    header: *const GzipHeader,
    progress: *mut GzcProgress,
) -> c_int {
    let (Some(s), Some(input), Some(output)) =
        (stream.as_mut(), in_slice(src, src_len), out_slice(dst, dst_capacity))
    else {
        return MISUSE_CODE;
    };
    let default = GzipHeader::new();
    let header = if gzip != 0 {
        Some(header.as_ref().unwrap_or(&default))
    } else {
        None
    };
    report(s.compress(input, output, end_of_stream != 0, header), progress)
}

// ─────────────────────────────────────────────────────────────────────────────
// Decompression
// ─────────────────────────────────────────────────────────────────────────────

#[no_mangle]
pub extern "C" fn gzc_inflate_init() -> *mut InflateStream {
    match runtime() {
        Some(rt) => Box::into_raw(Box::new(InflateStream::init(rt))),
        None => ptr::null_mut(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn gzc_inflate_reset(stream: *mut InflateStream) -> c_int {
    match stream.as_mut() {
        Some(s) => {
            s.reset();
            0
        }
        None => MISUSE_CODE,
    }
}

/// Free a decompression stream.
#[no_mangle]
pub unsafe extern "C" fn gzc_inflate_end(stream: *mut InflateStream) {
    if !stream.is_null() {
        drop(Box::from_raw(stream));
    }
}

/// One-shot decompression. With `gzip` non-zero the member header is parsed
/// into `header` when it is not null.
#[no_mangle]
pub unsafe extern "C" fn gzc_inflate_stateless(
    stream: *mut InflateStream,
    src: *const u8,
    src_len: usize,
    dst: *mut u8,
    dst_capacity: usize,
    gzip: c_int,
    header: *mut GzipHeader,
    progress: *mut GzcProgress,
) -> c_int {
    let (Some(s), Some(input), Some(output)) =
        (stream.as_mut(), in_slice(src, src_len), out_slice(dst, dst_capacity))
    else {
        return MISUSE_CODE;
    };
    let mut scratch = GzipHeader::new();
    let header = if gzip != 0 {
        Some(header.as_mut().unwrap_or(&mut scratch))
    } else {
        None
    };
    report(s.decompress_stateless(input, output, header), progress)
}

/// Plain streaming decompression. While a window is pending, `dst` must be
/// the same buffer (at least as long) as on the call that armed it; this
/// call's bytes start at `progress.out_offset`.
#[no_mangle]
pub unsafe extern "C" fn gzc_inflate(
    stream: *mut InflateStream,
    src: *const u8,
    src_len: usize,
    dst: *mut u8,
    dst_capacity: usize,
    gzip: c_int,
    header: *mut GzipHeader,
    progress: *mut GzcProgress,
) -> c_int {
    let (Some(s), Some(input), Some(output)) =
        (stream.as_mut(), in_slice(src, src_len), out_slice(dst, dst_capacity))
    else {
        return MISUSE_CODE;
    };
    let mut scratch = GzipHeader::new();
    let header = if gzip != 0 {
        Some(header.as_mut().unwrap_or(&mut scratch))
    } else {
        None
    };
    report(s.decompress(input, output, header), progress)
}

/// Buffered streaming decompression; `total_so_far == 0` starts a new output
/// segment.
#[no_mangle]
pub unsafe extern "C" fn gzc_inflate_buffered(
    stream: *mut InflateStream,
    src: *const u8,
    src_len: usize,
    dst: *mut u8,
    dst_capacity: usize,
    total_so_far: u64,
    gzip: c_int,
    header: *mut GzipHeader,
    progress: *mut GzcProgress,
) -> c_int {
    let (Some(s), Some(input), Some(output)) =
        (stream.as_mut(), in_slice(src, src_len), out_slice(dst, dst_capacity))
    else {
        return MISUSE_CODE;
    };
    let mut scratch = GzipHeader::new();
    let header = if gzip != 0 {
        Some(header.as_mut().unwrap_or(&mut scratch))
    } else {
        None
    };
    report(s.decompress_buffered(input, output, header, total_so_far), progress)
}
