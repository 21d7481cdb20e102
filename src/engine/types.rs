//! Codec engine contract: status codes, cursors, wrappers and the traits a
//! DEFLATE/GZIP engine implements.
//!
//! The buffer protocol in [`crate::stream`] only ever talks to an engine
//! through [`Deflater`] / [`Inflater`]; it never looks inside beyond the
//! published `is_finished` / `total_*` accessors.

use core::fmt;

use crate::gzip::GzipHeader;

// ─────────────────────────────────────────────────────────────────────────────
// Status codes
// ─────────────────────────────────────────────────────────────────────────────

/// Engine status codes.
///
/// Non-negative values are informational, negative values are failures.
/// The raw numbering is stable: it is what the C ABI hands back to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineCode {
    /// 0: step completed normally.
    Ok,
    /// 1: input ran out before the unit was complete.
    EndInput,
    /// 2: output capacity ran out before the unit was complete.
    OutOverflow,
    /// -1: the deflate bit stream is corrupt.
    InvalidBlock,
    /// -2: the GZIP envelope is malformed (magic, reserved flags).
    InvalidWrapper,
    /// -3: the GZIP header names a method other than DEFLATE.
    UnsupportedMethod,
    /// -4: header CRC-16, payload CRC-32 or ISIZE mismatch.
    IncorrectChecksum,
    /// -5: the header file name exceeds the parser limit.
    NameOverflow,
    /// -6: the header comment exceeds the parser limit.
    CommentOverflow,
    /// -7: one-shot compression did not fit the output buffer.
    StatelessOverflow,
    /// -8: the compression level has no working-memory tier.
    InvalidLevel,
    /// -9: working memory is absent or smaller than the level requires.
    InvalidLevelBuf,
    /// -10: the engine was driven out of order.
    InvalidState,
}

impl EngineCode {
    /// Stable raw value.
    pub fn as_raw(self) -> i32 {
        match self {
            EngineCode::Ok => 0,
            EngineCode::EndInput => 1,
            EngineCode::OutOverflow => 2,
            EngineCode::InvalidBlock => -1,
            EngineCode::InvalidWrapper => -2,
            EngineCode::UnsupportedMethod => -3,
            EngineCode::IncorrectChecksum => -4,
            EngineCode::NameOverflow => -5,
            EngineCode::CommentOverflow => -6,
            EngineCode::StatelessOverflow => -7,
            EngineCode::InvalidLevel => -8,
            EngineCode::InvalidLevelBuf => -9,
            EngineCode::InvalidState => -10,
        }
    }

    /// Inverse of [`as_raw`](Self::as_raw); `None` for unassigned values.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(EngineCode::Ok),
            1 => Some(EngineCode::EndInput),
            2 => Some(EngineCode::OutOverflow),
            -1 => Some(EngineCode::InvalidBlock),
            -2 => Some(EngineCode::InvalidWrapper),
            -3 => Some(EngineCode::UnsupportedMethod),
            -4 => Some(EngineCode::IncorrectChecksum),
            -5 => Some(EngineCode::NameOverflow),
            -6 => Some(EngineCode::CommentOverflow),
            -7 => Some(EngineCode::StatelessOverflow),
            -8 => Some(EngineCode::InvalidLevel),
            -9 => Some(EngineCode::InvalidLevelBuf),
            -10 => Some(EngineCode::InvalidState),
            _ => None,
        }
    }

    /// `true` for the negative (failure) codes.
    #[inline]
    pub fn is_error(self) -> bool {
        self.as_raw() < 0
    }

    pub fn error_name(self) -> &'static str {
        match self {
            EngineCode::Ok => "ok",
            EngineCode::EndInput => "end of input reached",
            EngineCode::OutOverflow => "output buffer full",
            EngineCode::InvalidBlock => "invalid deflate block",
            EngineCode::InvalidWrapper => "invalid gzip wrapper",
            EngineCode::UnsupportedMethod => "unsupported compression method",
            EngineCode::IncorrectChecksum => "incorrect checksum",
            EngineCode::NameOverflow => "header name too long",
            EngineCode::CommentOverflow => "header comment too long",
            EngineCode::StatelessOverflow => "stateless overflow",
            EngineCode::InvalidLevel => "invalid level",
            EngineCode::InvalidLevelBuf => "invalid level buffer",
            EngineCode::InvalidState => "invalid engine state",
        }
    }
}

impl fmt::Display for EngineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.error_name(), self.as_raw())
    }
}

impl std::error::Error for EngineCode {}

// ─────────────────────────────────────────────────────────────────────────────
// Working memory tiers
// ─────────────────────────────────────────────────────────────────────────────

/// Working-memory bytes per compression level, index = level.
pub const LEVEL_BUF_SIZES: [usize; 4] = [
    32 * 1024,                // level 0
    4 * 1024 + 272 * 1024,    // level 1
    4 * 1024 + 528 * 1024,    // level 2
    4 * 1024 + 1040 * 1024,   // level 3
];

/// Working memory required by `level`, or `None` when the level has no tier.
#[inline]
pub fn working_memory_size(level: u32) -> Option<usize> {
    LEVEL_BUF_SIZES.get(level as usize).copied()
}

// ─────────────────────────────────────────────────────────────────────────────
// Wrapper
// ─────────────────────────────────────────────────────────────────────────────

/// Container framing around the deflate body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrapper {
    /// Bare deflate: no header, no trailer.
    #[default]
    Raw,
    /// Full GZIP member: header written/parsed, trailer written/verified.
    Gzip,
    /// GZIP trailer only; the header is someone else's business.
    GzipNoHeader,
}

impl Wrapper {
    #[inline]
    pub fn has_trailer(self) -> bool {
        !matches!(self, Wrapper::Raw)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cursors
// ─────────────────────────────────────────────────────────────────────────────

/// Input and output cursors for one engine call.
///
/// `next_in` / `next_out` are offsets into the borrowed slices; everything
/// before them has been consumed / written during this call.
pub struct Cursors<'a> {
    input: &'a [u8],
    next_in: usize,
    output: &'a mut [u8],
    next_out: usize,
}

impl<'a> Cursors<'a> {
    pub fn new(input: &'a [u8], output: &'a mut [u8]) -> Self {
        Cursors { input, next_in: 0, output, next_out: 0 }
    }

    #[inline]
    pub fn avail_in(&self) -> usize {
        self.input.len() - self.next_in
    }

    #[inline]
    pub fn avail_out(&self) -> usize {
        self.output.len() - self.next_out
    }

    /// Bytes consumed so far in this call.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.next_in
    }

    /// Bytes written so far in this call.
    #[inline]
    pub fn produced(&self) -> usize {
        self.next_out
    }

    /// Unconsumed input.
    #[inline]
    pub fn pending_input(&self) -> &'a [u8] {
        &self.input[self.next_in..]
    }

    /// Unconsumed input and unwritten output, borrowed together.
    #[inline]
    pub fn split(&mut self) -> (&'a [u8], &mut [u8]) {
        (&self.input[self.next_in..], &mut self.output[self.next_out..])
    }

    #[inline]
    pub fn advance_in(&mut self, n: usize) {
        debug_assert!(n <= self.avail_in());
        self.next_in += n;
    }

    #[inline]
    pub fn advance_out(&mut self, n: usize) {
        debug_assert!(n <= self.avail_out());
        self.next_out += n;
    }

    /// Copy as much of `bytes` as fits into the output; returns the count.
    pub fn put(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.avail_out());
        self.output[self.next_out..self.next_out + n].copy_from_slice(&bytes[..n]);
        self.next_out += n;
        n
    }

    /// Consume up to `n` input bytes and return them.
    pub fn take(&mut self, n: usize) -> &'a [u8] {
        let n = n.min(self.avail_in());
        let start = self.next_in;
        self.next_in += n;
        &self.input[start..start + n]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine traits
// ─────────────────────────────────────────────────────────────────────────────

/// One compression context.
pub trait Deflater: Send {
    /// Start a new stream body with `wrapper` framing. Counters are kept.
    fn begin(&mut self, wrapper: Wrapper);

    /// `Ok` when `level_buf` is usable working memory for this context's
    /// level, otherwise `InvalidLevel` or `InvalidLevelBuf`. Writes nothing.
    fn check_memory(&self, level_buf: Option<&[u8]>) -> EngineCode;

    /// Emit `header` ahead of the body. Bytes that do not fit the output are
    /// staged and drained by the next step.
    fn write_header(&mut self, cursors: &mut Cursors<'_>, header: &GzipHeader) -> EngineCode;

    /// One streaming step. `end_of_stream` is sticky once seen.
    fn deflate(
        &mut self,
        cursors: &mut Cursors<'_>,
        end_of_stream: bool,
        level_buf: Option<&mut [u8]>,
    ) -> EngineCode;

    /// Compress everything in one step; `StatelessOverflow` when the output is
    /// too small to hold the whole unit.
    fn deflate_stateless(
        &mut self,
        cursors: &mut Cursors<'_>,
        level_buf: Option<&mut [u8]>,
    ) -> EngineCode;

    /// Terminal phase reached: body, trailer and staged bytes all written.
    fn is_finished(&self) -> bool;

    /// Input bytes consumed since the last [`reset`](Self::reset).
    fn total_in(&self) -> u64;

    /// Output bytes produced since the last [`reset`](Self::reset).
    fn total_out(&self) -> u64;

    /// Back to the freshly initialised state, counters zeroed.
    fn reset(&mut self);
}

/// One decompression context.
pub trait Inflater: Send {
    /// Start a new stream with `wrapper` framing. Counters are kept.
    fn begin(&mut self, wrapper: Wrapper);

    /// Parse the GZIP header from the input. `EndInput` means the header is
    /// not complete yet and parsing resumes on the next call.
    fn read_header(&mut self, cursors: &mut Cursors<'_>, header: &mut GzipHeader) -> EngineCode;

    /// One streaming step.
    fn inflate(&mut self, cursors: &mut Cursors<'_>) -> EngineCode;

    /// Decompress a complete unit in one step; `EndInput` / `OutOverflow`
    /// when it could not be finished.
    fn inflate_stateless(&mut self, cursors: &mut Cursors<'_>) -> EngineCode;

    /// Final block decoded and, for GZIP framing, trailer verified.
    fn is_finished(&self) -> bool;

    fn total_in(&self) -> u64;

    fn total_out(&self) -> u64;

    fn reset(&mut self);
}

/// A codec engine: a factory for compression and decompression contexts.
pub trait CodecEngine: Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// A compression context for `level`. Levels without a working-memory
    /// tier still construct; the first step reports `InvalidLevel`.
    fn deflater(&self, level: u32) -> Box<dyn Deflater>;

    fn inflater(&self) -> Box<dyn Inflater>;
}
