//! Stream state, per-call results and the error types of the buffer protocol.

use core::fmt;
use std::collections::TryReserveError;

use crate::engine::{Cursors, EngineCode};

/// Raw code reported through the C ABI for every [`Misuse`].
pub const MISUSE_CODE: i32 = -100;
/// Raw code reported through the C ABI for allocation failures.
pub const RESOURCE_CODE: i32 = -101;

// ─────────────────────────────────────────────────────────────────────────────
// Phase
// ─────────────────────────────────────────────────────────────────────────────

/// Where a stream is in its lifecycle.
///
/// `Idle` is the only state in which the header flag is honoured; once a
/// stream leaves it, the framing chosen on that first call is fixed until
/// `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamPhase {
    /// Freshly initialised or reset; the next streaming call is the first.
    #[default]
    Idle,
    /// Decompression only: the GZIP header has started but not finished
    /// arriving.
    AwaitingHeader,
    /// Body in progress.
    Streaming,
    /// Terminal. Only `reset` leaves this state.
    Finished,
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-call result
// ─────────────────────────────────────────────────────────────────────────────

/// What one protocol call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Input bytes consumed by this call, from the start of the input slice.
    pub consumed: usize,
    /// Output bytes written by this call.
    pub produced: usize,
    /// Offset in the caller's output buffer where this call's bytes begin.
    /// Always 0 except for plain decompression continuing a window.
    pub out_offset: usize,
    /// Input left unconsumed.
    pub avail_in: usize,
    /// Output capacity left in the armed window.
    pub avail_out: usize,
    /// Cumulative input consumed by the stream.
    pub total_in: u64,
    /// Cumulative output produced by the stream.
    pub total_out: u64,
    /// Output produced since the last segment mark (buffered decompression);
    /// equal to `total_out` unless a segment was started.
    pub segment_out: u64,
    /// The engine reached its terminal phase.
    pub finished: bool,
    /// Non-error engine status for this call.
    pub status: EngineCode,
}

impl Progress {
    pub(crate) fn of(cursors: &Cursors<'_>, status: EngineCode) -> Self {
        Progress {
            consumed: cursors.consumed(),
            produced: cursors.produced(),
            out_offset: 0,
            avail_in: cursors.avail_in(),
            avail_out: cursors.avail_out(),
            total_in: 0,
            total_out: 0,
            segment_out: 0,
            finished: false,
            status,
        }
    }

    pub(crate) fn with_totals(mut self, total_in: u64, total_out: u64) -> Self {
        self.total_in = total_in;
        self.total_out = total_out;
        self.segment_out = total_out;
        self
    }
}

/// The armed part of the caller's output buffer during plain streaming
/// decompression: `pos..cap` is still unwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputWindow {
    pub pos: usize,
    pub cap: usize,
}

impl OutputWindow {
    pub fn new(cap: usize) -> Self {
        OutputWindow { pos: 0, cap }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.cap - self.pos
    }

    #[inline]
    pub fn is_drained(&self) -> bool {
        self.pos == self.cap
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Caller contract violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misuse {
    /// Stateless compression returned with input left over.
    InputNotConsumed { remaining: usize },
    /// The stream already finished; `reset` it first.
    AfterFinish,
    /// The working memory was already released.
    DoubleTeardown,
    /// A stateless call was made on a stream with a streaming call in flight.
    StreamInProgress,
    /// A continuation call supplied a smaller buffer than the armed window.
    OutputWindowShrunk { window: usize, supplied: usize },
}

impl fmt::Display for Misuse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Misuse::InputNotConsumed { remaining } => {
                write!(f, "stateless compression left {} input bytes unconsumed", remaining)
            }
            Misuse::AfterFinish => f.write_str("stream already finished; reset before reuse"),
            Misuse::DoubleTeardown => f.write_str("working memory already released"),
            Misuse::StreamInProgress => f.write_str("stateless call on a stream in progress"),
            Misuse::OutputWindowShrunk { window, supplied } => write!(
                f,
                "output buffer of {} bytes does not cover the armed window of {} bytes",
                supplied, window
            ),
        }
    }
}

impl std::error::Error for Misuse {}

/// Any failure of a protocol call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Negative engine status, passed through verbatim.
    Engine(EngineCode),
    Misuse(Misuse),
    /// Working memory could not be allocated.
    Resource(TryReserveError),
}

impl StreamError {
    /// Raw code for the C ABI.
    pub fn raw_code(&self) -> i32 {
        match self {
            StreamError::Engine(code) => code.as_raw(),
            StreamError::Misuse(_) => MISUSE_CODE,
            StreamError::Resource(_) => RESOURCE_CODE,
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Engine(code) => write!(f, "engine error: {}", code),
            StreamError::Misuse(m) => write!(f, "misuse: {}", m),
            StreamError::Resource(e) => write!(f, "allocation failed: {}", e),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Engine(code) => Some(code),
            StreamError::Misuse(m) => Some(m),
            StreamError::Resource(e) => Some(e),
        }
    }
}

impl From<EngineCode> for StreamError {
    fn from(code: EngineCode) -> Self {
        StreamError::Engine(code)
    }
}

impl From<Misuse> for StreamError {
    fn from(m: Misuse) -> Self {
        StreamError::Misuse(m)
    }
}

impl From<TryReserveError> for StreamError {
    fn from(e: TryReserveError) -> Self {
        StreamError::Resource(e)
    }
}

/// Split an engine status into `Ok(informational)` or `Err(failure)`.
#[inline]
pub(crate) fn check(code: EngineCode) -> Result<EngineCode, StreamError> {
    if code.is_error() {
        Err(StreamError::Engine(code))
    } else {
        Ok(code)
    }
}
