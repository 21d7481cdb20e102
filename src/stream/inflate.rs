//! Decompression side of the buffer protocol.
//!
//! Two streaming variants share one state machine
//! (`Idle → AwaitingHeader? → Streaming → Finished`) and differ only in how
//! the output buffer is armed:
//!
//! * [`InflateStream::decompress`] keeps the armed window across calls until
//!   the engine has filled it, so a caller may hand the same buffer back and
//!   read each call's bytes at [`Progress::out_offset`].
//! * [`InflateStream::decompress_buffered`] re-arms from the caller's buffer
//!   on every call and lets the caller start a new output segment counter.

use crate::displaylevel;
use crate::engine::{Cursors, EngineCode, Inflater, Runtime, Wrapper};
use crate::gzip::GzipHeader;
use crate::stream::types::{check, Misuse, OutputWindow, Progress, StreamError, StreamPhase};

/// State for one logical decompression stream.
pub struct InflateStream {
    inflater: Box<dyn Inflater>,
    phase: StreamPhase,
    /// Plain variant only: the part of the caller's buffer still being filled.
    window: Option<OutputWindow>,
    /// `total_out` at the start of the current output segment.
    segment_base: u64,
    header: Option<GzipHeader>,
    /// Engine error that ended the current stream; repeated until `reset`.
    failed: Option<EngineCode>,
}

impl std::fmt::Debug for InflateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InflateStream")
            .field("phase", &self.phase)
            .field("failed", &self.failed)
            .field("window", &self.window)
            .field("total_in", &self.inflater.total_in())
            .field("total_out", &self.inflater.total_out())
            .finish()
    }
}

impl InflateStream {
    pub fn init(runtime: &Runtime) -> Self {
        displaylevel!(4, "gzchunk: inflate init\n");
        InflateStream {
            inflater: runtime.engine().inflater(),
            phase: StreamPhase::Idle,
            window: None,
            segment_base: 0,
            header: None,
            failed: None,
        }
    }

    /// Discard all stream progress, including any armed output window.
    pub fn reset(&mut self) {
        self.inflater.reset();
        self.phase = StreamPhase::Idle;
        self.window = None;
        self.segment_base = 0;
        self.header = None;
        self.failed = None;
        displaylevel!(4, "gzchunk: inflate reset\n");
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == StreamPhase::Finished
    }

    pub fn total_in(&self) -> u64 {
        self.inflater.total_in()
    }

    pub fn total_out(&self) -> u64 {
        self.inflater.total_out()
    }

    /// The engine error that stopped this stream, if any. Streaming calls
    /// keep returning it without touching input or output until `reset`.
    pub fn failed(&self) -> Option<EngineCode> {
        self.failed
    }

    /// The header parsed for this stream, once it has been read.
    pub fn gzip_header(&self) -> Option<&GzipHeader> {
        self.header.as_ref()
    }

    /// Decompress one complete unit from `input` into `output`.
    ///
    /// With `header` the input must be a GZIP member whose header is parsed
    /// into it; without, the input is bare deflate. An incomplete unit is
    /// reported through the status (`EndInput` / `OutOverflow`), not as an
    /// error. The stream stays `Idle`.
    pub fn decompress_stateless(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        header: Option<&mut GzipHeader>,
    ) -> Result<Progress, StreamError> {
        match self.phase {
            StreamPhase::Idle => {}
            StreamPhase::Finished => return Err(Misuse::AfterFinish.into()),
            _ => return Err(Misuse::StreamInProgress.into()),
        }
        let mut cursors = Cursors::new(input, output);
        let status = match header {
            Some(h) => {
                self.inflater.begin(Wrapper::Gzip);
                match check(self.inflater.read_header(&mut cursors, h))? {
                    EngineCode::Ok => {
                        self.header = Some(h.clone());
                        check(self.inflater.inflate_stateless(&mut cursors))?
                    }
                    pending => pending,
                }
            }
            None => {
                self.inflater.begin(Wrapper::Raw);
                check(self.inflater.inflate_stateless(&mut cursors))?
            }
        };
        displaylevel!(
            5,
            "gzchunk: inflate stateless {} -> {} bytes ({})\n",
            cursors.consumed(),
            cursors.produced(),
            status.error_name()
        );
        Ok(self.progress(&cursors, status))
    }

    /// Plain streaming decompression.
    ///
    /// The output window is armed from `output` only when none is pending;
    /// otherwise the call continues filling the window armed earlier, which
    /// requires `output` to be at least as long as it was then. The first
    /// call after `init`/`reset` decides whether a GZIP header is expected.
    pub fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        header: Option<&mut GzipHeader>,
    ) -> Result<Progress, StreamError> {
        self.require_live()?;
        let window = match self.window {
            Some(w) if output.len() < w.cap => {
                return Err(Misuse::OutputWindowShrunk { window: w.cap, supplied: output.len() }.into());
            }
            Some(w) => w,
            None => OutputWindow::new(output.len()),
        };
        self.start(header.is_some());

        let mut cursors = Cursors::new(input, &mut output[window.pos..window.cap]);
        let status = self.step(&mut cursors, header)?;

        let mut window = window;
        window.pos += cursors.produced();
        self.window = if window.is_drained() || self.is_finished() {
            None
        } else {
            Some(window)
        };

        let mut p = self.progress(&cursors, status);
        p.out_offset = window.pos - cursors.produced();
        p.segment_out = self.inflater.total_out() - self.segment_base;
        Ok(p)
    }

    /// Buffered streaming decompression.
    ///
    /// `output` is armed afresh on every call. Passing `total_so_far == 0`
    /// starts a new output segment: the reported `segment_out` restarts from
    /// this call's output. Callers normally pass back the previous
    /// `segment_out`.
    pub fn decompress_buffered(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        header: Option<&mut GzipHeader>,
        total_so_far: u64,
    ) -> Result<Progress, StreamError> {
        self.require_live()?;
        if total_so_far == 0 {
            self.segment_base = self.inflater.total_out();
        }
        self.window = None;
        self.start(header.is_some());

        let mut cursors = Cursors::new(input, output);
        let status = self.step(&mut cursors, header)?;

        let mut p = self.progress(&cursors, status);
        p.segment_out = self.inflater.total_out() - self.segment_base;
        Ok(p)
    }

    fn require_live(&self) -> Result<(), StreamError> {
        if let Some(code) = self.failed {
            return Err(code.into());
        }
        if self.phase == StreamPhase::Finished {
            return Err(Misuse::AfterFinish.into());
        }
        Ok(())
    }

    /// Leave `Idle` on the first streaming call, fixing the framing.
    fn start(&mut self, with_header: bool) {
        if self.phase != StreamPhase::Idle {
            return;
        }
        if with_header {
            self.inflater.begin(Wrapper::Gzip);
            self.phase = StreamPhase::AwaitingHeader;
        } else {
            self.inflater.begin(Wrapper::GzipNoHeader);
            self.phase = StreamPhase::Streaming;
        }
        displaylevel!(4, "gzchunk: inflate start ({:?})\n", self.phase);
    }

    /// Finish any pending header, then run the engine once. An engine error
    /// is recorded and ends the stream.
    fn step(
        &mut self,
        cursors: &mut Cursors<'_>,
        header: Option<&mut GzipHeader>,
    ) -> Result<EngineCode, StreamError> {
        let result = self.run_engine(cursors, header);
        if let Err(StreamError::Engine(code)) = result {
            displaylevel!(3, "gzchunk: inflate failed ({})\n", code.error_name());
            self.failed = Some(code);
            self.window = None;
        }
        result
    }

    fn run_engine(
        &mut self,
        cursors: &mut Cursors<'_>,
        header: Option<&mut GzipHeader>,
    ) -> Result<EngineCode, StreamError> {
        if self.phase == StreamPhase::AwaitingHeader {
            let mut parsed = GzipHeader::new();
            match check(self.inflater.read_header(cursors, &mut parsed))? {
                EngineCode::Ok => {
                    displaylevel!(4, "gzchunk: inflate header parsed\n");
                    if let Some(h) = header {
                        h.clone_from(&parsed);
                    }
                    self.header = Some(parsed);
                    self.phase = StreamPhase::Streaming;
                }
                pending => return Ok(pending),
            }
        }
        let status = check(self.inflater.inflate(cursors))?;
        if self.inflater.is_finished() {
            self.phase = StreamPhase::Finished;
            displaylevel!(4, "gzchunk: inflate finished, {} bytes out\n", self.inflater.total_out());
        }
        displaylevel!(
            5,
            "gzchunk: inflate step {} -> {} bytes ({})\n",
            cursors.consumed(),
            cursors.produced(),
            status.error_name()
        );
        Ok(status)
    }

    fn progress(&self, cursors: &Cursors<'_>, status: EngineCode) -> Progress {
        let mut p = Progress::of(cursors, status)
            .with_totals(self.inflater.total_in(), self.inflater.total_out());
        p.finished = self.inflater.is_finished();
        p
    }
}
