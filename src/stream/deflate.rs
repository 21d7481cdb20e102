//! Compression side of the buffer protocol.

use crate::displaylevel;
use crate::engine::{working_memory_size, Cursors, Deflater, EngineCode, Runtime, Wrapper};
use crate::gzip::GzipHeader;
use crate::stream::types::{check, Misuse, Progress, StreamError, StreamPhase};

/// State for one logical compression stream.
///
/// Owns its engine context and the level's working memory. The memory is
/// allocated by [`init`](Self::init), survives [`reset`](Self::reset) and is
/// released by [`teardown`](Self::teardown) (or drop).
pub struct DeflateStream {
    deflater: Box<dyn Deflater>,
    level: u32,
    level_buf: Option<Vec<u8>>,
    torn_down: bool,
    phase: StreamPhase,
}

impl std::fmt::Debug for DeflateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeflateStream")
            .field("level", &self.level)
            .field("level_buf", &self.level_buf.as_ref().map(Vec::len))
            .field("phase", &self.phase)
            .field("total_in", &self.deflater.total_in())
            .field("total_out", &self.deflater.total_out())
            .finish()
    }
}

/// Zero-filled working memory for `level`, or `None` for levels without a
/// tier. Allocation failure is reported, not aborted on. Happens once per
/// `init`; `reset` keeps the block.
fn alloc_level_buf(level: u32) -> Result<Option<Vec<u8>>, StreamError> {
    let Some(size) = working_memory_size(level) else {
        return Ok(None);
    };
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)?;
    buf.resize(size, 0);
    Ok(Some(buf))
}

impl DeflateStream {
    /// Set up a compression stream at `level` on the runtime's engine.
    ///
    /// Levels outside `0..=3` are accepted here; the engine rejects them with
    /// `InvalidLevel` on the first call.
    pub fn init(runtime: &Runtime, level: u32) -> Result<Self, StreamError> {
        let level_buf = alloc_level_buf(level)?;
        displaylevel!(
            4,
            "gzchunk: deflate init level {} ({} bytes working memory)\n",
            level,
            level_buf.as_ref().map_or(0, Vec::len)
        );
        Ok(DeflateStream {
            deflater: runtime.engine().deflater(level),
            level,
            level_buf,
            torn_down: false,
            phase: StreamPhase::Idle,
        })
    }

    /// Discard all stream progress. Working memory is kept.
    pub fn reset(&mut self) {
        self.deflater.reset();
        self.phase = StreamPhase::Idle;
        displaylevel!(4, "gzchunk: deflate reset\n");
    }

    /// Release the working memory. Later compression calls fail with
    /// `InvalidLevelBuf`; a second teardown is a misuse.
    pub fn teardown(&mut self) -> Result<(), StreamError> {
        if self.torn_down {
            return Err(Misuse::DoubleTeardown.into());
        }
        self.level_buf = None;
        self.torn_down = true;
        displaylevel!(4, "gzchunk: deflate teardown\n");
        Ok(())
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == StreamPhase::Finished
    }

    pub fn total_in(&self) -> u64 {
        self.deflater.total_in()
    }

    pub fn total_out(&self) -> u64 {
        self.deflater.total_out()
    }

    fn require_idle(&self) -> Result<(), StreamError> {
        match self.phase {
            StreamPhase::Idle => Ok(()),
            StreamPhase::Finished => Err(Misuse::AfterFinish.into()),
            StreamPhase::AwaitingHeader | StreamPhase::Streaming => {
                Err(Misuse::StreamInProgress.into())
            }
        }
    }

    fn progress(&self, cursors: &Cursors<'_>, status: EngineCode) -> Progress {
        let mut p = Progress::of(cursors, status)
            .with_totals(self.deflater.total_in(), self.deflater.total_out());
        p.finished = self.deflater.is_finished();
        p
    }

    /// Compress all of `input` into `output` in one call.
    ///
    /// With `header` a complete GZIP member is produced, otherwise bare
    /// deflate. All input must be consumed: leftover input is
    /// [`Misuse::InputNotConsumed`], since this mode has no continuation.
    /// The stream stays `Idle` afterwards.
    pub fn compress_stateless(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        header: Option<&GzipHeader>,
    ) -> Result<Progress, StreamError> {
        self.require_idle()?;
        check(self.deflater.check_memory(self.level_buf.as_deref()))?;
        self.deflater
            .begin(if header.is_some() { Wrapper::Gzip } else { Wrapper::Raw });
        let mut cursors = Cursors::new(input, output);
        if let Some(h) = header {
            check(self.deflater.write_header(&mut cursors, h))?;
        }
        let code = self
            .deflater
            .deflate_stateless(&mut cursors, self.level_buf.as_deref_mut());
        if code.is_error() && code != EngineCode::StatelessOverflow {
            return Err(code.into());
        }
        if cursors.avail_in() != 0 {
            return Err(Misuse::InputNotConsumed { remaining: cursors.avail_in() }.into());
        }
        let status = check(code)?;
        displaylevel!(
            5,
            "gzchunk: deflate stateless {} -> {} bytes\n",
            cursors.consumed(),
            cursors.produced()
        );
        Ok(self.progress(&cursors, status))
    }

    /// One streaming step.
    ///
    /// The first call after `init`/`reset` fixes the framing: with `header`
    /// the header is written ahead of the body and a full GZIP member
    /// results, without it only the trailer is written. `header` is ignored
    /// on every later call. `end_of_stream` marks the call carrying the last
    /// input; once the engine has flushed everything the stream is finished.
    ///
    /// A first call that fails leaves the stream `Idle` with no header
    /// counted as written, so the framing can be chosen again.
    pub fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        end_of_stream: bool,
        header: Option<&GzipHeader>,
    ) -> Result<Progress, StreamError> {
        if self.phase == StreamPhase::Finished {
            return Err(Misuse::AfterFinish.into());
        }
        let first = self.phase == StreamPhase::Idle;
        let mut cursors = Cursors::new(input, output);
        if first {
            check(self.deflater.check_memory(self.level_buf.as_deref()))?;
            match header {
                Some(h) => {
                    self.deflater.begin(Wrapper::Gzip);
                    if let Err(e) = check(self.deflater.write_header(&mut cursors, h)) {
                        self.deflater.reset();
                        return Err(e);
                    }
                    displaylevel!(4, "gzchunk: deflate header written\n");
                }
                None => self.deflater.begin(Wrapper::GzipNoHeader),
            }
        }
        let code = self
            .deflater
            .deflate(&mut cursors, end_of_stream, self.level_buf.as_deref_mut());
        let status = match check(code) {
            Ok(status) => status,
            Err(e) => {
                if first {
                    self.deflater.reset();
                }
                return Err(e);
            }
        };
        if first {
            self.phase = StreamPhase::Streaming;
        }
        if self.deflater.is_finished() {
            self.phase = StreamPhase::Finished;
            displaylevel!(4, "gzchunk: deflate finished, {} bytes out\n", self.deflater.total_out());
        }
        displaylevel!(
            5,
            "gzchunk: deflate step {} -> {} bytes\n",
            cursors.consumed(),
            cursors.produced()
        );
        Ok(self.progress(&cursors, status))
    }
}
