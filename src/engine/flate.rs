//! Built-in engine backed by `flate2`.
//!
//! `flate2` supplies raw DEFLATE; this module adds the GZIP envelope on top:
//! staged header/trailer bytes on the way out, [`HeaderParser`] and trailer
//! verification on the way in. Progress is measured the usual `flate2` way,
//! as `total_in` / `total_out` deltas around each call.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::engine::types::{
    working_memory_size, CodecEngine, Cursors, Deflater, EngineCode, Inflater, Wrapper,
};
use crate::gzip::{GzipHeader, GzipTrailer, HeaderParser, ParseStatus, TRAILER_SIZE};

/// `flate2` level used for each protocol level.
const FLATE_LEVELS: [u32; 4] = [1, 2, 6, 9];

fn flate_level(level: u32) -> Compression {
    match FLATE_LEVELS.get(level as usize) {
        Some(&n) => Compression::new(n),
        None => Compression::default(),
    }
}

/// Registry entry for the built-in engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlateEngine;

impl FlateEngine {
    pub const NAME: &'static str = "flate2";
}

impl CodecEngine for FlateEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn deflater(&self, level: u32) -> Box<dyn Deflater> {
        Box::new(FlateDeflater::new(level))
    }

    fn inflater(&self) -> Box<dyn Inflater> {
        Box::new(FlateInflater::new())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compression
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeflatePhase {
    Body,
    Trailer,
    End,
}

pub struct FlateDeflater {
    level: u32,
    compress: Compress,
    wrapper: Wrapper,
    phase: DeflatePhase,
    finishing: bool,
    crc: crc32fast::Hasher,
    /// Header or trailer bytes not yet copied to the caller.
    staged: Vec<u8>,
    staged_pos: usize,
    total_in: u64,
    total_out: u64,
}

impl FlateDeflater {
    pub fn new(level: u32) -> Self {
        FlateDeflater {
            level,
            compress: Compress::new(flate_level(level), false),
            wrapper: Wrapper::Raw,
            phase: DeflatePhase::Body,
            finishing: false,
            crc: crc32fast::Hasher::new(),
            staged: Vec::new(),
            staged_pos: 0,
            total_in: 0,
            total_out: 0,
        }
    }

    /// `flate2` keeps its own state, so the level buffer is only a size
    /// token here: its length is checked, its contents are never read.
    fn check_level(&self, level_buf: Option<&[u8]>) -> Result<(), EngineCode> {
        let need = working_memory_size(self.level).ok_or(EngineCode::InvalidLevel)?;
        match level_buf {
            Some(buf) if buf.len() >= need => Ok(()),
            _ => Err(EngineCode::InvalidLevelBuf),
        }
    }

    fn drain_staged(&mut self, cursors: &mut Cursors<'_>) {
        let n = cursors.put(&self.staged[self.staged_pos..]);
        self.staged_pos += n;
        if self.staged_pos == self.staged.len() {
            self.staged.clear();
            self.staged_pos = 0;
        }
    }

    fn stage(&mut self, bytes: &[u8]) {
        self.staged.extend_from_slice(bytes);
    }

    fn has_staged(&self) -> bool {
        !self.staged.is_empty()
    }

    fn run(&mut self, cursors: &mut Cursors<'_>) -> EngineCode {
        self.drain_staged(cursors);
        loop {
            if self.has_staged() {
                break;
            }
            match self.phase {
                DeflatePhase::Body => {
                    if cursors.avail_out() == 0 {
                        break;
                    }
                    let flush = if self.finishing {
                        FlushCompress::Finish
                    } else {
                        FlushCompress::None
                    };
                    let (input, output) = cursors.split();
                    let before_in = self.compress.total_in();
                    let before_out = self.compress.total_out();
                    let status = match self.compress.compress(input, output, flush) {
                        Ok(status) => status,
                        Err(_) => return EngineCode::InvalidState,
                    };
                    let consumed = (self.compress.total_in() - before_in) as usize;
                    let produced = (self.compress.total_out() - before_out) as usize;
                    self.crc.update(&input[..consumed]);
                    cursors.advance_in(consumed);
                    cursors.advance_out(produced);

                    if self.finishing && status == Status::StreamEnd {
                        if self.wrapper.has_trailer() {
                            let trailer = GzipTrailer {
                                crc32: self.crc.clone().finalize(),
                                isize: self.compress.total_in() as u32,
                            };
                            self.stage(&trailer.encode());
                            self.phase = DeflatePhase::Trailer;
                            self.drain_staged(cursors);
                        } else {
                            self.phase = DeflatePhase::End;
                        }
                        continue;
                    }
                    if consumed == 0 && produced == 0 {
                        break;
                    }
                    if !self.finishing && cursors.avail_in() == 0 {
                        break;
                    }
                }
                DeflatePhase::Trailer => self.phase = DeflatePhase::End,
                DeflatePhase::End => break,
            }
        }
        EngineCode::Ok
    }
}

impl Deflater for FlateDeflater {
    fn begin(&mut self, wrapper: Wrapper) {
        self.compress.reset();
        self.wrapper = wrapper;
        self.phase = DeflatePhase::Body;
        self.finishing = false;
        self.crc = crc32fast::Hasher::new();
        self.staged.clear();
        self.staged_pos = 0;
    }

    fn check_memory(&self, level_buf: Option<&[u8]>) -> EngineCode {
        match self.check_level(level_buf) {
            Ok(()) => EngineCode::Ok,
            Err(code) => code,
        }
    }

    fn write_header(&mut self, cursors: &mut Cursors<'_>, header: &GzipHeader) -> EngineCode {
        if self.phase != DeflatePhase::Body || self.compress.total_in() != 0 {
            return EngineCode::InvalidState;
        }
        let out0 = cursors.produced();
        self.stage(&header.encode());
        self.drain_staged(cursors);
        self.total_out += (cursors.produced() - out0) as u64;
        EngineCode::Ok
    }

    fn deflate(
        &mut self,
        cursors: &mut Cursors<'_>,
        end_of_stream: bool,
        level_buf: Option<&mut [u8]>,
    ) -> EngineCode {
        if let Err(code) = self.check_level(level_buf.as_deref()) {
            return code;
        }
        if end_of_stream {
            self.finishing = true;
        }
        let (in0, out0) = (cursors.consumed(), cursors.produced());
        let code = self.run(cursors);
        self.total_in += (cursors.consumed() - in0) as u64;
        self.total_out += (cursors.produced() - out0) as u64;
        code
    }

    fn deflate_stateless(
        &mut self,
        cursors: &mut Cursors<'_>,
        level_buf: Option<&mut [u8]>,
    ) -> EngineCode {
        let code = self.deflate(cursors, true, level_buf);
        if code.is_error() {
            return code;
        }
        if self.is_finished() {
            EngineCode::Ok
        } else {
            EngineCode::StatelessOverflow
        }
    }

    fn is_finished(&self) -> bool {
        self.phase == DeflatePhase::End && !self.has_staged()
    }

    fn total_in(&self) -> u64 {
        self.total_in
    }

    fn total_out(&self) -> u64 {
        self.total_out
    }

    fn reset(&mut self) {
        self.begin(Wrapper::Raw);
        self.total_in = 0;
        self.total_out = 0;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decompression
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InflatePhase {
    Header,
    Body,
    Trailer,
    End,
}

pub struct FlateInflater {
    decompress: Decompress,
    wrapper: Wrapper,
    phase: InflatePhase,
    parser: HeaderParser,
    parsed: Option<GzipHeader>,
    crc: crc32fast::Hasher,
    trailer: Vec<u8>,
    total_in: u64,
    total_out: u64,
}

impl Default for FlateInflater {
    fn default() -> Self {
        Self::new()
    }
}

impl FlateInflater {
    pub fn new() -> Self {
        FlateInflater {
            decompress: Decompress::new(false),
            wrapper: Wrapper::Raw,
            phase: InflatePhase::Body,
            parser: HeaderParser::new(),
            parsed: None,
            crc: crc32fast::Hasher::new(),
            trailer: Vec::with_capacity(TRAILER_SIZE),
            total_in: 0,
            total_out: 0,
        }
    }

    fn advance_header(&mut self, cursors: &mut Cursors<'_>) -> EngineCode {
        let input = cursors.pending_input();
        match self.parser.feed(input) {
            Ok(ParseStatus::Complete { header, used }) => {
                cursors.advance_in(used);
                self.parsed = Some(header);
                self.phase = InflatePhase::Body;
                EngineCode::Ok
            }
            Ok(ParseStatus::Incomplete) => {
                cursors.advance_in(input.len());
                EngineCode::EndInput
            }
            Err(code) => code,
        }
    }

    fn check_trailer(&self) -> EngineCode {
        match GzipTrailer::decode(&self.trailer) {
            Some(t)
                if t.crc32 == self.crc.clone().finalize()
                    && t.isize == self.decompress.total_out() as u32 =>
            {
                EngineCode::Ok
            }
            _ => EngineCode::IncorrectChecksum,
        }
    }

    fn run(&mut self, cursors: &mut Cursors<'_>) -> EngineCode {
        loop {
            match self.phase {
                InflatePhase::Header => {
                    let code = self.advance_header(cursors);
                    if code != EngineCode::Ok {
                        return code;
                    }
                }
                InflatePhase::Body => {
                    let (input, output) = cursors.split();
                    let before_in = self.decompress.total_in();
                    let before_out = self.decompress.total_out();
                    let status = match self.decompress.decompress(input, output, FlushDecompress::None) {
                        Ok(status) => status,
                        Err(_) => return EngineCode::InvalidBlock,
                    };
                    let consumed = (self.decompress.total_in() - before_in) as usize;
                    let produced = (self.decompress.total_out() - before_out) as usize;
                    self.crc.update(&output[..produced]);
                    cursors.advance_in(consumed);
                    cursors.advance_out(produced);

                    if status == Status::StreamEnd {
                        self.phase = if self.wrapper.has_trailer() {
                            InflatePhase::Trailer
                        } else {
                            InflatePhase::End
                        };
                        continue;
                    }
                    if consumed == 0 && produced == 0 {
                        break;
                    }
                }
                InflatePhase::Trailer => {
                    let bytes = cursors.take(TRAILER_SIZE - self.trailer.len());
                    self.trailer.extend_from_slice(bytes);
                    if self.trailer.len() < TRAILER_SIZE {
                        break;
                    }
                    let code = self.check_trailer();
                    if code.is_error() {
                        return code;
                    }
                    self.phase = InflatePhase::End;
                }
                InflatePhase::End => return EngineCode::Ok,
            }
        }
        if cursors.avail_out() == 0 {
            EngineCode::OutOverflow
        } else {
            EngineCode::EndInput
        }
    }

    fn accounted(
        &mut self,
        cursors: &mut Cursors<'_>,
        step: fn(&mut Self, &mut Cursors<'_>) -> EngineCode,
    ) -> EngineCode {
        let (in0, out0) = (cursors.consumed(), cursors.produced());
        let code = step(self, cursors);
        self.total_in += (cursors.consumed() - in0) as u64;
        self.total_out += (cursors.produced() - out0) as u64;
        code
    }
}

impl Inflater for FlateInflater {
    fn begin(&mut self, wrapper: Wrapper) {
        self.decompress.reset(false);
        self.wrapper = wrapper;
        self.phase = if wrapper == Wrapper::Gzip {
            InflatePhase::Header
        } else {
            InflatePhase::Body
        };
        self.parser = HeaderParser::new();
        self.parsed = None;
        self.crc = crc32fast::Hasher::new();
        self.trailer.clear();
    }

    fn read_header(&mut self, cursors: &mut Cursors<'_>, header: &mut GzipHeader) -> EngineCode {
        let code = match self.phase {
            InflatePhase::Header => self.accounted(cursors, Self::advance_header),
            _ if self.parsed.is_some() => EngineCode::Ok,
            _ => EngineCode::InvalidState,
        };
        if code == EngineCode::Ok {
            if let Some(parsed) = &self.parsed {
                header.clone_from(parsed);
            }
        }
        code
    }

    fn inflate(&mut self, cursors: &mut Cursors<'_>) -> EngineCode {
        self.accounted(cursors, Self::run)
    }

    fn inflate_stateless(&mut self, cursors: &mut Cursors<'_>) -> EngineCode {
        self.accounted(cursors, Self::run)
    }

    fn is_finished(&self) -> bool {
        self.phase == InflatePhase::End
    }

    fn total_in(&self) -> u64 {
        self.total_in
    }

    fn total_out(&self) -> u64 {
        self.total_out
    }

    fn reset(&mut self) {
        self.begin(Wrapper::Raw);
        self.total_in = 0;
        self.total_out = 0;
    }
}
