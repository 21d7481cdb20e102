//! Incremental GZIP header parser.
//!
//! Compressed input arrives in caller-sized pieces, so a header may be split
//! anywhere, even inside the magic bytes. [`HeaderParser`] consumes one byte at
//! a time through a small stage machine and reports exactly how many bytes of
//! the current piece belonged to the header, leaving the rest for the body.

use crate::engine::EngineCode;
use crate::gzip::types::{
    GzipHeader, CM_DEFLATE, FCOMMENT, FEXTRA, FHCRC, FNAME, FRESERVED, FTEXT, GZIP_ID1,
    GZIP_ID2, HEADER_FIXED_SIZE, MAX_COMMENT_LEN, MAX_NAME_LEN,
};

/// Where the parser is inside the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Fixed,
    ExtraLen,
    Extra,
    Name,
    Comment,
    Crc16,
    Done,
}

/// Outcome of one [`HeaderParser::feed`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    /// The header ended inside this piece after `used` bytes.
    Complete { header: GzipHeader, used: usize },
    /// Every byte of the piece was header; more input is needed.
    Incomplete,
}

/// Stateful parser for one GZIP header.
#[derive(Debug, Clone)]
pub struct HeaderParser {
    stage: Stage,
    flags: u8,
    /// Every header byte seen so far, kept for the optional CRC-16.
    raw: Vec<u8>,
    /// Offset in `raw` where the current variable-length stage began.
    stage_start: usize,
    xlen: usize,
    header: GzipHeader,
    /// First error raised; every later feed repeats it.
    failed: Option<EngineCode>,
}

impl Default for HeaderParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderParser {
    pub fn new() -> Self {
        HeaderParser {
            stage: Stage::Fixed,
            flags: 0,
            raw: Vec::with_capacity(HEADER_FIXED_SIZE),
            stage_start: 0,
            xlen: 0,
            header: GzipHeader::new(),
            failed: None,
        }
    }

    /// Bytes consumed by this parser since construction.
    pub fn bytes_seen(&self) -> usize {
        self.raw.len()
    }

    /// `true` once a full header has been returned.
    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Feed the next piece of input.
    ///
    /// Errors are the engine codes a header can raise: `InvalidWrapper` for bad
    /// magic or reserved flags, `UnsupportedMethod`, `NameOverflow`,
    /// `CommentOverflow`, and `IncorrectChecksum` for a CRC-16 mismatch.
    /// Feeding a finished parser is `InvalidState`. Once an error has been
    /// returned the parser consumes nothing more and returns it again.
    pub fn feed(&mut self, input: &[u8]) -> Result<ParseStatus, EngineCode> {
        if let Some(code) = self.failed {
            return Err(code);
        }
        if self.stage == Stage::Done {
            return Err(EngineCode::InvalidState);
        }
        let result = self.feed_bytes(input);
        if let Err(code) = result {
            self.failed = Some(code);
        }
        result
    }

    fn feed_bytes(&mut self, input: &[u8]) -> Result<ParseStatus, EngineCode> {
        let mut used = 0;
        while used < input.len() {
            let b = input[used];
            used += 1;
            self.raw.push(b);
            match self.stage {
                Stage::Fixed => {
                    if self.raw.len() == HEADER_FIXED_SIZE {
                        self.parse_fixed()?;
                        self.stage = self.next_stage(Stage::Fixed);
                    }
                }
                Stage::ExtraLen => {
                    if self.raw.len() - self.stage_start == 2 {
                        let n = self.raw.len();
                        self.xlen = u16::from_le_bytes([self.raw[n - 2], self.raw[n - 1]]) as usize;
                        self.header.extra = Some(Vec::with_capacity(self.xlen));
                        self.stage = if self.xlen == 0 {
                            self.next_stage(Stage::Extra)
                        } else {
                            Stage::Extra
                        };
                    }
                }
                Stage::Extra => {
                    let extra = self.header.extra.get_or_insert_with(Vec::new);
                    extra.push(b);
                    if extra.len() == self.xlen {
                        self.stage = self.next_stage(Stage::Extra);
                    }
                }
                Stage::Name => {
                    if b == 0 {
                        self.stage = self.next_stage(Stage::Name);
                    } else {
                        let name = self.header.name.get_or_insert_with(Vec::new);
                        if name.len() == MAX_NAME_LEN {
                            return Err(EngineCode::NameOverflow);
                        }
                        name.push(b);
                    }
                }
                Stage::Comment => {
                    if b == 0 {
                        self.stage = self.next_stage(Stage::Comment);
                    } else {
                        let comment = self.header.comment.get_or_insert_with(Vec::new);
                        if comment.len() == MAX_COMMENT_LEN {
                            return Err(EngineCode::CommentOverflow);
                        }
                        comment.push(b);
                    }
                }
                Stage::Crc16 => {
                    if self.raw.len() - self.stage_start == 2 {
                        let n = self.raw.len();
                        let stored = u16::from_le_bytes([self.raw[n - 2], self.raw[n - 1]]);
                        let computed = (crc32fast::hash(&self.raw[..n - 2]) & 0xffff) as u16;
                        if stored != computed {
                            return Err(EngineCode::IncorrectChecksum);
                        }
                        self.stage = Stage::Done;
                    }
                }
                Stage::Done => unreachable!("loop exits as soon as the header is done"),
            }
            if self.stage == Stage::Done {
                return Ok(ParseStatus::Complete {
                    header: self.header.clone(),
                    used,
                });
            }
        }
        Ok(ParseStatus::Incomplete)
    }

    fn parse_fixed(&mut self) -> Result<(), EngineCode> {
        let raw = &self.raw;
        if raw[0] != GZIP_ID1 || raw[1] != GZIP_ID2 {
            return Err(EngineCode::InvalidWrapper);
        }
        if raw[2] != CM_DEFLATE {
            return Err(EngineCode::UnsupportedMethod);
        }
        let flags = raw[3];
        if flags & FRESERVED != 0 {
            return Err(EngineCode::InvalidWrapper);
        }
        self.flags = flags;
        self.header.text = flags & FTEXT != 0;
        self.header.hcrc = flags & FHCRC != 0;
        self.header.mtime = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
        self.header.xflags = raw[8];
        self.header.os = raw[9];
        Ok(())
    }

    /// The stage following `after`, skipping fields whose flag is clear.
    fn next_stage(&mut self, after: Stage) -> Stage {
        self.stage_start = self.raw.len();
        let order = [
            (Stage::ExtraLen, FEXTRA),
            (Stage::Name, FNAME),
            (Stage::Comment, FCOMMENT),
            (Stage::Crc16, FHCRC),
        ];
        let rank = |s: Stage| match s {
            Stage::Fixed => 0,
            Stage::ExtraLen | Stage::Extra => 1,
            Stage::Name => 2,
            Stage::Comment => 3,
            Stage::Crc16 => 4,
            Stage::Done => 5,
        };
        let current = rank(after);
        for (stage, flag) in order {
            if rank(stage) > current && self.flags & flag != 0 {
                if stage == Stage::Name {
                    self.header.name = Some(Vec::new());
                } else if stage == Stage::Comment {
                    self.header.comment = Some(Vec::new());
                }
                return stage;
            }
        }
        Stage::Done
    }
}
