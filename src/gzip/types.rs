//! GZIP member envelope types and constants (RFC 1952).
//!
//! Covers:
//! - Magic bytes, compression method and `FLG` bit constants
//! - [`GzipHeader`]: the metadata written ahead of a deflate body
//! - [`GzipTrailer`]: the CRC-32 / ISIZE pair written after it

// ─────────────────────────────────────────────────────────────────────────────
// Envelope constants
// ─────────────────────────────────────────────────────────────────────────────

/// First magic byte of every GZIP member.
pub const GZIP_ID1: u8 = 0x1f;
/// Second magic byte of every GZIP member.
pub const GZIP_ID2: u8 = 0x8b;
/// `CM` value for DEFLATE, the only method this crate reads or writes.
pub const CM_DEFLATE: u8 = 8;

/// `FLG` bit: payload is probably ASCII text.
pub const FTEXT: u8 = 0x01;
/// `FLG` bit: a CRC-16 of the header precedes the body.
pub const FHCRC: u8 = 0x02;
/// `FLG` bit: an `XLEN`-prefixed extra field is present.
pub const FEXTRA: u8 = 0x04;
/// `FLG` bit: a zero-terminated original file name is present.
pub const FNAME: u8 = 0x08;
/// `FLG` bit: a zero-terminated comment is present.
pub const FCOMMENT: u8 = 0x10;
/// `FLG` bits that must be zero.
pub const FRESERVED: u8 = 0xe0;

/// `OS` byte for Unix, written by [`GzipHeader::new`].
pub const OS_UNIX: u8 = 3;
/// `OS` byte meaning "unknown".
pub const OS_UNKNOWN: u8 = 255;

/// Size of the fixed part of the header (magic through `OS`).
pub const HEADER_FIXED_SIZE: usize = 10;
/// Size of the trailer (CRC-32 + ISIZE).
pub const TRAILER_SIZE: usize = 8;

/// Longest file name accepted while parsing, terminator excluded.
pub const MAX_NAME_LEN: usize = 4096;
/// Longest comment accepted while parsing, terminator excluded.
pub const MAX_COMMENT_LEN: usize = 64 * 1024;

// ─────────────────────────────────────────────────────────────────────────────
// Header
// ─────────────────────────────────────────────────────────────────────────────

/// Metadata carried by a GZIP member header.
///
/// Initialised once per stream, then either written (compression) or filled in
/// by parsing (decompression). Optional fields are `None` when the
/// corresponding `FLG` bit is clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    /// `FTEXT` hint.
    pub text: bool,
    /// Modification time, seconds since the Unix epoch; 0 = unavailable.
    pub mtime: u32,
    /// Extra flags (`XFL`), e.g. 2 = best compression, 4 = fastest.
    pub xflags: u8,
    /// Operating system byte.
    pub os: u8,
    /// Raw extra field payload (without `XLEN`).
    pub extra: Option<Vec<u8>>,
    /// Original file name, without the terminating zero.
    pub name: Option<Vec<u8>>,
    /// Free-form comment, without the terminating zero.
    pub comment: Option<Vec<u8>>,
    /// Whether a header CRC-16 is written / was present.
    pub hcrc: bool,
}

impl Default for GzipHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl GzipHeader {
    /// A zeroed header: no optional fields, `mtime = 0`, `os = OS_UNIX`.
    pub fn new() -> Self {
        GzipHeader {
            text: false,
            mtime: 0,
            xflags: 0,
            os: OS_UNIX,
            extra: None,
            name: None,
            comment: None,
            hcrc: false,
        }
    }

    /// The `FLG` byte implied by the populated fields.
    pub fn flags(&self) -> u8 {
        let mut flg = 0;
        if self.text {
            flg |= FTEXT;
        }
        if self.hcrc {
            flg |= FHCRC;
        }
        if self.extra.is_some() {
            flg |= FEXTRA;
        }
        if self.name.is_some() {
            flg |= FNAME;
        }
        if self.comment.is_some() {
            flg |= FCOMMENT;
        }
        flg
    }

    /// Number of bytes [`encode`](Self::encode) produces.
    pub fn encoded_len(&self) -> usize {
        let mut len = HEADER_FIXED_SIZE;
        if let Some(extra) = &self.extra {
            len += 2 + extra.len().min(u16::MAX as usize);
        }
        if let Some(name) = &self.name {
            len += field_len(name) + 1;
        }
        if let Some(comment) = &self.comment {
            len += field_len(comment) + 1;
        }
        if self.hcrc {
            len += 2;
        }
        len
    }

    /// Serialize the header.
    ///
    /// The extra field is truncated to 65535 bytes; name and comment are cut
    /// at their first embedded zero byte, since the format cannot carry one.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&[GZIP_ID1, GZIP_ID2, CM_DEFLATE, self.flags()]);
        out.extend_from_slice(&self.mtime.to_le_bytes());
        out.push(self.xflags);
        out.push(self.os);
        if let Some(extra) = &self.extra {
            let xlen = extra.len().min(u16::MAX as usize);
            out.extend_from_slice(&(xlen as u16).to_le_bytes());
            out.extend_from_slice(&extra[..xlen]);
        }
        if let Some(name) = &self.name {
            out.extend_from_slice(&name[..field_len(name)]);
            out.push(0);
        }
        if let Some(comment) = &self.comment {
            out.extend_from_slice(&comment[..field_len(comment)]);
            out.push(0);
        }
        if self.hcrc {
            let crc16 = (crc32fast::hash(&out) & 0xffff) as u16;
            out.extend_from_slice(&crc16.to_le_bytes());
        }
        out
    }
}

/// Length of a zero-terminated field up to (not including) any embedded zero.
fn field_len(field: &[u8]) -> usize {
    field.iter().position(|&b| b == 0).unwrap_or(field.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Trailer
// ─────────────────────────────────────────────────────────────────────────────

/// The 8-byte GZIP member trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GzipTrailer {
    /// CRC-32 of the uncompressed payload.
    pub crc32: u32,
    /// Uncompressed length modulo 2^32.
    pub isize: u32,
}

impl GzipTrailer {
    pub fn encode(&self) -> [u8; TRAILER_SIZE] {
        let mut out = [0u8; TRAILER_SIZE];
        out[..4].copy_from_slice(&self.crc32.to_le_bytes());
        out[4..].copy_from_slice(&self.isize.to_le_bytes());
        out
    }

    /// Decode a trailer; `None` when fewer than 8 bytes are supplied.
    pub fn decode(src: &[u8]) -> Option<Self> {
        if src.len() < TRAILER_SIZE {
            return None;
        }
        Some(GzipTrailer {
            crc32: u32::from_le_bytes([src[0], src[1], src[2], src[3]]),
            isize: u32::from_le_bytes([src[4], src[5], src[6], src[7]]),
        })
    }
}
