// Integration tests for src/gzip: header encode / incremental parse.
//
// Headers written by GzipHeader::encode must come back unchanged through
// HeaderParser no matter how the bytes are split, and must be the bytes other
// GZIP implementations expect.

use gzchunk::engine::EngineCode;
use gzchunk::gzip::{GzipHeader, HeaderParser, ParseStatus, HEADER_FIXED_SIZE, OS_UNKNOWN};

fn parse_in_pieces(bytes: &[u8], piece: usize) -> (GzipHeader, usize) {
    let mut p = HeaderParser::new();
    let mut offset = 0;
    for chunk in bytes.chunks(piece) {
        match p.feed(chunk).unwrap() {
            ParseStatus::Complete { header, used } => return (header, offset + used),
            ParseStatus::Incomplete => offset += chunk.len(),
        }
    }
    panic!("header incomplete after {} bytes", bytes.len());
}

fn rich_header() -> GzipHeader {
    let mut h = GzipHeader::new();
    h.text = true;
    h.mtime = 0x5f5e_1000;
    h.xflags = 2;
    h.os = OS_UNKNOWN;
    h.extra = Some(b"XY\x04\x00data".to_vec());
    h.name = Some(b"archive.tar".to_vec());
    h.comment = Some(b"built by the nightly job".to_vec());
    h.hcrc = true;
    h
}

#[test]
fn every_split_point_parses_the_same_header() {
    let h = rich_header();
    let mut bytes = h.encode();
    let header_len = bytes.len();
    bytes.extend_from_slice(b"\x03\x00");
    for piece in 1..=bytes.len() {
        let (parsed, used) = parse_in_pieces(&bytes, piece);
        assert_eq!(parsed, h, "piece size {}", piece);
        assert_eq!(used, header_len, "piece size {}", piece);
    }
}

#[test]
fn fixed_header_matches_flate2_layout() {
    // flate2's GzBuilder writes the same fixed fields in the same order.
    let mut h = GzipHeader::new();
    h.mtime = 42;
    let ours = h.encode();
    assert_eq!(ours.len(), HEADER_FIXED_SIZE);
    assert_eq!(&ours[..4], &[0x1f, 0x8b, 0x08, 0x00]);
    assert_eq!(&ours[4..8], &42u32.to_le_bytes());
}

#[test]
fn parser_accepts_flate2_header_with_name() {
    use std::io::Write;
    let mut enc = flate2::GzBuilder::new()
        .filename("from-flate2.txt")
        .comment("hello")
        .mtime(7)
        .write(Vec::new(), flate2::Compression::fast());
    enc.write_all(b"body").unwrap();
    let gz = enc.finish().unwrap();

    let mut p = HeaderParser::new();
    match p.feed(&gz).unwrap() {
        ParseStatus::Complete { header, .. } => {
            assert_eq!(header.name.as_deref(), Some(&b"from-flate2.txt"[..]));
            assert_eq!(header.comment.as_deref(), Some(&b"hello"[..]));
            assert_eq!(header.mtime, 7);
        }
        ParseStatus::Incomplete => panic!("flate2 header should parse in one piece"),
    }
}

#[test]
fn oversized_comment_is_rejected() {
    let mut h = GzipHeader::new();
    h.comment = Some(vec![b'c'; 64 * 1024 + 1]);
    let bytes = h.encode();
    assert_eq!(HeaderParser::new().feed(&bytes), Err(EngineCode::CommentOverflow));
}

#[test]
fn extra_field_is_capped_at_u16() {
    let mut h = GzipHeader::new();
    h.extra = Some(vec![0xAB; 70_000]);
    let bytes = h.encode();
    assert_eq!(bytes.len(), HEADER_FIXED_SIZE + 2 + u16::MAX as usize);
    let (parsed, _) = parse_in_pieces(&bytes, 4096);
    assert_eq!(parsed.extra.map(|e| e.len()), Some(u16::MAX as usize));
}
