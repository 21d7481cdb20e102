// gzchunk: chunked DEFLATE/GZIP buffer protocol over a pluggable codec engine

pub mod config;
pub mod display;
pub mod engine;
pub mod gzip;
pub mod io;
pub mod stream;

#[cfg(feature = "c-abi")]
pub mod abi;

// ── Version constants ────────────────────────────────────────────────────────
pub const GZCHUNK_VERSION_MAJOR: u32 = 0;
pub const GZCHUNK_VERSION_MINOR: u32 = 3;
pub const GZCHUNK_VERSION_RELEASE: u32 = 0;
pub const GZCHUNK_VERSION_NUMBER: u32 =
    GZCHUNK_VERSION_MAJOR * 100 * 100 + GZCHUNK_VERSION_MINOR * 100 + GZCHUNK_VERSION_RELEASE;
pub const GZCHUNK_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

pub fn version_number() -> u32 {
    GZCHUNK_VERSION_NUMBER
}

pub fn version_string() -> &'static str {
    GZCHUNK_VERSION_STRING
}

// ── Top-level re-exports ─────────────────────────────────────────────────────
pub use engine::{CodecEngine, EngineCode, LoadError, Runtime};
pub use gzip::GzipHeader;
pub use io::{compress_bytes, decompress_bytes, GzReader, GzWriter};
pub use stream::{DeflateStream, InflateStream, Misuse, Progress, StreamError, StreamPhase};
