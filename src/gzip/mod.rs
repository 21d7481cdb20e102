//! GZIP container envelope: header/trailer value objects and parsing.
//!
//! Pure data-structure code: nothing here touches stream cursors. The engine
//! stages encoded headers into its output and drives [`HeaderParser`] over its
//! input.

pub mod header;
pub mod types;

pub use header::{HeaderParser, ParseStatus};
pub use types::{GzipHeader, GzipTrailer, HEADER_FIXED_SIZE, OS_UNIX, OS_UNKNOWN, TRAILER_SIZE};
