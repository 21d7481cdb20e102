//! Buffer protocol: stream state and the per-call entry points.
//!
//! A stream is created once (`init`), driven by repeated calls that each
//! describe one input slice and one output slice, and either finished,
//! `reset` for reuse, or dropped. Every call returns a [`Progress`] telling
//! the caller how far the cursors moved; all looping is the caller's job.

pub mod deflate;
pub mod inflate;
pub mod types;

pub use deflate::DeflateStream;
pub use inflate::InflateStream;
pub use types::{Misuse, OutputWindow, Progress, StreamError, StreamPhase, MISUSE_CODE, RESOURCE_CODE};
