//! Codec engines: the contract, the built-in `flate2` engine and the loader.

pub mod flate;
pub mod loader;
pub mod types;

pub use flate::{FlateDeflater, FlateEngine, FlateInflater};
pub use loader::{LoadError, Runtime};
pub use types::{
    working_memory_size, CodecEngine, Cursors, Deflater, EngineCode, Inflater, Wrapper,
    LEVEL_BUF_SIZES,
};
