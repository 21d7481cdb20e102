//! Engine binding.
//!
//! The process binds one codec engine at startup, by name. A [`Runtime`] is
//! the handle to that binding: it is cheap to clone and every stream opened
//! through it shares the same engine. Streams cannot be created without one,
//! which replaces the usual "has the library been loaded?" check.

use std::fmt;
use std::sync::Arc;

use crate::config::init_engine_name;
use crate::displaylevel;
use crate::engine::flate::FlateEngine;
use crate::engine::types::CodecEngine;

/// Failure to bind a codec engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// No engine is registered under this name.
    UnknownEngine { name: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::UnknownEngine { name } => {
                write!(f, "unknown codec engine '{}' (available: {})", name, available().join(", "))
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Names the registry resolves.
pub fn available() -> Vec<&'static str> {
    vec![FlateEngine::NAME]
}

fn lookup(name: &str) -> Option<Arc<dyn CodecEngine>> {
    match name {
        FlateEngine::NAME => Some(Arc::new(FlateEngine)),
        _ => None,
    }
}

/// A bound codec engine.
#[derive(Clone)]
pub struct Runtime {
    engine: Arc<dyn CodecEngine>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").field("engine", &self.engine.name()).finish()
    }
}

impl Runtime {
    /// Bind the engine named by `GZCHUNK_ENGINE` (default `flate2`).
    pub fn load() -> Result<Self, LoadError> {
        Self::load_from(&init_engine_name())
    }

    /// Bind the engine registered as `name`.
    pub fn load_from(name: &str) -> Result<Self, LoadError> {
        match lookup(name) {
            Some(engine) => {
                displaylevel!(4, "gzchunk: bound codec engine '{}'\n", name);
                Ok(Runtime { engine })
            }
            None => {
                displaylevel!(1, "gzchunk: cannot bind codec engine '{}'\n", name);
                Err(LoadError::UnknownEngine { name: name.to_owned() })
            }
        }
    }

    /// Wrap an engine supplied by the caller.
    pub fn with_engine(engine: Arc<dyn CodecEngine>) -> Self {
        displaylevel!(4, "gzchunk: using caller-supplied engine '{}'\n", engine.name());
        Runtime { engine }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn engine(&self) -> &Arc<dyn CodecEngine> {
        &self.engine
    }
}
