// display.rs: process-wide notification level and the logging macros.
//
// 0 = silent; 1 = errors only; 2 = normal (warnings); 3 = informational;
// 4 = verbose (stream transitions, engine binding); 5 = per-call tracing.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::{display_level_from, ENV_DISPLAY_LEVEL};

pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level.
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Apply `GZCHUNK_DISPLAY_LEVEL` if it is set to a number. Returns the level in
/// effect afterwards.
pub fn init_display_level() -> u32 {
    if let Some(level) = display_level_from(std::env::var(ENV_DISPLAY_LEVEL).ok().as_deref()) {
        set_display_level(level);
    }
    display_level()
}

/// Print to stderr when the display level is at or above `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::display::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}
