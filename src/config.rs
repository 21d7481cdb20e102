//! Compile-time defaults and environment overrides.
//!
//! Every override follows the same shape: a thin `init_*` function reads the
//! process environment and hands the raw value to a testable `init_*_from`
//! core, which falls back to the compiled default (with a level-2 warning)
//! when the value is unusable.

use crate::displaylevel;

/// Default compression level used by the adapters when none is given.
/// Can be overridden by the `GZCHUNK_CLEVEL` environment variable.
pub const CLEVEL_DEFAULT: u32 = 1;

/// Highest compression level with a working-memory tier.
pub const CLEVEL_MAX: u32 = 3;

/// Output staging size for streaming compression (bytes per engine call).
pub const C_BUF_SIZE: usize = 128 * 1024;

/// Compressed-input read size for streaming decompression.
pub const D_BUF_SIZE: usize = 640 * 1024;

/// Engine resolved by the loader when `GZCHUNK_ENGINE` is unset.
pub const ENGINE_DEFAULT: &str = "flate2";

/// Environment variable naming the codec engine to bind at startup.
pub const ENV_ENGINE: &str = "GZCHUNK_ENGINE";

/// Environment variable overriding [`CLEVEL_DEFAULT`].
pub const ENV_CLEVEL: &str = "GZCHUNK_CLEVEL";

/// Environment variable overriding the initial display level.
pub const ENV_DISPLAY_LEVEL: &str = "GZCHUNK_DISPLAY_LEVEL";

/// Parse a leading run of ASCII digits. Returns `None` when `s` does not start
/// with a digit or the value overflows `u32`.
fn read_u32_prefix(s: &str) -> Option<u32> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[..digits].parse().ok()
}

/// Read the default compression level from `GZCHUNK_CLEVEL`.
pub fn init_c_level() -> u32 {
    init_c_level_from(std::env::var(ENV_CLEVEL).ok().as_deref())
}

/// Testable core of [`init_c_level`].
///
/// Values outside `0..=CLEVEL_MAX` are rejected the same way as non-numeric
/// ones: a warning at display level 2 and the compiled default.
pub fn init_c_level_from(env_val: Option<&str>) -> u32 {
    if let Some(env) = env_val {
        match read_u32_prefix(env) {
            Some(level) if level <= CLEVEL_MAX => return level,
            _ => displaylevel!(
                2,
                "Ignore environment variable setting {}={}: not a valid level (0-{})\n",
                ENV_CLEVEL,
                env,
                CLEVEL_MAX
            ),
        }
    }
    CLEVEL_DEFAULT
}

/// Read the engine name from `GZCHUNK_ENGINE`, falling back to [`ENGINE_DEFAULT`].
pub fn init_engine_name() -> String {
    init_engine_name_from(std::env::var(ENV_ENGINE).ok().as_deref())
}

/// Testable core of [`init_engine_name`]. Blank values count as unset.
pub fn init_engine_name_from(env_val: Option<&str>) -> String {
    match env_val.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => ENGINE_DEFAULT.to_owned(),
    }
}

/// Testable core for `GZCHUNK_DISPLAY_LEVEL`; `None` means "keep current".
pub fn display_level_from(env_val: Option<&str>) -> Option<u32> {
    env_val.and_then(read_u32_prefix)
}
