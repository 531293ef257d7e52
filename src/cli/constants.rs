//! Program identity strings and the crate-wide verbosity level (spec §6
//! `-v`), mirroring the donor's `cli/constants.rs` display-level
//! infrastructure (`DISPLAY_LEVEL` atomic + `displaylevel!` macro) rather
//! than pulling in a `log`/`tracing` dependency the donor never used.

use std::sync::atomic::{AtomicU32, Ordering};

pub const PROGRAM_NAME: &str = "pcompress";
pub const AUTHOR: &str = "pcompress contributors";

/// 0 = silent, 1 = errors, 2 = normal, 3 = progress, 4 = verbose (spec §6 `-v`).
pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Prints to stderr at or above `level` — equivalent to the donor's
/// `DISPLAYLEVEL` macro.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprintln!($($arg)*);
        }
    };
}

/// `PCOMPRESS_INDEX_MEM` (spec §6 env vars): caps dedup index RAM, in MB.
pub const ENV_INDEX_MEM: &str = "PCOMPRESS_INDEX_MEM";
/// `PCOMPRESS_CACHE_DIR`: scratch directory for the segment cache.
pub const ENV_CACHE_DIR: &str = "PCOMPRESS_CACHE_DIR";
/// `ALLOCATOR_BYPASS`: disables the slab allocator (behavioural equivalent
/// only — this port has no custom allocator to bypass; see DESIGN.md).
pub const ENV_ALLOCATOR_BYPASS: &str = "ALLOCATOR_BYPASS";
