// config.rs — Compile-time configuration constants.
// Generalized from the donor crate's lz4conf.h port; sizing constants below
// come from pcompress.c's argument defaults (examples/original_source/pcompress.c).

/// Default chunk size: 8 MiB (spec §3 "Chunk").
pub const CHUNKSIZE_DEFAULT: u64 = 8 * (1 << 20);

/// Minimum chunk size: 1 MiB.
pub const CHUNKSIZE_MIN: u64 = 1 << 20;

/// A chunk size may not exceed this fraction of total system RAM.
pub const CHUNKSIZE_MAX_RAM_FRACTION: f64 = 0.80;

/// Threshold below which an entire input is treated as a single chunk
/// (`FLAG_SINGLE_CHUNK`, spec §3/§8 "Boundary behaviours").
pub const MIN_CHUNK_FOR_SPLIT: u64 = CHUNKSIZE_MIN;

/// Whether the multi-threaded chunk pipeline is compiled in.
/// Corresponds to `LZ4IO_MULTITHREAD` in the donor's lz4conf.h; generalized to
/// gate `pipeline::scheduler`'s worker pool instead of a single IO path.
pub const MULTITHREAD: bool = true;

/// Default number of worker threads when `-t` is not given (spec §4.1:
/// `min(logical_cores, ceil(input_size/chunksize))`, computed at runtime in
/// `pipeline::scheduler::auto_worker_count`). This constant is only the floor.
pub const NB_WORKERS_DEFAULT: usize = 0; // 0 == auto-select

/// Maximum number of worker threads selectable at runtime (`-t`).
pub const NB_WORKERS_MAX: usize = 200;

/// Default compression level (spec §6 `-l level`, range 0-14).
pub const LEVEL_DEFAULT: u32 = 6;
pub const LEVEL_MIN: u32 = 0;
pub const LEVEL_MAX: u32 = 14;

/// Rabin dedup defaults (spec §4.4).
pub const RAB_POLYNOMIAL_CONST: u64 = 2;
pub const RAB_POLYNOMIAL_P: u32 = 60;
pub const RAB_WINDOW_LEN: usize = 16;
pub const RAB_BLOCK_MIN_BITS: u32 = 1; // rab_blk_sz default: min_block = 2 KiB << 1
pub const RAB_BLOCK_MAX: usize = 128 * 1024;

/// bsdiff is only attempted when two candidate blocks are at least this far
/// apart in the chunk (spec §4.4 `deltac_min_distance`).
pub const DELTAC_MIN_DISTANCE_DEFAULT: usize = 4096;

/// `METADATA_INDICATOR` sentinel compressed-length value (spec §6, §9 Open
/// Questions: "must be preserved exactly"). Chosen as the all-ones 64-bit
/// value, matching the donor C source's convention for an impossible length.
pub const METADATA_INDICATOR: u64 = u64::MAX;

/// Default PBKDF2 iteration count for password-derived keys (spec §4.7).
pub const PBKDF2_ITERATIONS: u32 = 200_000;

/// Key length choices accepted by `-k` (spec §6).
pub const KEY_LEN_128: usize = 16;
pub const KEY_LEN_256: usize = 32;

/// Retry policy for `/dev/urandom` open failures (spec §7 "Local, retried").
pub const URANDOM_RETRY_COUNT: u32 = 10;
pub const URANDOM_RETRY_DELAY_SECS: u64 = 1;
