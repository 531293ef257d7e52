//! Per-worker bump arena — the "systems-language port" of the original slab
//! allocator (spec §9 "Slab allocator with per-size bucket lists").
//!
//! The original C source's slab has per-size free lists so repeated
//! chunk-sized allocations avoid `malloc`/`free` churn. Spec §9 explicitly
//! says this is an optimization, not a correctness requirement, and sanctions
//! "a plain arena (bump allocator per worker, reset per chunk) or omit it
//! entirely". We keep a minimal arena because `pipeline::worker_slot`
//! allocates several same-sized scratch buffers per chunk (dedup index,
//! preprocessor output, compressor output) and resetting one `Vec` is simpler
//! than tracking several.
//!
//! `ALLOCATOR_BYPASS` (read once at start-up, spec §6/§9 Open Questions)
//! disables the bump behavior and falls back to a fresh heap `Vec` per
//! `acquire`, which is the "behavioural equivalent only" escape hatch spec §6
//! describes.

use std::sync::OnceLock;

static BYPASS: OnceLock<bool> = OnceLock::new();

/// Reads `ALLOCATOR_BYPASS` once; subsequent calls return the cached value
/// (spec §9 Open Questions: "Implementation may treat it as read-once").
pub fn allocator_bypassed() -> bool {
    *BYPASS.get_or_init(|| std::env::var_os("ALLOCATOR_BYPASS").is_some())
}

/// A single reusable byte buffer, released back to its starting length on
/// [`Arena::release`]. Acquire/release instead of a bucketed slab (spec §9).
pub struct Arena {
    buf: Vec<u8>,
}

impl Arena {
    /// Create an arena with `capacity` bytes pre-reserved.
    pub fn new(capacity: usize) -> Self {
        Arena {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Acquire a zero-filled scratch buffer of `len` bytes.
    ///
    /// When `ALLOCATOR_BYPASS` is set, always allocates fresh; otherwise
    /// reuses and grows the arena's backing `Vec` in place.
    pub fn acquire(&mut self, len: usize) -> &mut [u8] {
        if allocator_bypassed() {
            self.buf = vec![0u8; len];
            return &mut self.buf[..];
        }
        if self.buf.len() < len {
            self.buf.resize(len, 0);
        } else {
            self.buf.truncate(len);
        }
        &mut self.buf[..len]
    }

    /// Release the arena back to empty (capacity is retained for reuse
    /// unless `ALLOCATOR_BYPASS` is set).
    pub fn release(&mut self) {
        if allocator_bypassed() {
            self.buf = Vec::new();
        } else {
            self.buf.clear();
        }
    }

    /// Bytes currently reserved (not necessarily all live).
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}
