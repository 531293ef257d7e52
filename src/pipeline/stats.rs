//! Run-wide statistics (spec §9 "Global mutable state for algorithm stats":
//! "Re-model as a `Stats` struct owned by the top-level pipeline and mutated
//! via an atomic counter on each worker-return path; the top-level prints
//! them at shutdown.").

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Stats {
    pub chunks_processed: AtomicU64,
    pub bytes_in: AtomicU64,
    pub bytes_out: AtomicU64,
    pub chunks_raw: AtomicU64,
    pub chunks_compressed: AtomicU64,
    pub chunks_deduped: AtomicU64,
    pub chunks_preprocessed: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_chunk(&self, in_len: u64, out_len: u64, raw: bool, deduped: bool, preprocessed: bool) {
        self.chunks_processed.fetch_add(1, Ordering::Relaxed);
        self.bytes_in.fetch_add(in_len, Ordering::Relaxed);
        self.bytes_out.fetch_add(out_len, Ordering::Relaxed);
        if raw {
            self.chunks_raw.fetch_add(1, Ordering::Relaxed);
        } else {
            self.chunks_compressed.fetch_add(1, Ordering::Relaxed);
        }
        if deduped {
            self.chunks_deduped.fetch_add(1, Ordering::Relaxed);
        }
        if preprocessed {
            self.chunks_preprocessed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Formats a one-line summary (spec §4.6 `stats(show)`), printed at
    /// shutdown when `-v`/`-m` raise the display level (spec §6).
    pub fn summary(&self) -> String {
        format!(
            "{} chunks, {} -> {} bytes ({} raw, {} compressed, {} deduped, {} preprocessed)",
            self.chunks_processed.load(Ordering::Relaxed),
            self.bytes_in.load(Ordering::Relaxed),
            self.bytes_out.load(Ordering::Relaxed),
            self.chunks_raw.load(Ordering::Relaxed),
            self.chunks_compressed.load(Ordering::Relaxed),
            self.chunks_deduped.load(Ordering::Relaxed),
            self.chunks_preprocessed.load(Ordering::Relaxed),
        )
    }
}
