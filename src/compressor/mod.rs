//! Compressor back-end contract (spec §4.6).
//!
//! The original exposes this as a C struct of function pointers
//! (`init/compress/decompress/deinit/props/stats`) registered into a static
//! dispatch table. We reshape that into a `Compressor` trait — the same move
//! [`crate::digest`] and [`crate::crypto`] make for their own void-pointer
//! contexts (spec §9) — with one module per concrete algorithm and a single
//! `new_compressor` dispatch function standing in for the registration table.
//!
//! Only algorithms backed by a real crate in this workspace are implemented:
//! `none`, `zlib` (`flate2`), `lz4` (the in-tree [`crate::lz4codec`] engine),
//! `bzip2` and `lzma` behind their Cargo features, and `adapt` (spec §4.6,
//! §9 "Nested back-end adaptive dispatch"). `lzmaMt`, `ppmd`, `lzfx` and
//! `libbsc` have no Rust crate in this workspace's stack and are rejected at
//! parse time with [`crate::error::PcompressError::UnknownAlgorithm`] — see
//! DESIGN.md.

pub mod adapt;
pub mod bzip2_backend;
pub mod lz4_backend;
pub mod lzma_backend;
pub mod none;
pub mod zlib;

use crate::error::{PcompressError, Result};

/// Static properties of an algorithm, queried once per run (spec §4.6 `props`).
#[derive(Debug, Clone, Copy)]
pub struct AlgoProps {
    /// Worst-case expansion the algorithm can add to a chunk of `chunksize`
    /// bytes; callers size their scratch/output buffers from this.
    pub compress_bound_extra: usize,
    /// Whether this algorithm benefits from `level` (0-14) at all.
    pub level_sensitive: bool,
    /// Whether the back-end itself parallelises a single chunk (only
    /// meaningful in single-chunk mode, spec §9 "Single-chunk mode").
    pub supports_inner_threads: bool,
}

/// Uniform compressor interface (spec §4.6).
///
/// `init`/`deinit` map onto `new_compressor`/`Drop`; `stats` is folded into
/// [`crate::pipeline::stats::Stats`] rather than kept per-backend, matching
/// the spec §9 redesign note on global algorithm-stats counters.
pub trait Compressor: Send {
    /// Compresses `src` into a freshly allocated buffer. Returns `Ok(None)`
    /// when the algorithm declined (output would not have been smaller) —
    /// equivalent to the original's negative return meaning "use raw".
    fn compress(&mut self, src: &[u8], level: u32) -> Result<Option<Vec<u8>>>;

    /// Decompresses `src`, which is known to be exactly `original_len` bytes
    /// once expanded (the frame records this, spec §3).
    fn decompress(&mut self, src: &[u8], original_len: usize) -> Result<Vec<u8>>;

    fn props(&self, chunksize: usize) -> AlgoProps {
        AlgoProps {
            compress_bound_extra: chunksize / 16 + 64,
            level_sensitive: true,
            supports_inner_threads: false,
        }
    }

    /// Adaptive back-ends (`adapt`/`adapt2`) report which inner algorithm id
    /// won for the chunk just compressed; stored in ChunkFlags bits 3-6.
    /// Non-adaptive back-ends always report 0.
    fn last_adaptive_id(&self) -> u8 {
        0
    }
}

/// Algorithm identifiers selectable via `-c` (spec §6). Each variant's
/// `u8` wire value is stored in the file header's 8-byte ASCII name field
/// via [`Algo::name`]/[`Algo::from_name`], not this discriminant directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algo {
    None,
    Zlib,
    Lz4,
    Bzip2,
    Lzma,
    Adapt,
    Adapt2,
}

impl Algo {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "none" => Ok(Algo::None),
            "zlib" => Ok(Algo::Zlib),
            "lz4" => Ok(Algo::Lz4),
            "bzip2" => Ok(Algo::Bzip2),
            "lzma" => Ok(Algo::Lzma),
            "adapt" => Ok(Algo::Adapt),
            "adapt2" => Ok(Algo::Adapt2),
            other => Err(PcompressError::UnknownAlgorithm(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algo::None => "none",
            Algo::Zlib => "zlib",
            Algo::Lz4 => "lz4",
            Algo::Bzip2 => "bzip2",
            Algo::Lzma => "lzma",
            Algo::Adapt => "adapt",
            Algo::Adapt2 => "adapt2",
        }
    }
}

/// `init` (spec §4.6): builds a ready `Compressor` for `algo`.
pub fn new_compressor(algo: Algo) -> Result<Box<dyn Compressor>> {
    match algo {
        Algo::None => Ok(Box::new(none::NoneCompressor)),
        Algo::Zlib => Ok(Box::new(zlib::ZlibCompressor::new())),
        Algo::Lz4 => Ok(Box::new(lz4_backend::Lz4Compressor::new())),
        Algo::Bzip2 => bzip2_backend::new(),
        Algo::Lzma => lzma_backend::new(),
        Algo::Adapt => Ok(Box::new(adapt::AdaptCompressor::new(false)?)),
        Algo::Adapt2 => Ok(Box::new(adapt::AdaptCompressor::new(true)?)),
    }
}
