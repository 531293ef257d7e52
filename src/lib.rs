//! Pcompress — a chunked, parallel, multi-algorithm compressor with
//! content-defined deduplication, authenticated encryption, and a
//! reversible preprocessor filter chain.
//!
//! The crate is organized the way the pipeline itself is: [`pipeline`]
//! wires a reader thread, `N` worker threads, and a writer thread together
//! ([`pipeline::scheduler`]); each worker calls out to the pluggable
//! back-ends in [`compressor`], [`crypto`] and [`digest`], runs chunks
//! through [`preprocess`] and [`dedup`], and frames the result with
//! [`format`]. [`lz4codec`] is the in-tree LZ4 block/frame engine behind
//! the `lz4` compressor back-end. [`archive`] adds the metadata-stream
//! scaffolding for multi-file runs. [`cli`] and `main.rs` are the
//! executable surface; everything else is usable as a library on its own.

pub mod archive;
pub mod cli;
pub mod compressor;
pub mod config;
pub mod crypto;
pub mod dedup;
pub mod digest;
pub mod error;
pub mod format;
pub mod lz4codec;
pub mod pipeline;
pub mod preprocess;
pub mod timefn;
pub mod util;

pub use error::{PcompressError, Result};
pub use pipeline::{compress_file, decompress_file, CipherConfig, DedupConfig, GlobalDedupMode, PipelineConfig, Stats};

pub use compressor::Algo;
pub use crypto::CipherAlg;
pub use digest::CksumId;
