//! Run configuration shared by every thread in the pipeline (spec §4.1).
//!
//! One [`PipelineConfig`] is built once by `cli::init` from the parsed
//! arguments and then handed to the scheduler as an `Arc`, mirroring the
//! donor's single `cli_init_t` passed by pointer into every worker thread.

use std::sync::Arc;

use crate::compressor::Algo;
use crate::crypto::CipherAlg;
use crate::digest::CksumId;
use crate::preprocess::FilterId;

#[derive(Debug, Clone)]
pub struct CipherConfig {
    pub alg: CipherAlg,
    /// Zeroized on drop by the caller once every worker cipher is built
    /// (spec §4.7; see [`crate::util::securerng`] for the zeroizing buffer
    /// type used to hold this before it reaches here).
    pub password: Vec<u8>,
    pub key_len: usize,
    /// Generated once by `cli::init` (or read back from the file header on
    /// decompress) and shared by every worker, since all of them must
    /// derive the same key and the same base nonce (spec §4.7 "A 32-byte
    /// salt... one PBKDF-2 derivation").
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalDedupMode {
    Simple,
    Segmented { blocks_per_segment: usize },
}

#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// `-B` index (spec §6): average Rabin block size selector.
    pub rab_blk_sz: u32,
    /// `-D`: enable bsdiff-based similarity matching as a second pass.
    pub enable_delta: bool,
    /// `-G`/`-F`: global dedup mode, across chunks rather than within one.
    pub global: Option<GlobalDedupMode>,
}

/// Everything a worker needs to process one chunk, independent of its
/// position in the stream. Shared read-only across all worker threads.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub chunksize: u64,
    pub level: u32,
    pub workers: usize,
    pub algo: Algo,
    pub cksum: CksumId,
    pub cipher: Option<CipherConfig>,
    pub dedup: Option<DedupConfig>,
    /// Preprocessor filters enabled by CLI flags, in no particular order;
    /// [`crate::preprocess::apply_chain`] applies them in its own fixed
    /// Dispack -> E8E9 -> DICT -> LZP -> Delta2 sequence regardless of the
    /// order they appear here (spec §4.2 step 3).
    pub preprocess: Vec<FilterId>,
}

impl PipelineConfig {
    pub fn dedup_enabled(&self) -> bool {
        self.dedup.is_some()
    }

    pub fn encrypting(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn into_shared(self) -> Arc<PipelineConfig> {
        Arc::new(self)
    }
}
