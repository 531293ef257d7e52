//! `adapt`/`adapt2` back-ends (spec §4.6, §9 "Nested back-end adaptive
//! dispatch"): re-enter the dispatch table on each chunk and keep whichever
//! inner algorithm produced the smaller output, recording the winner's id
//! in ChunkFlags bits 3-6 via [`Compressor::last_adaptive_id`].
//!
//! `adapt` chooses between `lz4` (fast) and `zlib` (denser); `adapt2` adds
//! `bzip2` to the pool for a slower, better-compressing pair. Both inner
//! algorithms are tried at the same `level`; ties favour the first
//! (cheaper) candidate.

use super::{bzip2_backend, lz4_backend::Lz4Compressor, zlib::ZlibCompressor, AlgoProps, Compressor};
use crate::error::Result;

/// Wire id recorded in ChunkFlags bits 3-6 for the winning inner algorithm.
const ID_LZ4: u8 = 1;
const ID_ZLIB: u8 = 2;
const ID_BZIP2: u8 = 3;

pub struct AdaptCompressor {
    candidates: Vec<(u8, Box<dyn Compressor>)>,
    last_winner: u8,
}

impl AdaptCompressor {
    pub fn new(extended: bool) -> Result<Self> {
        let mut candidates: Vec<(u8, Box<dyn Compressor>)> = vec![
            (ID_LZ4, Box::new(Lz4Compressor::new())),
            (ID_ZLIB, Box::new(ZlibCompressor::new())),
        ];
        if extended {
            candidates.push((ID_BZIP2, bzip2_backend::new()?));
        }
        Ok(AdaptCompressor {
            candidates,
            last_winner: 0,
        })
    }
}

impl Compressor for AdaptCompressor {
    fn compress(&mut self, src: &[u8], level: u32) -> Result<Option<Vec<u8>>> {
        let mut best: Option<(u8, Vec<u8>)> = None;
        for (id, candidate) in self.candidates.iter_mut() {
            if let Some(out) = candidate.compress(src, level)? {
                let smaller = best.as_ref().map(|(_, b)| out.len() < b.len()).unwrap_or(true);
                if smaller {
                    best = Some((*id, out));
                }
            }
        }
        match best {
            Some((id, out)) => {
                self.last_winner = id;
                Ok(Some(out))
            }
            None => {
                self.last_winner = 0;
                Ok(None)
            }
        }
    }

    fn decompress(&mut self, src: &[u8], original_len: usize) -> Result<Vec<u8>> {
        // The frame's ChunkFlags bits 3-6 tell the caller which inner
        // algorithm to dispatch to; adapt itself is only used for the
        // compress-side fan-out. Callers must route decompression through
        // the winning algorithm's own `Compressor::decompress`, looked up
        // by id via `winner_compressor`.
        self.winner_compressor()?.decompress(src, original_len)
    }

    fn props(&self, chunksize: usize) -> AlgoProps {
        AlgoProps {
            compress_bound_extra: chunksize / 16 + 64,
            level_sensitive: true,
            supports_inner_threads: false,
        }
    }

    fn last_adaptive_id(&self) -> u8 {
        self.last_winner
    }
}

impl AdaptCompressor {
    /// Looks up the inner compressor matching `last_adaptive_id`, used by
    /// `decompress` once the frame's stored id tells us which candidate to
    /// replay. Callers on the decompress path construct an `AdaptCompressor`
    /// and must call `set_winner` from the stored ChunkFlags id first.
    pub fn set_winner(&mut self, id: u8) {
        self.last_winner = id;
    }

    fn winner_compressor(&mut self) -> Result<&mut Box<dyn Compressor>> {
        let id = self.last_winner;
        self.candidates
            .iter_mut()
            .find(|(cid, _)| *cid == id)
            .map(|(_, c)| c)
            .ok_or_else(|| {
                crate::error::PcompressError::Compressor(format!(
                    "adapt: no inner algorithm registered for id {id}"
                ))
            })
    }
}
