//! Per-chunk dedup block index (spec §4.4 "Per-chunk index table").
//!
//! Splits a chunk into Rabin blocks, finds exact duplicates (bytewise
//! equal) and, when enabled, near-duplicates (matching similarity sketch,
//! matching length, far enough apart), merges runs of unmatched blocks,
//! and emits a compact entry list. Falls back to "pass through untouched"
//! when the encoded form is not smaller than the original (spec §4.4
//! "Failure to compress the index").

use crate::config::DELTAC_MIN_DISTANCE_DEFAULT;
use crate::dedup::bsdiff_adapter;
use crate::dedup::rabin::RabinChunker;
use crate::dedup::sketch::{self, SimilarityMode};
use crate::digest::{digest_bytes, CksumId};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Raw bytes for a merged run of non-duplicate blocks.
    Literal(Vec<u8>),
    /// Exact duplicate of an earlier block in this chunk, by index.
    ExactRef { block_index: usize },
    /// Near duplicate: bsdiff patch against an earlier block.
    PartialRef { block_index: usize, patch: Vec<u8> },
}

pub struct DedupIndex {
    pub entries: Vec<Entry>,
}

struct BlockRecord {
    hash: Vec<u8>,
    offset: usize,
    len: usize,
    sketch: Option<sketch::Sketch>,
}

/// Builds the per-chunk dedup index for `data`. `enable_delta` turns on the
/// second pass for `SIMILAR_PARTIAL` matches (spec §4.4); `rab_blk_sz`
/// selects the average Rabin block size (`-B`, spec §6).
pub fn build(data: &[u8], rab_blk_sz: u32, enable_delta: bool) -> Result<DedupIndex> {
    let chunker = RabinChunker::new(rab_blk_sz);
    let blocks = chunker.blocks(data);

    let mut records = Vec::with_capacity(blocks.len());
    for &(start, end) in &blocks {
        let block = &data[start..end];
        records.push(BlockRecord {
            hash: digest_bytes(CksumId::Crc64, block),
            offset: start,
            len: end - start,
            sketch: if enable_delta {
                Some(sketch::compute(block, SimilarityMode::Standard))
            } else {
                None
            },
        });
    }

    // Pass 1: exact duplicates (same hash, same length, bytewise equal).
    let mut exact_ref: Vec<Option<usize>> = vec![None; records.len()];
    for i in 0..records.len() {
        for j in 0..i {
            if exact_ref[i].is_some() {
                break;
            }
            if records[i].len == records[j].len
                && records[i].hash == records[j].hash
                && data[blocks[i].0..blocks[i].1] == data[blocks[j].0..blocks[j].1]
            {
                exact_ref[i] = Some(j);
            }
        }
    }

    // Pass 2: near duplicates via similarity sketch (spec §4.4 "second pass").
    let mut partial_ref: Vec<Option<usize>> = vec![None; records.len()];
    if enable_delta {
        for i in 0..records.len() {
            if exact_ref[i].is_some() {
                continue;
            }
            for j in 0..i {
                if exact_ref[j].is_some() || partial_ref[i].is_some() {
                    continue;
                }
                let far_enough = records[i].offset.abs_diff(records[j].offset) >= DELTAC_MIN_DISTANCE_DEFAULT;
                if records[i].len == records[j].len
                    && records[i].sketch == records[j].sketch
                    && far_enough
                {
                    partial_ref[i] = Some(j);
                }
            }
        }
    }

    // Merge pass + emit.
    let mut entries = Vec::new();
    let mut literal_run_start: Option<usize> = None;
    let max_block = crate::config::RAB_BLOCK_MAX;

    let flush_literal = |entries: &mut Vec<Entry>, run_start: usize, run_end_block: usize| {
        let start = blocks[run_start].0;
        let end = blocks[run_end_block].1;
        entries.push(Entry::Literal(data[start..end].to_vec()));
    };

    let mut i = 0usize;
    while i < records.len() {
        if let Some(refidx) = exact_ref[i] {
            if let Some(run_start) = literal_run_start.take() {
                flush_literal(&mut entries, run_start, i - 1);
            }
            entries.push(Entry::ExactRef { block_index: refidx });
        } else if let Some(refidx) = partial_ref[i] {
            if let Some(run_start) = literal_run_start.take() {
                flush_literal(&mut entries, run_start, i - 1);
            }
            let reference = &data[blocks[refidx].0..blocks[refidx].1];
            let candidate = &data[blocks[i].0..blocks[i].1];
            let patch = bsdiff_adapter::diff(reference, candidate)?;
            entries.push(Entry::PartialRef {
                block_index: refidx,
                patch,
            });
        } else {
            let run_start = literal_run_start.get_or_insert(i);
            let run_len = blocks[i].1 - blocks[*run_start].0;
            if run_len >= max_block {
                flush_literal(&mut entries, *run_start, i);
                literal_run_start = None;
            }
        }
        i += 1;
    }
    if let Some(run_start) = literal_run_start {
        flush_literal(&mut entries, run_start, records.len() - 1);
    }

    Ok(DedupIndex { entries })
}

/// Estimated encoded size of `entries`, used to decide whether the dedup
/// index is worth keeping (spec §4.4 "Failure to compress the index").
pub fn encoded_size(entries: &[Entry]) -> usize {
    entries
        .iter()
        .map(|e| match e {
            Entry::Literal(bytes) => 9 + bytes.len(),
            Entry::ExactRef { .. } => 9,
            Entry::PartialRef { patch, .. } => 9 + patch.len(),
        })
        .sum()
}
