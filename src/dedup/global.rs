//! Global dedup (spec §4.4 "Global dedup variant"): a hash map shared
//! across all chunks, keyed by cryptographic hash of each block, recording
//! the block's absolute offset in the output file. Access is serialised by
//! the caller via the `index_sem` chain (spec §5); this module only owns
//! the map and its lookup/insert operations, not the semaphore handoff
//! (that lives in [`crate::pipeline::scheduler`]).
//!
//! Two sub-modes (spec §4.4):
//! - [`GlobalIndex::Simple`]: one process-wide map, consulted directly.
//! - [`GlobalIndex::Segmented`]: chunks are grouped into segments; a
//!   segment's sketches are persisted so cross-segment similarity can be
//!   checked without keeping every segment's full index in RAM.

use std::collections::HashMap;

use crate::dedup::sketch::Sketch;
use crate::digest::{digest_bytes, CksumId};

/// A 12-byte on-wire reference to a previously emitted global block: an
/// absolute output-file offset plus the block's length (spec §4.4: "a
/// duplicate emits a 12-byte reference instead of the block data").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalRef {
    pub offset: u64,
    pub len: u32,
}

impl GlobalRef {
    pub fn to_bytes(self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..8].copy_from_slice(&self.offset.to_be_bytes());
        out[8..12].copy_from_slice(&self.len.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        GlobalRef {
            offset: u64::from_be_bytes(bytes[0..8].try_into().unwrap()),
            len: u32::from_be_bytes(bytes[8..12].try_into().unwrap()),
        }
    }
}

struct SegmentRecord {
    sketch: Sketch,
    reference: GlobalRef,
}

/// Shared global dedup state. Not `Sync` by itself: the pipeline wraps it
/// in a `Mutex` (or relies on the `index_sem` chain to guarantee exclusive
/// access without a lock, per spec §5) since blocks are only ever touched
/// by the worker currently holding the semaphore token.
pub enum GlobalIndex {
    Simple {
        by_hash: HashMap<Vec<u8>, GlobalRef>,
    },
    Segmented {
        by_hash: HashMap<Vec<u8>, GlobalRef>,
        segments: Vec<Vec<SegmentRecord>>,
        current_segment: usize,
        blocks_per_segment: usize,
        blocks_in_current: usize,
    },
}

impl GlobalIndex {
    pub fn new_simple() -> Self {
        GlobalIndex::Simple {
            by_hash: HashMap::new(),
        }
    }

    pub fn new_segmented(blocks_per_segment: usize) -> Self {
        GlobalIndex::Segmented {
            by_hash: HashMap::new(),
            segments: vec![Vec::new()],
            current_segment: 0,
            blocks_per_segment: blocks_per_segment.max(1),
            blocks_in_current: 0,
        }
    }

    /// Looks up `block` by its cryptographic hash; returns the reference to
    /// reuse if already present.
    pub fn lookup(&self, block: &[u8]) -> Option<GlobalRef> {
        let hash = digest_bytes(CksumId::Sha256, block);
        match self {
            GlobalIndex::Simple { by_hash } | GlobalIndex::Segmented { by_hash, .. } => {
                by_hash.get(&hash).copied()
            }
        }
    }

    /// Looks up `block` by similarity sketch across prior segments
    /// (segmented mode only; always `None` in simple mode, spec §4.4
    /// "inter-segment similarity is checked against those sketches").
    pub fn lookup_similar(&self, sketch: &Sketch) -> Option<GlobalRef> {
        match self {
            GlobalIndex::Simple { .. } => None,
            GlobalIndex::Segmented { segments, .. } => segments
                .iter()
                .flatten()
                .find(|rec| &rec.sketch == sketch)
                .map(|rec| rec.reference),
        }
    }

    /// Records a newly emitted block at `reference`, making it available
    /// to later lookups.
    pub fn insert(&mut self, block: &[u8], sketch: Sketch, reference: GlobalRef) {
        let hash = digest_bytes(CksumId::Sha256, block);
        match self {
            GlobalIndex::Simple { by_hash } => {
                by_hash.insert(hash, reference);
            }
            GlobalIndex::Segmented {
                by_hash,
                segments,
                current_segment,
                blocks_per_segment,
                blocks_in_current,
            } => {
                by_hash.insert(hash, reference);
                segments[*current_segment].push(SegmentRecord { sketch, reference });
                *blocks_in_current += 1;
                if *blocks_in_current >= *blocks_per_segment {
                    segments.push(Vec::new());
                    *current_segment += 1;
                    *blocks_in_current = 0;
                }
            }
        }
    }
}
