//! Dedup block-index wire encoding (spec §3 "Dedup block-index").
//!
//! A packed array of 32-bit big-endian entries:
//! - high bit set: an index reference to an earlier block in the same
//!   chunk; the next bit distinguishes an exact duplicate (copy, no data)
//!   from a similar block (a bsdiff patch follows in the data area);
//! - high bit clear: the low 31 bits are a literal run's length, and that
//!   many raw bytes follow in the data area.
//!
//! The data area is not self-delimiting for patches (spec.md leaves the
//! patch's own length unspecified, §9 Open Questions): this port prefixes
//! each `PartialRef` patch with a 4-byte big-endian length so the decoder
//! knows where it ends (documented in DESIGN.md).

use crate::dedup::index::Entry;
use crate::error::{PcompressError, Result};

const REF_BIT: u32 = 1 << 31;
const SIMILAR_BIT: u32 = 1 << 30;
const INDEX_MASK: u32 = SIMILAR_BIT - 1; // low 30 bits
const LENGTH_MASK: u32 = REF_BIT - 1; // low 31 bits

/// On-wire entry header, one `DedupIndexEntry` per logical block
/// (spec §3 "Global-dedup index entry" documents the 12-byte *global*
/// variant separately; this is the in-chunk 4-byte variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupIndexEntry(pub u32);

impl DedupIndexEntry {
    pub fn literal(len: u32) -> Result<Self> {
        if len > LENGTH_MASK {
            return Err(PcompressError::FrameParse(format!(
                "dedup literal run too long: {len} bytes"
            )));
        }
        Ok(DedupIndexEntry(len))
    }

    pub fn exact_ref(block_index: u32) -> Result<Self> {
        if block_index > INDEX_MASK {
            return Err(PcompressError::FrameParse(format!(
                "dedup block index too large: {block_index}"
            )));
        }
        Ok(DedupIndexEntry(REF_BIT | block_index))
    }

    pub fn partial_ref(block_index: u32) -> Result<Self> {
        if block_index > INDEX_MASK {
            return Err(PcompressError::FrameParse(format!(
                "dedup block index too large: {block_index}"
            )));
        }
        Ok(DedupIndexEntry(REF_BIT | SIMILAR_BIT | block_index))
    }

    pub fn is_ref(self) -> bool {
        self.0 & REF_BIT != 0
    }

    pub fn is_similar(self) -> bool {
        self.is_ref() && self.0 & SIMILAR_BIT != 0
    }

    pub fn literal_len(self) -> u32 {
        self.0 & LENGTH_MASK
    }

    pub fn block_index(self) -> u32 {
        self.0 & INDEX_MASK
    }
}

/// Encodes a chunk's dedup entries into `[count: u32][index array][data area]`
/// (spec §4.4 "Emit"), ready to be prefixed by the chunk's preprocessor/
/// compression framing.
pub fn encode(entries: &[Entry]) -> Result<Vec<u8>> {
    let mut index_bytes = Vec::with_capacity(entries.len() * 4);
    let mut data_bytes = Vec::new();

    for entry in entries {
        match entry {
            Entry::Literal(bytes) => {
                let code = DedupIndexEntry::literal(bytes.len() as u32)?;
                index_bytes.extend_from_slice(&code.0.to_be_bytes());
                data_bytes.extend_from_slice(bytes);
            }
            Entry::ExactRef { block_index } => {
                let code = DedupIndexEntry::exact_ref(*block_index as u32)?;
                index_bytes.extend_from_slice(&code.0.to_be_bytes());
            }
            Entry::PartialRef { block_index, patch } => {
                let code = DedupIndexEntry::partial_ref(*block_index as u32)?;
                index_bytes.extend_from_slice(&code.0.to_be_bytes());
                data_bytes.extend_from_slice(&(patch.len() as u32).to_be_bytes());
                data_bytes.extend_from_slice(patch);
            }
        }
    }

    let mut out = Vec::with_capacity(4 + index_bytes.len() + data_bytes.len());
    out.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    out.extend_from_slice(&index_bytes);
    out.extend_from_slice(&data_bytes);
    Ok(out)
}

/// Decodes the `encode` output back into `Entry` values. Exact/partial refs
/// carry only their `block_index`/patch at this layer; resolving them
/// against already-reconstructed blocks is [`crate::pipeline::worker`]'s job.
pub fn decode(bytes: &[u8]) -> Result<Vec<Entry>> {
    if bytes.len() < 4 {
        return Err(PcompressError::FrameParse("truncated dedup index count".into()));
    }
    let count = u32::from_be_bytes(bytes[0..4].try_into().unwrap()) as usize;
    let mut cursor = 4;

    if bytes.len() < cursor + count * 4 {
        return Err(PcompressError::FrameParse("truncated dedup index array".into()));
    }
    let mut codes = Vec::with_capacity(count);
    for _ in 0..count {
        let word = u32::from_be_bytes(bytes[cursor..cursor + 4].try_into().unwrap());
        codes.push(DedupIndexEntry(word));
        cursor += 4;
    }

    let mut entries = Vec::with_capacity(count);
    for code in codes {
        if !code.is_ref() {
            let len = code.literal_len() as usize;
            let data = bytes
                .get(cursor..cursor + len)
                .ok_or_else(|| PcompressError::FrameParse("truncated dedup literal data".into()))?
                .to_vec();
            cursor += len;
            entries.push(Entry::Literal(data));
        } else if !code.is_similar() {
            entries.push(Entry::ExactRef {
                block_index: code.block_index() as usize,
            });
        } else {
            if bytes.len() < cursor + 4 {
                return Err(PcompressError::FrameParse("truncated dedup patch length".into()));
            }
            let patch_len = u32::from_be_bytes(bytes[cursor..cursor + 4].try_into().unwrap()) as usize;
            cursor += 4;
            let patch = bytes
                .get(cursor..cursor + patch_len)
                .ok_or_else(|| PcompressError::FrameParse("truncated dedup patch data".into()))?
                .to_vec();
            cursor += patch_len;
            entries.push(Entry::PartialRef {
                block_index: code.block_index() as usize,
                patch,
            });
        }
    }
    Ok(entries)
}

/// Total encoded size a `encode`d buffer would occupy, without building it
/// (spec §4.4 "Failure to compress the index" needs this cheaply per chunk).
pub fn encoded_size(entries: &[Entry]) -> usize {
    4 + crate::dedup::index::encoded_size(entries)
}
