//! LZP filter (spec §4.5): a literal predictor. A hash of the preceding
//! `ORDER` bytes indexes a table of positions; if the byte at the predicted
//! position matches the current byte, a run-length token replaces the
//! matched run instead of emitting literals. Hash table size doubles as
//! `level` drops (spec §4.5: "larger hash for *lower* global compression
//! levels, counterintuitively, so LZP complements the weaker back-end").

use super::{Filter, FilterId};
use crate::config::LEVEL_MAX;
use crate::error::{PcompressError, Result};

const ORDER: usize = 4;
const MIN_MATCH: usize = 8;
const TOKEN_LITERAL: u8 = 0;
const TOKEN_MATCH: u8 = 1;

/// `hashsize` ranges 16..21 bits depending on level; lower `level` gets the
/// larger table.
fn hashsize_bits(level: u32) -> u32 {
    let level = level.min(LEVEL_MAX);
    21 - ((level * 5) / LEVEL_MAX)
}

fn hash_ctx(ctx: &[u8], bits: u32) -> usize {
    let mut h: u32 = 0;
    for &b in ctx {
        h = h.wrapping_mul(0x0100_0193) ^ b as u32;
    }
    (h as usize) & ((1usize << bits) - 1)
}

pub struct Lzp;

impl Filter for Lzp {
    fn id(&self) -> FilterId {
        FilterId::Lzp
    }

    fn forward(&self, data: &[u8], level: u32) -> Option<Vec<u8>> {
        if data.len() < ORDER + MIN_MATCH {
            return None;
        }
        let bits = hashsize_bits(level);
        let mut table = vec![usize::MAX; 1usize << bits];
        let mut out = Vec::with_capacity(data.len());
        let mut i = ORDER;
        out.extend_from_slice(&data[..ORDER]);

        while i < data.len() {
            let ctx = &data[i - ORDER..i];
            let h = hash_ctx(ctx, bits);
            let predicted = table[h];
            table[h] = i;

            if predicted != usize::MAX {
                let max_run = data.len() - i;
                let mut run = 0usize;
                while run < max_run
                    && predicted + run < data.len()
                    && data[predicted + run] == data[i + run]
                {
                    run += 1;
                }
                if run >= MIN_MATCH {
                    out.push(TOKEN_MATCH);
                    out.extend_from_slice(&(run as u32).to_le_bytes());
                    i += run;
                    continue;
                }
            }
            out.push(TOKEN_LITERAL);
            out.push(data[i]);
            i += 1;
        }
        Some(out)
    }

    fn inverse(&self, data: &[u8], level: u32) -> Result<Vec<u8>> {
        if data.len() < ORDER {
            return Err(PcompressError::FrameParse("LZP: truncated stream".into()));
        }
        let bits = hashsize_bits(level);
        let mut table = vec![usize::MAX; 1usize << bits];
        let mut out = data[..ORDER].to_vec();
        let mut pos = ORDER;
        let mut cursor = ORDER;

        while cursor < data.len() {
            let ctx = &out[pos - ORDER..pos];
            let h = hash_ctx(ctx, bits);
            let predicted = table[h];
            table[h] = pos;

            let token = data[cursor];
            cursor += 1;
            if token == TOKEN_MATCH {
                let run_bytes: [u8; 4] = data
                    .get(cursor..cursor + 4)
                    .ok_or_else(|| PcompressError::FrameParse("LZP: truncated run length".into()))?
                    .try_into()
                    .unwrap();
                let run = u32::from_le_bytes(run_bytes) as usize;
                cursor += 4;
                if predicted == usize::MAX {
                    return Err(PcompressError::FrameParse("LZP: match with no predictor".into()));
                }
                for k in 0..run {
                    let byte = out[predicted + k];
                    out.push(byte);
                }
                pos += run;
            } else {
                let byte = *data
                    .get(cursor)
                    .ok_or_else(|| PcompressError::FrameParse("LZP: truncated literal".into()))?;
                cursor += 1;
                out.push(byte);
                pos += 1;
            }
        }
        Ok(out)
    }
}
