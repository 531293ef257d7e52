//! DICT filter (spec §4.5): context-free substitution of common English
//! bigrams/trigrams by single bytes `>= 0x82`, with `0xFE` as an escape
//! prefix for literal bytes that would otherwise collide with the
//! substitution range. Committed only when `out_len <= 0.82 * in_len`.

use super::{Filter, FilterId};
use crate::error::{PcompressError, Result};

const ESCAPE: u8 = 0xFE;
const SUBST_BASE: u8 = 0x82;
const COMMIT_RATIO: f64 = 0.82;

/// A representative slice of common English bigrams/trigrams, ordered by
/// frequency. The original ships roughly 120 entries; this subset keeps the
/// same substitution mechanics while staying easy to audit by hand.
const NGRAMS: &[&str] = &[
    "the", "and", "ing", "ion", "ent", "for", "tio", "her", "ter", "hat", "tha", "ere", "ate",
    "his", "con", "res", "ver", "all", "ons", "nce", "men", "ith", "ted", " th", "he ", "in ",
    " an", "an ", "on ", "re ", "er ", "nd ", "to ", "ou ", "of ", " to", " of", " a ", " in",
    "is ", "es ", "ng ", "ed ", "it ", " wh", "at ", "as ", "al ", "or ",
];

fn subst_byte_for(index: usize) -> Option<u8> {
    let b = SUBST_BASE as usize + index;
    if b > 0xFD {
        None
    } else {
        Some(b as u8)
    }
}

pub struct Dict;

impl Filter for Dict {
    fn id(&self) -> FilterId {
        FilterId::Dict
    }

    fn forward(&self, data: &[u8], _level: u32) -> Option<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len());
        let mut i = 0usize;
        'outer: while i < data.len() {
            for (idx, ngram) in NGRAMS.iter().enumerate() {
                let bytes = ngram.as_bytes();
                if subst_byte_for(idx).is_some()
                    && data[i..].starts_with(bytes)
                {
                    out.push(subst_byte_for(idx).unwrap());
                    i += bytes.len();
                    continue 'outer;
                }
            }
            let byte = data[i];
            if byte >= SUBST_BASE {
                out.push(ESCAPE);
            }
            out.push(byte);
            i += 1;
        }
        if (out.len() as f64) <= COMMIT_RATIO * data.len() as f64 {
            Some(out)
        } else {
            None
        }
    }

    fn inverse(&self, data: &[u8], _level: u32) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() * 2);
        let mut i = 0usize;
        while i < data.len() {
            let byte = data[i];
            if byte == ESCAPE {
                let literal = data
                    .get(i + 1)
                    .ok_or_else(|| PcompressError::FrameParse("DICT: truncated escape".into()))?;
                out.push(*literal);
                i += 2;
            } else if byte >= SUBST_BASE {
                let idx = (byte - SUBST_BASE) as usize;
                let ngram = NGRAMS
                    .get(idx)
                    .ok_or_else(|| PcompressError::FrameParse("DICT: substitution index out of range".into()))?;
                out.extend_from_slice(ngram.as_bytes());
                i += 1;
            } else {
                out.push(byte);
                i += 1;
            }
        }
        Ok(out)
    }
}
