//! Min-hash similarity sketch (spec §4.4 "Min-heap sketch"): treats a
//! block's bytes as 64-bit integers, min-heap-selects the `k` smallest
//! (`k` a fraction of the block's 64-bit-word length depending on
//! similarity mode), and hashes their concatenation. Two blocks are
//! "similar" iff their sketches are equal.

use std::collections::BinaryHeap;

use crate::digest::crc64::Crc64Digest;
use crate::digest::Digest;

/// Similarity precision modes (spec §4.4: "k = 50% / 62% / 87% of block
/// length"), selected by `-E` (single vs double, spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMode {
    Loose,
    Standard,
    Strict,
}

impl SimilarityMode {
    fn fraction(self) -> f64 {
        match self {
            SimilarityMode::Loose => 0.50,
            SimilarityMode::Standard => 0.62,
            SimilarityMode::Strict => 0.87,
        }
    }
}

/// A block's similarity fingerprint: the hash of its `k` smallest 64-bit
/// words, concatenated in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sketch(pub Vec<u8>);

fn as_u64_words(block: &[u8]) -> Vec<u64> {
    block
        .chunks(8)
        .map(|w| {
            let mut buf = [0u8; 8];
            buf[..w.len()].copy_from_slice(w);
            u64::from_le_bytes(buf)
        })
        .collect()
}

/// Computes the min-hash sketch of `block` under `mode`.
///
/// Uses a max-heap (`BinaryHeap` of `Reverse` so the heap root is the
/// current largest of the retained set) capped at size `k`: every word
/// either grows the heap under the cap or displaces the current max,
/// leaving the `k` smallest words once the whole block is scanned.
pub fn compute(block: &[u8], mode: SimilarityMode) -> Sketch {
    let words = as_u64_words(block);
    let k = ((words.len() as f64) * mode.fraction()).ceil() as usize;
    let k = k.max(1).min(words.len().max(1));

    let mut heap: BinaryHeap<u64> = BinaryHeap::with_capacity(k);
    for &w in &words {
        if heap.len() < k {
            heap.push(w);
        } else if let Some(&max) = heap.peek() {
            if w < max {
                heap.pop();
                heap.push(w);
            }
        }
    }
    let smallest: Vec<u64> = heap.into_sorted_vec();

    let mut digest = Crc64Digest::new();
    for w in &smallest {
        digest.update(&w.to_le_bytes());
    }
    Sketch(digest.finish())
}
