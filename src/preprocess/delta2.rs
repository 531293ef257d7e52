//! Delta2 filter (spec §4.5): locates byte-wise arithmetic progressions
//! (every `stride`-th byte advancing by a constant delta, wrapping mod 256)
//! and replaces the progression points with a compact header, leaving any
//! interstitial bytes stored raw. Processed in 4 KiB sub-blocks for cache
//! locality, each independently emitting either a literal run
//! `[0 | len64]` + raw bytes, or a delta run
//! `[stride | len64 | start_val | delta_val | interstitial bytes...]`.

use super::{Filter, FilterId};
use crate::error::{PcompressError, Result};

const SUB_BLOCK: usize = 4096;
const STRIDES: [u8; 7] = [2, 3, 4, 5, 6, 7, 8];
const MIN_STEPS: usize = 16;

enum Run {
    Literal { start: usize, len: usize },
    Delta {
        start: usize,
        len: usize,
        stride: u8,
        start_val: u8,
        delta_val: u8,
    },
}

/// Number of progression points covering a run of `len` bytes at `stride`.
fn steps_for(len: usize, stride: usize) -> usize {
    (len - 1) / stride + 1
}

/// Longest stride-`stride` progression starting at `data[pos]`, in total
/// byte span (not step count). `data[pos + k*stride]` must advance by a
/// fixed delta for `k = 0..steps`.
fn longest_run_at(data: &[u8], pos: usize, stride: u8) -> Option<(usize, u8)> {
    let stride = stride as usize;
    if pos + stride >= data.len() {
        return None;
    }
    let delta = data[pos + stride].wrapping_sub(data[pos]);
    let mut steps = 1usize;
    let mut i = pos;
    while i + stride < data.len() && data[i + stride] == data[i].wrapping_add(delta) {
        steps += 1;
        i += stride;
    }
    if steps >= MIN_STEPS {
        let span = (steps - 1) * stride + 1;
        Some((span, delta))
    } else {
        None
    }
}

fn encode_sub_block(data: &[u8], base: usize) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut pos = 0usize;
    while pos < data.len() {
        let mut best: Option<(u8, usize, u8)> = None; // (stride, span, delta)
        for &stride in &STRIDES {
            if let Some((span, delta)) = longest_run_at(data, pos, stride) {
                if best.map(|(_, b, _)| span > b).unwrap_or(true) {
                    best = Some((stride, span, delta));
                }
            }
        }
        match best {
            Some((stride, span, delta)) => {
                runs.push(Run::Delta {
                    start: base + pos,
                    len: span,
                    stride,
                    start_val: data[pos],
                    delta_val: delta,
                });
                pos += span;
            }
            None => {
                if let Some(Run::Literal { len, .. }) = runs.last_mut() {
                    *len += 1;
                    pos += 1;
                    continue;
                }
                runs.push(Run::Literal {
                    start: base + pos,
                    len: 1,
                });
                pos += 1;
            }
        }
    }
    runs
}

fn write_runs(out: &mut Vec<u8>, data: &[u8], runs: &[Run]) {
    for run in runs {
        match run {
            Run::Literal { start, len } => {
                out.push(0);
                out.extend_from_slice(&(*len as u64).to_be_bytes());
                out.extend_from_slice(&data[*start..*start + *len]);
            }
            Run::Delta {
                start,
                len,
                stride,
                start_val,
                delta_val,
            } => {
                out.push(*stride);
                out.extend_from_slice(&(*len as u64).to_be_bytes());
                out.push(*start_val);
                out.push(*delta_val);
                let steps = steps_for(*len, *stride as usize);
                // Interstitial bytes: every offset in the span that is not
                // a progression point (offset 0, stride, 2*stride, ...).
                for k in 0..*len {
                    if k % (*stride as usize) != 0 || k / (*stride as usize) >= steps {
                        out.push(data[*start + k]);
                    }
                }
            }
        }
    }
}

pub struct Delta2;

impl Filter for Delta2 {
    fn id(&self) -> FilterId {
        FilterId::Delta2
    }

    fn forward(&self, data: &[u8], _level: u32) -> Option<Vec<u8>> {
        if data.is_empty() {
            return None;
        }
        let mut out = Vec::with_capacity(data.len());
        for (i, chunk) in data.chunks(SUB_BLOCK).enumerate() {
            let runs = encode_sub_block(chunk, i * SUB_BLOCK);
            write_runs(&mut out, data, &runs);
        }
        if out.len() < data.len() {
            Some(out)
        } else {
            None
        }
    }

    fn inverse(&self, data: &[u8], _level: u32) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() * 2);
        let mut i = 0usize;
        while i < data.len() {
            let stride = *data
                .get(i)
                .ok_or_else(|| PcompressError::FrameParse("Delta2: truncated run header".into()))?;
            i += 1;
            let len_bytes: [u8; 8] = data
                .get(i..i + 8)
                .ok_or_else(|| PcompressError::FrameParse("Delta2: truncated run length".into()))?
                .try_into()
                .unwrap();
            let len = u64::from_be_bytes(len_bytes) as usize;
            i += 8;
            if stride == 0 {
                let bytes = data
                    .get(i..i + len)
                    .ok_or_else(|| PcompressError::FrameParse("Delta2: truncated literal run".into()))?;
                out.extend_from_slice(bytes);
                i += len;
            } else {
                let start_val = *data
                    .get(i)
                    .ok_or_else(|| PcompressError::FrameParse("Delta2: truncated start value".into()))?;
                let delta_val = *data
                    .get(i + 1)
                    .ok_or_else(|| PcompressError::FrameParse("Delta2: truncated delta value".into()))?;
                i += 2;
                let stride = stride as usize;
                let steps = steps_for(len, stride);
                let interstitial_len = len - steps;
                let interstitial = data
                    .get(i..i + interstitial_len)
                    .ok_or_else(|| PcompressError::FrameParse("Delta2: truncated interstitial bytes".into()))?;
                i += interstitial_len;

                let mut val = start_val;
                let mut interstitial_iter = interstitial.iter();
                for k in 0..len {
                    if k % stride == 0 && k / stride < steps {
                        if k != 0 {
                            val = val.wrapping_add(delta_val);
                        }
                        out.push(val);
                    } else {
                        let byte = interstitial_iter.next().ok_or_else(|| {
                            PcompressError::FrameParse("Delta2: interstitial stream exhausted".into())
                        })?;
                        out.push(*byte);
                    }
                }
            }
        }
        Ok(out)
    }
}
