//! bsdiff/bspatch adapter (spec §4.4 "SIMILAR_PARTIAL"): wraps the
//! `qbsdiff` crate to produce/apply a binary patch between a candidate
//! block and the similar block it references.

use qbsdiff::{Bspatch, Bsdiff};

use crate::error::{PcompressError, Result};

/// Produces a bsdiff patch turning `reference` into `candidate`.
pub fn diff(reference: &[u8], candidate: &[u8]) -> Result<Vec<u8>> {
    let mut patch = Vec::new();
    Bsdiff::new(reference, candidate)
        .compare(&mut patch)
        .map_err(|e| PcompressError::Compressor(format!("bsdiff: {e}")))?;
    Ok(patch)
}

/// Reconstructs the original block by applying `patch` to `reference`.
pub fn patch(reference: &[u8], patch_bytes: &[u8]) -> Result<Vec<u8>> {
    let patcher = Bspatch::new(patch_bytes).map_err(|e| PcompressError::Compressor(format!("bspatch: {e}")))?;
    let mut out = Vec::with_capacity(reference.len());
    patcher
        .apply(reference, &mut out)
        .map_err(|e| PcompressError::Compressor(format!("bspatch: {e}")))?;
    Ok(out)
}
