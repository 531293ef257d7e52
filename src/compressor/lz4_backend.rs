//! `lz4` back-end: thin adapter over the in-tree [`crate::lz4codec::block`]
//! engine (spec §4.6). The pipeline never touches LZ4 frame format; it calls
//! the block API directly and wraps the result in its own [`crate::format`]
//! chunk framing.

use super::{AlgoProps, Compressor};
use crate::error::{PcompressError, Result};
use crate::lz4codec::block::compress::{compress_bound, compress_default};
use crate::lz4codec::block::decompress_api::decompress_safe;

pub struct Lz4Compressor;

impl Lz4Compressor {
    pub fn new() -> Self {
        Lz4Compressor
    }
}

impl Default for Lz4Compressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for Lz4Compressor {
    fn compress(&mut self, src: &[u8], _level: u32) -> Result<Option<Vec<u8>>> {
        let bound = compress_bound(src.len() as i32).max(0) as usize;
        let mut dst = vec![0u8; bound];
        let written = compress_default(src, &mut dst)
            .map_err(|e| PcompressError::Compressor(format!("lz4: {e:?}")))?;
        if written == 0 || written >= src.len() {
            return Ok(None);
        }
        dst.truncate(written);
        Ok(Some(dst))
    }

    fn decompress(&mut self, src: &[u8], original_len: usize) -> Result<Vec<u8>> {
        let mut dst = vec![0u8; original_len];
        let written = decompress_safe(src, &mut dst)
            .map_err(|e| PcompressError::Compressor(format!("lz4: {e:?}")))?;
        if written != original_len {
            return Err(PcompressError::Compressor(format!(
                "lz4 decompressed {written} bytes, expected {original_len}"
            )));
        }
        Ok(dst)
    }

    fn props(&self, chunksize: usize) -> AlgoProps {
        AlgoProps {
            compress_bound_extra: (chunksize / 255) + 16,
            level_sensitive: false,
            supports_inner_threads: false,
        }
    }
}
