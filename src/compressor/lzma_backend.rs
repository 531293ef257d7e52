//! `lzma` back-end (spec §4.6), gated behind the `lzma-compression` feature
//! since it links the system `liblzma` via the `rust-lzma` crate.

use crate::error::{PcompressError, Result};

#[cfg(feature = "lzma-compression")]
mod imp {
    use super::*;
    use crate::compressor::{AlgoProps, Compressor};
    use crate::config::LEVEL_MAX;

    pub struct LzmaCompressor;

    fn rescale_preset(level: u32) -> u32 {
        (level.min(LEVEL_MAX) as u64 * 9 / LEVEL_MAX as u64) as u32
    }

    impl Compressor for LzmaCompressor {
        fn compress(&mut self, src: &[u8], level: u32) -> Result<Option<Vec<u8>>> {
            let out = lzma::compress(src, rescale_preset(level))
                .map_err(|e| PcompressError::Compressor(format!("lzma: {e:?}")))?;
            if out.len() >= src.len() {
                Ok(None)
            } else {
                Ok(Some(out))
            }
        }

        fn decompress(&mut self, src: &[u8], _original_len: usize) -> Result<Vec<u8>> {
            lzma::decompress(src).map_err(|e| PcompressError::Compressor(format!("lzma: {e:?}")))
        }

        fn props(&self, chunksize: usize) -> AlgoProps {
            AlgoProps {
                compress_bound_extra: chunksize / 20 + 256,
                level_sensitive: true,
                supports_inner_threads: false,
            }
        }
    }
}

#[cfg(feature = "lzma-compression")]
pub fn new() -> Result<Box<dyn crate::compressor::Compressor>> {
    Ok(Box::new(imp::LzmaCompressor))
}

#[cfg(not(feature = "lzma-compression"))]
pub fn new() -> Result<Box<dyn crate::compressor::Compressor>> {
    Err(PcompressError::UnknownAlgorithm(
        "lzma (built without the lzma-compression feature)".into(),
    ))
}
