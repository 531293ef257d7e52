//! `bzip2` back-end (spec §4.6), gated behind the `bzip2-compression`
//! feature (on by default) since it pulls in the system `libbz2` via the
//! `bzip2` crate's `-sys` dependency.

use crate::error::{PcompressError, Result};

#[cfg(feature = "bzip2-compression")]
mod imp {
    use super::*;
    use bzip2::read::BzDecoder;
    use bzip2::write::BzEncoder;
    use bzip2::Compression;
    use std::io::{Read, Write};

    use crate::compressor::{AlgoProps, Compressor};
    use crate::config::LEVEL_MAX;

    pub struct Bzip2Compressor;

    fn rescale_level(level: u32) -> u32 {
        1 + ((level.min(LEVEL_MAX) as u64 * 8) / LEVEL_MAX as u64) as u32
    }

    impl Compressor for Bzip2Compressor {
        fn compress(&mut self, src: &[u8], level: u32) -> Result<Option<Vec<u8>>> {
            let mut encoder = BzEncoder::new(Vec::with_capacity(src.len()), Compression::new(rescale_level(level)));
            encoder
                .write_all(src)
                .map_err(|e| PcompressError::Compressor(e.to_string()))?;
            let out = encoder
                .finish()
                .map_err(|e| PcompressError::Compressor(e.to_string()))?;
            if out.len() >= src.len() {
                Ok(None)
            } else {
                Ok(Some(out))
            }
        }

        fn decompress(&mut self, src: &[u8], original_len: usize) -> Result<Vec<u8>> {
            let mut decoder = BzDecoder::new(src);
            let mut out = Vec::with_capacity(original_len);
            decoder
                .read_to_end(&mut out)
                .map_err(|e| PcompressError::Compressor(e.to_string()))?;
            Ok(out)
        }

        fn props(&self, chunksize: usize) -> AlgoProps {
            AlgoProps {
                compress_bound_extra: chunksize / 100 + 600,
                level_sensitive: true,
                supports_inner_threads: false,
            }
        }
    }
}

#[cfg(feature = "bzip2-compression")]
pub fn new() -> Result<Box<dyn crate::compressor::Compressor>> {
    Ok(Box::new(imp::Bzip2Compressor))
}

#[cfg(not(feature = "bzip2-compression"))]
pub fn new() -> Result<Box<dyn crate::compressor::Compressor>> {
    Err(PcompressError::UnknownAlgorithm(
        "bzip2 (built without the bzip2-compression feature)".into(),
    ))
}
