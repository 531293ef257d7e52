//! `zlib` back-end via the `flate2` crate (spec §4.6). `level` (0-14, spec
//! §6 `-l`) is rescaled into zlib's native 0-9 range.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use super::{AlgoProps, Compressor};
use crate::config::LEVEL_MAX;
use crate::error::{PcompressError, Result};

pub struct ZlibCompressor;

impl ZlibCompressor {
    pub fn new() -> Self {
        ZlibCompressor
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self::new()
    }
}

fn rescale_level(level: u32) -> u32 {
    ((level.min(LEVEL_MAX) as u64 * 9) / LEVEL_MAX as u64) as u32
}

impl Compressor for ZlibCompressor {
    fn compress(&mut self, src: &[u8], level: u32) -> Result<Option<Vec<u8>>> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(src.len()), Compression::new(rescale_level(level)));
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
        let mut decoder = ZlibDecoder::new(src);
        let mut out = Vec::with_capacity(original_len);
        decoder
            .read_to_end(&mut out)
            .map_err(|e| PcompressError::Compressor(e.to_string()))?;
        Ok(out)
    }

    fn props(&self, chunksize: usize) -> AlgoProps {
        AlgoProps {
            compress_bound_extra: chunksize / 1000 + 128,
            level_sensitive: true,
            supports_inner_threads: false,
        }
    }
}
