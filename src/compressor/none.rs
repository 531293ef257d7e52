//! `none` back-end: stores chunks raw. Used directly via `-c none` and as
//! the fallback every other back-end's caller takes when `compress` returns
//! `Ok(None)` (spec §4.6 "Negative return ... use raw").

use super::{AlgoProps, Compressor};
use crate::error::Result;

pub struct NoneCompressor;

impl Compressor for NoneCompressor {
    fn compress(&mut self, _src: &[u8], _level: u32) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn decompress(&mut self, src: &[u8], original_len: usize) -> Result<Vec<u8>> {
        debug_assert_eq!(src.len(), original_len);
        Ok(src.to_vec())
    }

    fn props(&self, _chunksize: usize) -> AlgoProps {
        AlgoProps {
            compress_bound_extra: 0,
            level_sensitive: false,
            supports_inner_threads: false,
        }
    }
}
