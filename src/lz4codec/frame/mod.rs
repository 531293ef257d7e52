//! LZ4 Frame format — streaming compression and decompression.
//!
//! Corresponds to lz4frame.c / lz4frame.h / lz4frame_static.h from LZ4 v1.10.0.

pub mod cdict;
pub mod compress;
pub mod decompress;
pub mod header;
pub mod types;

// Re-export key public API items at the module level.
pub use cdict::Lz4FCDict;
pub use compress::{
    lz4f_compress_begin, lz4f_compress_bound, lz4f_compress_end, lz4f_compress_frame,
    lz4f_compress_frame_using_cdict, lz4f_compress_update, lz4f_create_compression_context,
    lz4f_flush, lz4f_free_compression_context, lz4f_uncompressed_update, CompressOptions,
};
pub use header::lz4f_compress_frame_bound;
pub use decompress::{
    lz4f_create_decompression_context, lz4f_decompress, lz4f_decompress_using_dict,
    lz4f_free_decompression_context, lz4f_get_frame_info, lz4f_header_size,
    lz4f_reset_decompression_context, DecompressOptions, Lz4FDCtx,
};
pub use types::{
    BlockChecksum, BlockMode, BlockSizeId, ContentChecksum, FrameInfo, FrameType, Lz4FCCtx,
    Lz4FError, Preferences,
};

/// Compress `src` as a complete one-shot LZ4 frame into a freshly-sized
/// `Vec`. Returns an empty `Vec` on internal compression failure (mirrors
/// `block::compress_block_to_vec`'s allocate-bound-then-truncate shape).
pub fn compress_frame_to_vec(src: &[u8]) -> Vec<u8> {
    let bound = lz4f_compress_frame_bound(src.len(), None);
    let mut dst = vec![0u8; bound];
    match lz4f_compress_frame(&mut dst, src, None) {
        Ok(written) => {
            dst.truncate(written);
            dst
        }
        Err(_) => Vec::new(),
    }
}

/// Decompress a complete LZ4 frame, driving the streaming decompression
/// context to completion and accumulating output into a `Vec`.
pub fn decompress_frame_to_vec(src: &[u8]) -> Result<Vec<u8>, Lz4FError> {
    let mut dctx = lz4f_create_decompression_context(types::LZ4F_VERSION)?;
    let mut out = Vec::new();
    let mut scratch = vec![0u8; 64 * 1024];
    let mut pos = 0usize;
    loop {
        if pos >= src.len() {
            break;
        }
        let (consumed, written, hint) =
            lz4f_decompress(&mut dctx, Some(&mut scratch), &src[pos..], None)?;
        out.extend_from_slice(&scratch[..written]);
        pos += consumed;
        if hint == 0 {
            break;
        }
        if consumed == 0 && written == 0 {
            // No progress possible with the remaining input — stop rather
            // than loop forever on a truncated frame.
            break;
        }
    }
    lz4f_free_decompression_context(dctx);
    Ok(out)
}
