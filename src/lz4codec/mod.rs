//! Self-contained LZ4 block/frame/HC codec, carried over unmodified from the
//! donor LZ4 port. This is the engine behind the `lz4` [`crate::compressor`]
//! back-end (§4.6): the pipeline never speaks LZ4 frame format itself, it only
//! calls [`block::compress_default`] / [`block::decompress_safe`] per chunk and
//! frames the result with its own [`crate::format`] headers.
//!
//! Kept as its own namespace (rather than flattened into `compressor::lz4`) so
//! the full LZ4 frame/HC API stays available for anyone embedding this crate
//! as a library, exactly as the donor crate exposed it.

pub mod block;
pub mod frame;
pub mod hc;
pub mod xxhash;

// Convenience re-exports mirroring the donor crate's crate-root surface, kept
// here rather than at the pcompress crate root (the pipeline never calls
// these directly; they exist for anyone embedding `lz4codec` as a standalone
// block/frame codec).
pub use block::compress::compress_default as lz4_compress_default;
pub use block::decompress_api::decompress_safe as lz4_decompress_safe;
pub use frame::compress::lz4f_compress_frame;
pub use frame::decompress::lz4f_decompress;

pub use block::compress::Lz4Error;
pub use block::decompress_api::BlockDecompressError as DecompressError;
pub use block::compress::LZ4_MAX_INPUT_SIZE;
pub use block::compress::LZ4_ACCELERATION_DEFAULT;
pub use block::compress::LZ4_ACCELERATION_MAX;
pub use block::compress::compress_bound;
pub use block::compress::compress_fast;
pub use block::compress::compress_fast_ext_state;
pub use block::compress::compress_fast_ext_state_fast_reset;
pub use block::compress::compress_dest_size;
pub use block::compress::compress_dest_size_ext_state;
pub use block::decompress_api::decompress_safe_partial;
pub use block::decompress_api::decompress_safe_using_dict;
pub use block::decompress_api::decompress_safe_partial_using_dict;

pub use block::stream::Lz4Stream;
pub use block::decompress_api::{
    decoder_ring_buffer_size, decompress_safe_continue, set_stream_decode, Lz4StreamDecode,
};

/// LZ4 block/frame codec version, mirroring the donor crate's own version
/// constants (kept for anyone embedding this codec as a standalone library).
pub const LZ4_VERSION_MAJOR: i32 = 1;
pub const LZ4_VERSION_MINOR: i32 = 10;
pub const LZ4_VERSION_RELEASE: i32 = 0;
pub const LZ4_VERSION_NUMBER: i32 =
    LZ4_VERSION_MAJOR * 100 * 100 + LZ4_VERSION_MINOR * 100 + LZ4_VERSION_RELEASE;
pub const LZ4_VERSION_STRING: &str = "1.10.0";

pub fn version_number() -> i32 {
    LZ4_VERSION_NUMBER
}

pub fn version_string() -> &'static str {
    LZ4_VERSION_STRING
}

#[inline]
pub const fn decompress_inplace_margin(compressed_size: usize) -> usize {
    (compressed_size >> 8) + 32
}

#[inline]
pub const fn decompress_inplace_buffer_size(decompressed_size: usize) -> usize {
    decompressed_size + decompress_inplace_margin(decompressed_size)
}

pub const LZ4_DISTANCE_MAX: usize = 65535;
pub const LZ4_COMPRESS_INPLACE_MARGIN: usize = LZ4_DISTANCE_MAX + 32;
pub const COMPRESS_INPLACE_MARGIN: usize = LZ4_COMPRESS_INPLACE_MARGIN;

#[inline]
pub const fn compress_inplace_buffer_size(max_compressed_size: usize) -> usize {
    max_compressed_size + LZ4_COMPRESS_INPLACE_MARGIN
}
