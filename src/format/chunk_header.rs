//! Per-chunk frame header (spec §3 "ChunkFlags", §6 "Per-chunk frame").
//!
//! A chunk frame on the wire is:
//! ```text
//! 8 B   compressed payload length L (big-endian)
//! cksum_bytes B   digest of original bytes (0 bytes when encrypting)
//! mac_bytes B     HMAC (encryption) or CRC32 of header (otherwise)
//! 1 B             ChunkFlags
//! L B             payload
//! 8 B             (only if ChunkFlags bit 7) original uncompressed size
//! ```
//! [`ChunkHeader`] covers everything up to and including the flags byte;
//! the payload and optional trailing size are handled by the caller
//! ([`crate::pipeline::worker`]) since they aren't fixed-size header fields.

use crate::error::{PcompressError, Result};

/// `L == 0`: end of stream (spec §4.1 "Termination").
pub const END_OF_STREAM: u64 = 0;

bitflags::bitflags! {
    /// One byte at the start of each compressed chunk payload (spec §3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChunkFlags: u8 {
        /// bit 0: 0 = raw, 1 = algorithm-compressed.
        const COMPRESSED      = 0b0000_0001;
        /// bit 1: preprocessed (preprocessor header follows).
        const PREPROCESSED    = 0b0000_0010;
        /// bit 2: deduplicated (dedup block-index follows).
        const DEDUPED         = 0b0000_0100;
        /// bits 3-6: adaptive sub-algorithm id (0 if not adaptive).
        const ADAPTIVE_MASK   = 0b0111_1000;
        /// bit 7: variable-size chunk (trailing 8-byte original size present).
        const VARIABLE_SIZE   = 0b1000_0000;
    }
}

impl ChunkFlags {
    /// Packs a 4-bit adaptive sub-algorithm id into bits 3-6.
    pub fn with_adaptive_id(mut self, id: u8) -> Self {
        self.remove(ChunkFlags::ADAPTIVE_MASK);
        self |= ChunkFlags::from_bits_truncate((id << 3) & ChunkFlags::ADAPTIVE_MASK.bits());
        self
    }

    /// Unpacks the adaptive sub-algorithm id from bits 3-6.
    pub fn adaptive_id(self) -> u8 {
        (self.bits() & ChunkFlags::ADAPTIVE_MASK.bits()) >> 3
    }
}

/// Fixed-size prefix of a chunk frame, excluding payload and trailing size.
#[derive(Debug, Clone)]
pub struct ChunkHeader {
    /// Compressed payload length `L`. `0` is the end-of-stream sentinel;
    /// [`crate::config::METADATA_INDICATOR`] marks a metadata-stream chunk
    /// (spec §4.8); any other value is validated against `chunksize` by
    /// [`ChunkHeader::validate_length`].
    pub length: u64,
    /// Digest of the original uncompressed bytes. Empty when a cipher is
    /// active (spec §3: "the stored digest... is computed over the
    /// original uncompressed bytes (digest) or over the framed compressed
    /// chunk (HMAC)").
    pub digest: Vec<u8>,
    /// HMAC (encryption active) or CRC32-of-header (otherwise, spec §4.7
    /// "Non-encrypting mode").
    pub mac_or_crc: Vec<u8>,
    pub flags: ChunkFlags,
}

impl ChunkHeader {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.digest.len() + self.mac_or_crc.len() + 1);
        out.extend_from_slice(&self.length.to_be_bytes());
        out.extend_from_slice(&self.digest);
        out.extend_from_slice(&self.mac_or_crc);
        out.push(self.flags.bits());
        out
    }

    /// Decodes a header assuming `digest_len` and `mac_len` are already
    /// known (from the file header's cksum/cipher configuration).
    pub fn decode(bytes: &[u8], digest_len: usize, mac_len: usize) -> Result<(Self, usize)> {
        let fixed_len = 8 + digest_len + mac_len + 1;
        if bytes.len() < fixed_len {
            return Err(PcompressError::FrameParse(
                "truncated chunk header".into(),
            ));
        }
        let length = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        let mut cursor = 8;
        let digest = bytes[cursor..cursor + digest_len].to_vec();
        cursor += digest_len;
        let mac_or_crc = bytes[cursor..cursor + mac_len].to_vec();
        cursor += mac_len;
        let flags = ChunkFlags::from_bits_truncate(bytes[cursor]);
        cursor += 1;
        Ok((
            ChunkHeader {
                length,
                digest,
                mac_or_crc,
                flags,
            },
            cursor,
        ))
    }

    /// Rejects impossible lengths (spec §6: "value > chunksize+256 =>
    /// corruption -> fatal"). `END_OF_STREAM` and
    /// [`crate::config::METADATA_INDICATOR`] are always accepted.
    pub fn validate_length(length: u64, chunksize: u64) -> Result<()> {
        if length == END_OF_STREAM || length == crate::config::METADATA_INDICATOR {
            return Ok(());
        }
        if length > chunksize + 256 {
            return Err(PcompressError::FrameParse(format!(
                "chunk length {length} exceeds chunksize+256 ({})",
                chunksize + 256
            )));
        }
        Ok(())
    }
}

bitflags::bitflags! {
    /// Preprocessor header flags byte (spec §3 "Preprocessor header"):
    /// `1 B flags + 8 B post-preprocess length`. Bit assignment follows
    /// spec exactly; bits 6-7 (packjpg/wavpack lossless) are recognized on
    /// the wire but never set by this port (spec §1 Non-goals: lossy
    /// filters excluded).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PreprocessFlags: u8 {
        const COMPRESSED      = 0b0000_0001;
        const DELTA2          = 0b0000_0010;
        const LZP             = 0b0000_0100;
        const DICT            = 0b0000_1000;
        const DISPACK         = 0b0001_0000;
        const E8E9            = 0b0010_0000;
        const PACKJPG_LOSSLESS = 0b0100_0000;
        const WAVPACK_LOSSLESS = 0b1000_0000;
    }
}

/// 9-byte preprocessor header (spec §3): `1 B flags` + `8 B` post-preprocess
/// length (little-endian, per spec: "where multi-byte" fields in this
/// struct are little-endian, unlike the rest of the file format).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessHeader {
    pub flags: PreprocessFlags,
    pub post_length: u64,
}

impl PreprocessHeader {
    pub const ENCODED_LEN: usize = 9;

    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[0] = self.flags.bits();
        out[1..9].copy_from_slice(&self.post_length.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < Self::ENCODED_LEN {
            return Err(PcompressError::FrameParse(
                "truncated preprocessor header".into(),
            ));
        }
        let flags = PreprocessFlags::from_bits_truncate(bytes[0]);
        let post_length = u64::from_le_bytes(bytes[1..9].try_into().unwrap());
        Ok((PreprocessHeader { flags, post_length }, Self::ENCODED_LEN))
    }

    /// Maps a committed [`crate::preprocess::FilterId`] to its wire bit.
    pub fn bit_for(id: crate::preprocess::FilterId) -> PreprocessFlags {
        use crate::preprocess::FilterId;
        match id {
            FilterId::Dispack => PreprocessFlags::DISPACK,
            FilterId::E8E9 => PreprocessFlags::E8E9,
            FilterId::Dict => PreprocessFlags::DICT,
            FilterId::Lzp => PreprocessFlags::LZP,
            FilterId::Delta2 => PreprocessFlags::DELTA2,
        }
    }
}
