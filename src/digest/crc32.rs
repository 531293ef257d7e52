//! CRC32 — used for the file header integrity field (no-encryption mode) and
//! as the chunk-header tamper check when no cipher is configured (spec §4.7
//! "Non-encrypting mode... a CRC32 of the chunk header").
//!
//! This is a plain function, not a [`super::Digest`] impl: it is never chosen
//! via `-S` (it isn't in the CKSUM table), only used internally by
//! `crate::format`.

use crc::{Crc, CRC_32_ISO_HDLC};

static CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

pub fn crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}
