//! CRC64 digest (`CKSUM_CRC64`, spec §6) — the default, fastest checksum.
//!
//! Grounded on the `crc` crate's const CRC catalog (used as the base
//! checksum layer the way `xxhash-rust` is used for LZ4 frame content
//! checksums in the donor crate's `xxhash.rs`). The exact polynomial of the
//! original pcompress C source is undocumented in spec.md; DESIGN.md records
//! the choice of CRC-64/XZ as the closest standard instance.

use crc::{Crc, CRC_64_XZ};

use super::Digest;

static CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_XZ);

pub struct Crc64Digest {
    digest: crc::Digest<'static, u64>,
}

impl Crc64Digest {
    pub fn new() -> Self {
        Crc64Digest {
            digest: CRC64.digest(),
        }
    }
}

impl Default for Crc64Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest for Crc64Digest {
    fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    fn finish(&mut self) -> Vec<u8> {
        // `crc::Digest` consumes `self` on finalize; swap in a fresh one so
        // `&mut self` stays valid for the caller's reinit-or-finish pattern.
        let finished = std::mem::replace(&mut self.digest, CRC64.digest());
        finished.finalize().to_be_bytes().to_vec()
    }

    fn reinit(&mut self) {
        self.digest = CRC64.digest();
    }

    fn boxed_clone(&self) -> Box<dyn Digest> {
        Box::new(Crc64Digest::new())
    }

    fn output_len(&self) -> usize {
        8
    }
}
