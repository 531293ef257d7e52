//! BLAKE2 digests (`CKSUM_BLAKE256`/`CKSUM_BLAKE512`, spec §6), backed by the
//! `blake2` crate — the same crate `oll3-bita` uses for its chunk hashing
//! (`examples/oll3-bita/bitar/src/hashsum.rs`). We use `Blake2s256` (32-byte
//! output) for the "256" id and `Blake2b512` (64-byte output) for the "512"
//! id, matching the output widths spec §6 assigns to each id.

use blake2::{Blake2b512, Blake2s256, Digest as _};

use super::Digest;

macro_rules! blake2_digest {
    ($name:ident, $inner:ty, $len:expr) => {
        pub struct $name {
            hasher: $inner,
        }

        impl $name {
            pub fn new() -> Self {
                $name {
                    hasher: <$inner>::new(),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Digest for $name {
            fn update(&mut self, data: &[u8]) {
                blake2::Digest::update(&mut self.hasher, data);
            }

            fn finish(&mut self) -> Vec<u8> {
                let finished = std::mem::replace(&mut self.hasher, <$inner>::new());
                finished.finalize().to_vec()
            }

            fn reinit(&mut self) {
                self.hasher = <$inner>::new();
            }

            fn boxed_clone(&self) -> Box<dyn Digest> {
                Box::new($name::new())
            }

            fn output_len(&self) -> usize {
                $len
            }
        }
    };
}

blake2_digest!(Blake2s256Digest, Blake2s256, 32);
blake2_digest!(Blake2b512Digest, Blake2b512, 64);
