//! Keccak-256 / Keccak-512 digests (`CKSUM_KECCAK256`/`CKSUM_KECCAK512`, spec
//! §6), backed by the RustCrypto `sha3` crate's `Keccak256`/`Keccak512` types
//! (note: these use the original Keccak padding, distinct from the crate's
//! `Sha3_256`/`Sha3_512` which use the NIST SHA-3 padding — pcompress's CLI
//! names this algorithm "Keccak", so the Keccak variant is the correct match).

use sha3::{Digest as _, Keccak256, Keccak512};

use super::Digest;

macro_rules! keccak_digest {
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
                sha3::Digest::update(&mut self.hasher, data);
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

keccak_digest!(Keccak256Digest, Keccak256, 32);
keccak_digest!(Keccak512Digest, Keccak512, 64);
