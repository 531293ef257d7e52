//! SHA-256 / SHA-512 digests (`CKSUM_SHA256`/`CKSUM_SHA512`, spec §6), backed
//! by the RustCrypto `sha2` crate.

use sha2::{Digest as _, Sha256, Sha512};

use super::Digest;

macro_rules! sha2_digest {
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
                sha2::Digest::update(&mut self.hasher, data);
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

sha2_digest!(Sha256Digest, Sha256, 32);
sha2_digest!(Sha512Digest, Sha512, 64);
