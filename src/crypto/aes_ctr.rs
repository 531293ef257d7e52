//! AES-CTR stream cipher back-end (spec §4.7).
//!
//! Per-chunk IV: `chunk_iv = base_nonce XOR chunk_id` (8-byte nonce, spec
//! §4.7), used directly as the 128-bit CTR initial counter block (zero
//! extended on the left) via the RustCrypto `aes` + `ctr` crates.

use aes::cipher::{KeyIvInit, StreamCipher};
use aes::{Aes128, Aes256};
use ctr::Ctr128BE;
use zeroize::Zeroize;

use super::{Cipher, CipherAlg, CipherMode};
use crate::error::{PcompressError, Result};

type Aes128Ctr = Ctr128BE<Aes128>;
type Aes256Ctr = Ctr128BE<Aes256>;

enum KeySize {
    Bits128([u8; 16]),
    Bits256([u8; 32]),
}

pub struct AesCtrCipher {
    key: KeySize,
    base_nonce: [u8; 8],
    #[allow(dead_code)]
    mode: CipherMode,
}

impl AesCtrCipher {
    pub fn new(mode: CipherMode, key: &[u8], nonce: Vec<u8>) -> Result<Self> {
        let base_nonce: [u8; 8] = nonce
            .as_slice()
            .try_into()
            .map_err(|_| PcompressError::CipherInit("AES-CTR nonce must be 8 bytes".into()))?;
        let key = match key.len() {
            16 => KeySize::Bits128(key.try_into().unwrap()),
            32 => KeySize::Bits256(key.try_into().unwrap()),
            n => {
                return Err(PcompressError::CipherInit(format!(
                    "AES key must be 16 or 32 bytes, got {n}"
                )))
            }
        };
        Ok(AesCtrCipher {
            key,
            base_nonce,
            mode,
        })
    }

    /// 16-byte CTR initial counter block: the 8-byte chunk IV left-padded
    /// with zeros into the high bytes of the 128-bit counter.
    fn counter_block(&self, chunk_id: u64) -> [u8; 16] {
        let chunk_iv = u64::from_be_bytes(self.base_nonce) ^ chunk_id;
        let mut block = [0u8; 16];
        block[8..].copy_from_slice(&chunk_iv.to_be_bytes());
        block
    }
}

impl Cipher for AesCtrCipher {
    fn transform(&mut self, data: &mut [u8], chunk_id: u64) {
        let iv = self.counter_block(chunk_id);
        match &self.key {
            KeySize::Bits128(k) => {
                let mut cipher = Aes128Ctr::new(k.into(), &iv.into());
                cipher.apply_keystream(data);
            }
            KeySize::Bits256(k) => {
                let mut cipher = Aes256Ctr::new(k.into(), &iv.into());
                cipher.apply_keystream(data);
            }
        }
    }

    fn nonce(&self) -> &[u8] {
        &self.base_nonce
    }

    fn wipe_key(&mut self) {
        match &mut self.key {
            KeySize::Bits128(k) => k.zeroize(),
            KeySize::Bits256(k) => k.zeroize(),
        }
    }

    fn alg(&self) -> CipherAlg {
        CipherAlg::Aes
    }
}
