//! XSalsa20 stream cipher back-end (spec §4.7).
//!
//! The stored base nonce is the full 24-byte XSalsa20 nonce with its last
//! 8 bytes reserved for the chunk id; `transform` XORs those 8 bytes with
//! `chunk_id` per chunk ("`(base_nonce, chunk_id)` concatenation", spec
//! §4.7), giving every chunk a distinct nonce under a single derived key.

use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::XSalsa20;
use zeroize::Zeroize;

use super::{Cipher, CipherAlg, CipherMode};
use crate::error::{PcompressError, Result};

pub struct XSalsa20Cipher {
    key: [u8; 32],
    base_nonce: [u8; 24],
    #[allow(dead_code)]
    mode: CipherMode,
}

impl XSalsa20Cipher {
    pub fn new(mode: CipherMode, key: &[u8], nonce: Vec<u8>) -> Result<Self> {
        let key: [u8; 32] = key
            .try_into()
            .map_err(|_| PcompressError::CipherInit("XSalsa20 key must be 32 bytes".into()))?;
        let base_nonce: [u8; 24] = nonce
            .as_slice()
            .try_into()
            .map_err(|_| PcompressError::CipherInit("XSalsa20 nonce must be 24 bytes".into()))?;
        Ok(XSalsa20Cipher {
            key,
            base_nonce,
            mode,
        })
    }

    fn chunk_nonce(&self, chunk_id: u64) -> [u8; 24] {
        let mut nonce = self.base_nonce;
        let tail = u64::from_be_bytes(nonce[16..24].try_into().unwrap()) ^ chunk_id;
        nonce[16..24].copy_from_slice(&tail.to_be_bytes());
        nonce
    }
}

impl Cipher for XSalsa20Cipher {
    fn transform(&mut self, data: &mut [u8], chunk_id: u64) {
        let nonce = self.chunk_nonce(chunk_id);
        let mut cipher = XSalsa20::new(&self.key.into(), &nonce.into());
        cipher.apply_keystream(data);
    }

    fn nonce(&self) -> &[u8] {
        &self.base_nonce
    }

    fn wipe_key(&mut self) {
        self.key.zeroize();
    }

    fn alg(&self) -> CipherAlg {
        CipherAlg::Salsa20
    }
}
