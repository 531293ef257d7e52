//! PBKDF2 key derivation (spec §4.7: "A PBKDF-2 derives a 256-bit (default)
//! or 128-bit key from the user password plus salt").

use hmac::Hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::config::PBKDF2_ITERATIONS;
use crate::error::{PcompressError, Result};

/// Derives a `key_len`-byte key (16 or 32, spec §6 `-k`) from `password` and
/// `salt` using PBKDF2-HMAC-SHA256 with [`PBKDF2_ITERATIONS`] rounds.
pub fn derive_key(password: &[u8], salt: &[u8], key_len: usize) -> Result<Vec<u8>> {
    if key_len != 16 && key_len != 32 {
        return Err(PcompressError::CipherInit(format!(
            "unsupported key length {key_len} (expected 16 or 32)"
        )));
    }
    let mut key = vec![0u8; key_len];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, PBKDF2_ITERATIONS, &mut key)
        .map_err(|e| PcompressError::CipherInit(format!("pbkdf2 failed: {e}")))?;
    Ok(key)
}

/// Wraps a key buffer so it is zeroed when dropped, per spec §4.7 "The core
/// never persists the plaintext key; once encryption begins the key buffer
/// is scrubbed."
pub struct ScrubbedKey(pub Vec<u8>);

impl Drop for ScrubbedKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
