//! Cipher abstraction (spec §4.1 component 2, §4.7).
//!
//! Same reshape as [`crate::digest`]: a trait in place of the original's
//! void-pointer `crypto_ctx` (spec §9), one module per concrete algorithm.
//! Per-chunk IV derivation (`chunk_iv = base_nonce XOR chunk_id` for AES-CTR,
//! `(base_nonce, chunk_id)` concatenation for XSalsa20) lives in
//! [`Cipher::transform`], matching spec §4.7 exactly.

pub mod aes_ctr;
pub mod kdf;
pub mod mac;
pub mod xsalsa20;

use crate::error::{PcompressError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherAlg {
    Aes,
    Salsa20,
}

impl CipherAlg {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "AES" => Some(CipherAlg::Aes),
            "SALSA20" => Some(CipherAlg::Salsa20),
            _ => None,
        }
    }

    /// Base-nonce length before per-chunk derivation (spec §4.7: "8-byte or
    /// 24-byte nonce"; for XSalsa20 8 bytes of that 24 are reserved for the
    /// chunk id appended at transform time).
    pub fn base_nonce_len(self) -> usize {
        match self {
            CipherAlg::Aes => 8,
            CipherAlg::Salsa20 => 16,
        }
    }

    /// Full on-wire nonce length stored in the file header (spec §6).
    pub fn wire_nonce_len(self) -> usize {
        match self {
            CipherAlg::Aes => 8,
            CipherAlg::Salsa20 => 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    Encrypt,
    Decrypt,
}

/// Uniform cipher interface (spec §4.1 component 2).
///
/// `init` is represented by each backend's constructor (`AesCtrCipher::new`,
/// `XSalsa20Cipher::new`) taking `(mode, key, salt, nonce)`, since Rust
/// constructors already express "build a ready-to-use value" more directly
/// than a separate `init` method on an uninitialized struct.
pub trait Cipher: Send {
    /// Encrypts or decrypts `data` in place using the per-chunk IV derived
    /// from `chunk_id` (spec §4.7 "Per-chunk IV"). Both AES-CTR and XSalsa20
    /// are stream ciphers, so encrypt and decrypt are the same transform.
    fn transform(&mut self, data: &mut [u8], chunk_id: u64);

    /// The base nonce generated (or supplied) at `init` time, before
    /// per-chunk derivation. Stored verbatim in the file header.
    fn nonce(&self) -> &[u8];

    /// Scrubs this cipher's copy of the key material from memory. Called on
    /// drop and explicitly once a run completes; the caller is responsible
    /// for also scrubbing the original password/derived-key buffer (see
    /// `cli::init`) once every worker's cipher has been constructed from it.
    fn wipe_key(&mut self);

    fn alg(&self) -> CipherAlg;
}

/// Construct a ready cipher for `alg`, deriving the key via PBKDF2 from
/// `password` and `salt` (spec §4.7 "A PBKDF-2 derives a ... key from the
/// user password plus salt").
pub fn new_cipher(
    alg: CipherAlg,
    mode: CipherMode,
    password: &[u8],
    salt: &[u8],
    key_len: usize,
    nonce: Vec<u8>,
) -> Result<Box<dyn Cipher>> {
    if nonce.len() != alg.wire_nonce_len() {
        return Err(PcompressError::CipherInit(format!(
            "{alg:?} expects a {}-byte nonce, got {}",
            alg.wire_nonce_len(),
            nonce.len()
        )));
    }
    let key = kdf::derive_key(password, salt, key_len)?;
    match alg {
        CipherAlg::Aes => Ok(Box::new(aes_ctr::AesCtrCipher::new(mode, &key, nonce)?)),
        CipherAlg::Salsa20 => Ok(Box::new(xsalsa20::XSalsa20Cipher::new(mode, &key, nonce)?)),
    }
}
