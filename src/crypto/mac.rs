//! HMAC authenticator (spec §4.7): replaces the plain digest whenever a
//! cipher is configured. Computed over `{length || chunk header with zeroed
//! MAC field || payload || trailing original-size if present}` for chunks,
//! and over the whole file header (minus the field itself) for the file
//! header HMAC.
//!
//! Spec §4.7 allows the native keyed modes of BLAKE2/Keccak/Skein as
//! alternatives to a generic HMAC; this port always uses HMAC-SHA256
//! regardless of the configured `-S` digest, which is a strict subset of the
//! spec's allowed behavior (HMAC is explicitly permitted) and keeps exactly
//! one MAC code path to verify — recorded as an Open Question resolution in
//! DESIGN.md.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{PcompressError, Result};

pub const MAC_LEN: usize = 32;

pub fn hmac(key: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().to_vec()
}

/// Verifies `expected` against the HMAC of `parts` under `key` in constant
/// time (via `hmac::Mac::verify_slice`), returning a typed error on mismatch
/// so callers can distinguish a chunk MAC failure from a header one.
pub fn verify(key: &[u8], parts: &[&[u8]], expected: &[u8], chunk_id: Option<u64>) -> Result<()> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
    for part in parts {
        mac.update(part);
    }
    mac.verify_slice(expected)
        .map_err(|_| PcompressError::MacMismatch { chunk_id })
}
