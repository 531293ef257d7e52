//! `SecureRng` — encapsulates the `/dev/urandom`-with-retry-then-hash-mix
//! policy of spec §4.7/§7/§9 ("Shared `/dev/urandom` handling... do not expose
//! the raw fd").
//!
//! The donor crate has no cryptographic RNG (LZ4 needs none); this is modeled
//! on `arx-core`'s use of `getrandom` as the portable OS-entropy source
//! (`examples/Marcus0086-arx/arx-core/src/crypto/aead.rs` derives nonces from
//! `getrandom` + `blake3`), generalized here to follow spec's own retry and
//! fallback rules instead of arx's nonce-derivation scheme.

use std::time::{SystemTime, UNIX_EPOCH};

use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;

use crate::config::{URANDOM_RETRY_COUNT, URANDOM_RETRY_DELAY_SECS};

/// Fills `out` with cryptographically strong random bytes.
///
/// Spec §7 "Local, retried": `/dev/urandom` open is retried up to 10 times,
/// 1 s apart; if still failing, falls back to a Skein/BLAKE2 mix over
/// `{clock_monotonic, rand(), pid, rand()}` (spec §4.7). We use BLAKE2b as the
/// mixing hash (Skein has no maintained RustCrypto-ecosystem crate; see
/// DESIGN.md) and a free-running counter in place of a second OS `rand()`
/// call, since the fallback path exists precisely because OS entropy is
/// unavailable.
pub fn fill(out: &mut [u8]) {
    let mut attempts = 0;
    loop {
        match getrandom::getrandom(out) {
            Ok(()) => return,
            Err(_) if attempts < URANDOM_RETRY_COUNT => {
                attempts += 1;
                std::thread::sleep(std::time::Duration::from_secs(URANDOM_RETRY_DELAY_SECS));
            }
            Err(_) => {
                fallback_fill(out);
                return;
            }
        }
    }
}

/// Mix entropy-poor but unpredictable-enough process state into `out` when
/// the OS RNG is completely unavailable. Not used in the ordinary case; only
/// reached after `URANDOM_RETRY_COUNT` failed `getrandom` calls.
fn fallback_fill(out: &mut [u8]) {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let monotonic = std::time::Instant::now().elapsed().as_nanos() as u64;
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let pid = std::process::id() as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut offset = 0;
    let mut round: u64 = 0;
    while offset < out.len() {
        let mut hasher = Blake2bVar::new(64).expect("blake2b supports 64-byte output");
        hasher.update(&monotonic.to_le_bytes());
        hasher.update(&wall.to_le_bytes());
        hasher.update(&pid.to_le_bytes());
        hasher.update(&counter.to_le_bytes());
        hasher.update(&round.to_le_bytes());
        let mut digest = [0u8; 64];
        hasher.finalize_variable(&mut digest).expect("64-byte buffer");
        let take = (out.len() - offset).min(digest.len());
        out[offset..offset + take].copy_from_slice(&digest[..take]);
        offset += take;
        round += 1;
    }
}

/// Convenience: allocate and fill a `len`-byte random vector.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut v = vec![0u8; len];
    fill(&mut v);
    v
}
