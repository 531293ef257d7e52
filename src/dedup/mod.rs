//! Content-defined chunking and in-chunk deduplication (spec §4.4).
//!
//! A rolling Rabin fingerprint ([`rabin`]) splits a chunk into variable-size
//! blocks; a min-hash sketch ([`sketch`]) gives each block a similarity
//! signature; the per-chunk block index ([`index`]) finds exact and
//! near-duplicate blocks and emits either raw bytes, an exact-match
//! reference, or a bsdiff patch ([`bsdiff_adapter`]) against a similar
//! block. [`global`] extends the same reference mechanism across chunks.

pub mod bsdiff_adapter;
pub mod global;
pub mod index;
pub mod rabin;
pub mod sketch;
