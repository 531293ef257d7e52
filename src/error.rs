//! Core error taxonomy (spec §7).
//!
//! Mirrors the donor crate's hand-rolled `Lz4FError`/`Lz4HcError` style
//! (`Display` + `std::error::Error` impls, no `thiserror` macro) rather than
//! the CLI layer's `anyhow`, since these errors cross the worker/reader/writer
//! boundary and callers need to match on variants (e.g. to decide whether a
//! partially-written output file must be unlinked).

use std::fmt;

/// A single error value covering every fatal/local/soft condition named in
/// spec §7. Recoverable ("local, retried") conditions are handled internally
/// by the component that can retry (see [`crate::util::securerng::SecureRng`])
/// and never surface as a `PcompressError`; only conditions that abort the
/// current operation reach this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PcompressError {
    /// Scratch/slab/index allocation failed.
    Allocation(String),
    /// The underlying writer returned a short write or an I/O error.
    Io(String),
    /// HMAC verification failed while decrypting a chunk or the file header.
    MacMismatch { chunk_id: Option<u64> },
    /// File header CRC32 (unencrypted mode) did not match.
    HeaderCrcMismatch,
    /// A chunk's stored digest did not match the decompressed bytes.
    DigestMismatch { chunk_id: u64 },
    /// The frame could not be parsed: impossible length, impossible flags,
    /// or a chunk truncated before its declared payload length.
    FrameParse(String),
    /// The algorithm-specific back-end reported an unrecoverable condition.
    Compressor(String),
    /// Cipher context initialization failed (bad key length, RNG exhausted).
    CipherInit(String),
    /// Decompressing a file written by an unknown or newer algorithm id.
    UnknownAlgorithm(String),
    /// Soft: the CLI's target output file already exists (compress mode).
    TargetExists(String),
    /// Soft: an archive-extract target path exists and is not a directory.
    NotADirectory(String),
    /// Soft: the supplied password did not match (detected before any output).
    PasswordMismatch,
    /// The run was cancelled cooperatively (`main_cancel`, spec §5).
    Cancelled,
}

impl PcompressError {
    /// `true` for the "Fatal, abort run" taxonomy of spec §7: the orchestrator
    /// must latch `main_cancel`, drain workers, and unlink partial output.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PcompressError::TargetExists(_)
                | PcompressError::NotADirectory(_)
                | PcompressError::PasswordMismatch
        )
    }

    /// Process exit code convention used by `main.rs`: 0 only on success,
    /// every error variant (fatal or soft) maps to a non-zero code.
    pub fn exit_code(&self) -> i32 {
        match self {
            PcompressError::TargetExists(_) => 2,
            PcompressError::NotADirectory(_) => 3,
            PcompressError::PasswordMismatch => 4,
            PcompressError::MacMismatch { .. } | PcompressError::DigestMismatch { .. } => 5,
            PcompressError::Cancelled => 130,
            _ => 1,
        }
    }
}

impl fmt::Display for PcompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PcompressError::Allocation(msg) => write!(f, "allocation failed: {msg}"),
            PcompressError::Io(msg) => write!(f, "i/o error: {msg}"),
            PcompressError::MacMismatch { chunk_id: Some(id) } => {
                write!(f, "MAC verification failed on chunk {id}")
            }
            PcompressError::MacMismatch { chunk_id: None } => {
                write!(f, "MAC verification failed on file header")
            }
            PcompressError::HeaderCrcMismatch => write!(f, "file header CRC32 mismatch"),
            PcompressError::DigestMismatch { chunk_id } => {
                write!(f, "digest mismatch on chunk {chunk_id}")
            }
            PcompressError::FrameParse(msg) => write!(f, "frame parse error: {msg}"),
            PcompressError::Compressor(msg) => write!(f, "compressor error: {msg}"),
            PcompressError::CipherInit(msg) => write!(f, "cipher init failed: {msg}"),
            PcompressError::UnknownAlgorithm(name) => {
                write!(f, "unknown or unsupported algorithm: {name}")
            }
            PcompressError::TargetExists(path) => write!(f, "target file exists: {path}"),
            PcompressError::NotADirectory(path) => write!(f, "not a directory: {path}"),
            PcompressError::PasswordMismatch => write!(f, "password mismatch"),
            PcompressError::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl std::error::Error for PcompressError {}

impl From<std::io::Error> for PcompressError {
    fn from(e: std::io::Error) -> Self {
        PcompressError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PcompressError>;
