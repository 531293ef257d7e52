//! Chunked, parallel compress/decompress pipeline (spec §4.1-§4.4, §5).
//!
//! [`session`] holds the read-only configuration shared by every thread,
//! [`worker`] implements the per-chunk transform, [`reader`]/[`writer`] are
//! the single-threaded ends of the pipe, [`scheduler`] wires them together
//! with channels, and [`stats`] accumulates run-wide counters.

pub mod reader;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod worker;
pub mod writer;

pub use scheduler::{auto_worker_count, build_file_header, compress_file, decompress_file};
pub use session::{CipherConfig, DedupConfig, GlobalDedupMode, PipelineConfig};
pub use stats::Stats;
