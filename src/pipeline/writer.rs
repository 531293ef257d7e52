//! Output-side half of the pipeline (spec §4.1 "writer loop").
//!
//! The writer is the only thread that touches the output file, so it is
//! also the only place that can resolve a whole-chunk global-dedup
//! reference against bytes already committed to disk (spec §4.4: "the
//! decompressor either finds the referenced bytes still in the
//! current-segment RAM or mmap-reads the existing output file").

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

use crossbeam_channel::Receiver;

use crate::dedup::global::GlobalRef;
use crate::error::Result;
use crate::format::chunk_header::END_OF_STREAM;

use super::worker::ChunkOutcome;

/// Drains `result_rx` round-robin (worker `0, 1, ..., N-1, 0, ...`) and
/// writes each compressed frame to `out` in strict ascending chunk order
/// (spec §4.1 "Ordering protocol"), stopping at the first end-of-stream
/// frame (an exact 8-byte zero length field, spec §6).
pub fn write_compressed(out: &mut impl Write, result_rx: &[Receiver<Vec<u8>>]) -> Result<()> {
    let n = result_rx.len();
    let mut i = 0usize;
    loop {
        let frame = result_rx[i % n]
            .recv()
            .map_err(|_| crate::error::PcompressError::Io("worker result channel closed".into()))?;
        let is_eof = frame.len() == 8 && u64::from_be_bytes(frame[..8].try_into().unwrap()) == END_OF_STREAM;
        out.write_all(&frame)?;
        if is_eof {
            return Ok(());
        }
        i += 1;
    }
}

/// Same round-robin draining for decompression, additionally resolving
/// [`ChunkOutcome::GlobalRef`] by seeking the already-written portion of
/// `out` (spec §4.4 "Global dedup variant"). `out` must be opened for both
/// reading and writing.
pub fn write_decompressed(out: &mut File, result_rx: &[Receiver<ChunkOutcome>]) -> Result<u64> {
    let n = result_rx.len();
    let mut i = 0usize;
    let mut written: u64 = 0;
    loop {
        let outcome = result_rx[i % n]
            .recv()
            .map_err(|_| crate::error::PcompressError::Io("worker result channel closed".into()))?;
        match outcome {
            ChunkOutcome::Eof => return Ok(written),
            ChunkOutcome::Bytes(bytes) => {
                out.write_all(&bytes)?;
                written += bytes.len() as u64;
            }
            ChunkOutcome::GlobalRef(reference) => {
                let bytes = resolve_global_ref(out, reference)?;
                out.write_all(&bytes)?;
                written += bytes.len() as u64;
            }
        }
        i += 1;
    }
}

fn resolve_global_ref(out: &mut File, reference: GlobalRef) -> io::Result<Vec<u8>> {
    let current = out.stream_position()?;
    out.seek(SeekFrom::Start(reference.offset))?;
    let mut buf = vec![0u8; reference.len as usize];
    out.read_exact(&mut buf)?;
    out.seek(SeekFrom::Start(current))?;
    Ok(buf)
}
