//! Per-chunk compress/decompress pipeline (spec §4.2 "Worker: compress
//! path", §4.3 "Worker: decompress path").
//!
//! Each worker thread owns one [`WorkerState`] (its own compressor and
//! cipher instances — spec §4.1 "init") and repeatedly calls
//! [`compress_chunk`] or [`decompress_chunk`] as the scheduler hands it
//! jobs. Both functions are free of any threading concern themselves;
//! [`crate::pipeline::scheduler`] owns the channels and ordering.

use std::sync::Mutex;

use crate::compressor::Compressor;
use crate::crypto::Cipher;
use crate::dedup::global::{GlobalIndex, GlobalRef};
use crate::dedup::index::{self as dedup_index, Entry};
use crate::dedup::rabin::RabinChunker;
use crate::dedup::{bsdiff_adapter, sketch::{self, SimilarityMode}};
use crate::digest::digest_bytes;
use crate::error::{PcompressError, Result};
use crate::format::chunk_header::{ChunkFlags, ChunkHeader, PreprocessFlags, PreprocessHeader};
use crate::format::dedup_index as wire_dedup;
use crate::preprocess::{self, FilterId};

use super::session::PipelineConfig;

/// One unit of plaintext handed from the reader to a worker (spec §4.1).
pub struct ChunkJob {
    pub id: u64,
    pub raw: Vec<u8>,
    /// Offset of `raw[0]` in the original (uncompressed) stream. Global
    /// dedup references point into this plaintext domain rather than the
    /// compressed output file, since it is known the moment the reader
    /// hands out the chunk rather than only after the writer serializes it
    /// (see DESIGN.md "Global dedup offsets").
    pub plain_offset: u64,
    pub is_last: bool,
}

/// A chunk frame read back off the wire, with the fixed header already
/// parsed and the payload/trailing-size fields sliced out by the reader.
pub struct ParsedFrame {
    pub id: u64,
    pub header: ChunkHeader,
    pub payload: Vec<u8>,
    pub original_len: Option<u64>,
}

/// What a decompressed chunk resolves to: either its bytes, or (whole-chunk
/// global dedup only) a reference the writer must resolve against output
/// already on disk, since only the writer knows which earlier bytes have
/// actually been committed (spec §4.4 "the decompressor... mmap-reads the
/// existing output file").
pub enum ChunkOutcome {
    Bytes(Vec<u8>),
    GlobalRef(GlobalRef),
    /// The reader's end-of-stream sentinel, forwarded untouched so the
    /// writer can recognize it on whichever worker's result channel it is
    /// currently draining (spec §4.1 "Termination").
    Eof,
}

/// Per-worker mutable state built once at thread startup (`init`, spec
/// §4.1) and reused across every chunk the worker handles.
pub struct WorkerState {
    pub compressor: Box<dyn Compressor>,
    pub cipher: Option<Box<dyn Cipher>>,
    /// Present only when a cipher is configured; used for the per-frame
    /// HMAC (spec §4.7). Derived independently of the `Cipher` trait
    /// object, which exposes stream transform but not its key.
    pub mac_key: Option<Vec<u8>>,
}

impl WorkerState {
    pub fn mac_len(&self, cfg: &PipelineConfig) -> usize {
        if cfg.encrypting() {
            crate::crypto::mac::MAC_LEN
        } else {
            4
        }
    }
}

/// Serializes access to the shared global-dedup index across workers in
/// strictly ascending chunk-id order (spec §5 "index_sem chain"): a worker
/// blocks on `wait` before touching the index and signals `pass` when done,
/// handing the turn to whichever worker owns the next chunk id.
pub struct DedupTurnGate {
    pub wait: crossbeam_channel::Receiver<()>,
    pub pass: crossbeam_channel::Sender<()>,
}

impl DedupTurnGate {
    pub fn turn<T>(&self, f: impl FnOnce() -> T) -> T {
        let _ = self.wait.recv();
        let result = f();
        let _ = self.pass.send(());
        result
    }
}

enum Repr {
    Compressed { bytes: Vec<u8>, pre_len: usize, committed: Vec<FilterId> },
    Preprocessed { bytes: Vec<u8>, committed: Vec<FilterId> },
    DedupedOnly(Vec<u8>),
    Raw,
}

fn build_frame(
    cfg: &PipelineConfig,
    state: &WorkerState,
    digest: Vec<u8>,
    flags: ChunkFlags,
    payload: &[u8],
    trailing_original_len: Option<u64>,
) -> Vec<u8> {
    let mut length_and_digest = Vec::with_capacity(8 + digest.len());
    length_and_digest.extend_from_slice(&(payload.len() as u64).to_be_bytes());
    length_and_digest.extend_from_slice(&digest);

    let mac_or_crc = if let Some(key) = &state.mac_key {
        let mut mac_input = length_and_digest.clone();
        mac_input.extend(std::iter::repeat(0u8).take(state.mac_len(cfg)));
        mac_input.push(flags.bits());
        mac_input.extend_from_slice(payload);
        crate::crypto::mac::hmac(key, &[&mac_input])
    } else {
        let mut crc_input = length_and_digest.clone();
        crc_input.push(flags.bits());
        crate::digest::crc32::crc32(&crc_input).to_be_bytes().to_vec()
    };

    let header = ChunkHeader {
        length: payload.len() as u64,
        digest,
        mac_or_crc,
        flags,
    };
    let mut out = header.encode();
    out.extend_from_slice(payload);
    if let Some(original_len) = trailing_original_len {
        out.extend_from_slice(&original_len.to_be_bytes());
    }
    out
}

fn preprocess_flags_for(committed: &[FilterId], compressed: bool) -> PreprocessFlags {
    let mut pf = PreprocessFlags::empty();
    for id in committed {
        pf |= PreprocessHeader::bit_for(*id);
    }
    if compressed {
        pf |= PreprocessFlags::COMPRESSED;
    }
    pf
}

fn committed_from_flags(pf: PreprocessFlags) -> Vec<FilterId> {
    [FilterId::Dispack, FilterId::E8E9, FilterId::Dict, FilterId::Lzp, FilterId::Delta2]
        .into_iter()
        .filter(|id| pf.contains(PreprocessHeader::bit_for(*id)))
        .collect()
}

/// Compresses one chunk end to end: digest -> (global dedup) -> (local
/// dedup) -> preprocess -> compress -> encrypt/MAC -> frame (spec §4.2).
pub fn compress_chunk(
    job: &ChunkJob,
    cfg: &PipelineConfig,
    state: &mut WorkerState,
    global: Option<(&Mutex<GlobalIndex>, &DedupTurnGate)>,
) -> Result<Vec<u8>> {
    let raw = &job.raw;
    let rbytes = raw.len();

    let digest = if cfg.encrypting() {
        Vec::new()
    } else {
        digest_bytes(cfg.cksum, raw)
    };

    if let (Some(dedup_cfg), Some((index, gate))) = (&cfg.dedup, global) {
        if dedup_cfg.global.is_some() {
            let hit = gate.turn(|| {
                let mut guard = index.lock().expect("global dedup index poisoned");
                if let Some(reference) = guard.lookup(raw) {
                    Some(reference)
                } else {
                    let sk = sketch::compute(raw, SimilarityMode::Standard);
                    guard.insert(
                        raw,
                        sk,
                        GlobalRef {
                            offset: job.plain_offset,
                            len: rbytes as u32,
                        },
                    );
                    None
                }
            });
            if let Some(reference) = hit {
                let mut payload = reference.to_bytes().to_vec();
                if let Some(cipher) = &mut state.cipher {
                    cipher.transform(&mut payload, job.id);
                }
                let variable = job.is_last || rbytes != cfg.chunksize as usize;
                let mut f = ChunkFlags::DEDUPED;
                let trailing = if variable {
                    f |= ChunkFlags::VARIABLE_SIZE;
                    Some(rbytes as u64)
                } else {
                    None
                };
                return Ok(build_frame(cfg, state, digest, f, &payload, trailing));
            }
        }
    }

    let (dedup_bytes, deduped) = if let Some(dedup_cfg) = &cfg.dedup {
        let index = dedup_index::build(raw, dedup_cfg.rab_blk_sz, dedup_cfg.enable_delta)?;
        let encoded = wire_dedup::encode(&index.entries)?;
        if encoded.len() < rbytes {
            (encoded, true)
        } else {
            (raw.clone(), false)
        }
    } else {
        (raw.clone(), false)
    };

    let (pre_bytes, committed) = preprocess::apply_chain(dedup_bytes.clone(), cfg.level, &cfg.preprocess);
    let compressed = state.compressor.compress(&pre_bytes, cfg.level)?;

    let repr = if let Some(c) = compressed.filter(|c| c.len() < rbytes) {
        Repr::Compressed {
            bytes: c,
            pre_len: pre_bytes.len(),
            committed,
        }
    } else if !committed.is_empty() && pre_bytes.len() < rbytes {
        Repr::Preprocessed {
            bytes: pre_bytes,
            committed,
        }
    } else if deduped && dedup_bytes.len() < rbytes {
        Repr::DedupedOnly(dedup_bytes)
    } else {
        Repr::Raw
    };

    let (mut flags, mut payload) = match repr {
        Repr::Compressed { bytes, pre_len, committed } => {
            let mut f = ChunkFlags::COMPRESSED | ChunkFlags::PREPROCESSED;
            if deduped {
                f |= ChunkFlags::DEDUPED;
            }
            let header = PreprocessHeader {
                flags: preprocess_flags_for(&committed, true),
                post_length: pre_len as u64,
            };
            let mut framed = header.encode().to_vec();
            framed.extend_from_slice(&bytes);
            (f, framed)
        }
        Repr::Preprocessed { bytes, committed } => {
            let mut f = ChunkFlags::PREPROCESSED;
            if deduped {
                f |= ChunkFlags::DEDUPED;
            }
            let header = PreprocessHeader {
                flags: preprocess_flags_for(&committed, false),
                post_length: bytes.len() as u64,
            };
            let mut framed = header.encode().to_vec();
            framed.extend_from_slice(&bytes);
            (f, framed)
        }
        Repr::DedupedOnly(bytes) => (ChunkFlags::DEDUPED, bytes),
        Repr::Raw => (ChunkFlags::empty(), raw.clone()),
    };

    let adaptive_id = state.compressor.last_adaptive_id();
    if adaptive_id != 0 {
        flags = flags.with_adaptive_id(adaptive_id);
    }

    if let Some(cipher) = &mut state.cipher {
        cipher.transform(&mut payload, job.id);
    }

    let variable = job.is_last || rbytes != cfg.chunksize as usize;
    let trailing = if variable {
        flags |= ChunkFlags::VARIABLE_SIZE;
        Some(rbytes as u64)
    } else {
        None
    };

    Ok(build_frame(cfg, state, digest, flags, &payload, trailing))
}

fn resolve_local_dedup(entries: &[Entry], rab_blk_sz: u32) -> Result<Vec<u8>> {
    let chunker = RabinChunker::new(rab_blk_sz);
    let mut output = Vec::new();
    let mut blocks: Vec<(usize, usize)> = Vec::new();

    for entry in entries {
        match entry {
            Entry::Literal(bytes) => {
                let start = output.len();
                output.extend_from_slice(bytes);
                for (rel_start, rel_end) in chunker.blocks(bytes) {
                    blocks.push((start + rel_start, start + rel_end));
                }
            }
            Entry::ExactRef { block_index } => {
                let (s, e) = *blocks
                    .get(*block_index)
                    .ok_or_else(|| PcompressError::FrameParse("dedup block index out of range".into()))?;
                let start = output.len();
                let bytes = output[s..e].to_vec();
                output.extend_from_slice(&bytes);
                blocks.push((start, output.len()));
            }
            Entry::PartialRef { block_index, patch } => {
                let (s, e) = *blocks
                    .get(*block_index)
                    .ok_or_else(|| PcompressError::FrameParse("dedup block index out of range".into()))?;
                let reference = output[s..e].to_vec();
                let recovered = bsdiff_adapter::patch(&reference, patch)?;
                let start = output.len();
                output.extend_from_slice(&recovered);
                blocks.push((start, output.len()));
            }
        }
    }
    Ok(output)
}

/// Decompresses one frame: verify MAC/CRC -> decrypt -> decompress ->
/// reverse preprocess -> resolve dedup -> verify digest (spec §4.3).
pub fn decompress_chunk(frame: ParsedFrame, cfg: &PipelineConfig, state: &mut WorkerState) -> Result<ChunkOutcome> {
    let mut payload = frame.payload;

    if let Some(key) = &state.mac_key {
        let mut mac_input = Vec::with_capacity(8 + frame.header.digest.len() + state.mac_len(cfg) + 1 + payload.len());
        mac_input.extend_from_slice(&frame.header.length.to_be_bytes());
        mac_input.extend_from_slice(&frame.header.digest);
        mac_input.extend(std::iter::repeat(0u8).take(state.mac_len(cfg)));
        mac_input.push(frame.header.flags.bits());
        mac_input.extend_from_slice(&payload);
        crate::crypto::mac::verify(key, &[&mac_input], &frame.header.mac_or_crc, Some(frame.id))?;
    } else {
        let mut crc_input = Vec::with_capacity(8 + frame.header.digest.len() + 1);
        crc_input.extend_from_slice(&frame.header.length.to_be_bytes());
        crc_input.extend_from_slice(&frame.header.digest);
        crc_input.push(frame.header.flags.bits());
        let expected = crate::digest::crc32::crc32(&crc_input).to_be_bytes();
        if expected.as_slice() != frame.header.mac_or_crc.as_slice() {
            return Err(PcompressError::HeaderCrcMismatch);
        }
    }

    if let Some(cipher) = &mut state.cipher {
        cipher.transform(&mut payload, frame.id);
    }

    let is_global_dedup = cfg.dedup.as_ref().map(|d| d.global.is_some()).unwrap_or(false);
    let is_global_ref = frame.header.flags.contains(ChunkFlags::DEDUPED)
        && !frame.header.flags.contains(ChunkFlags::PREPROCESSED);
    if is_global_dedup && is_global_ref && payload.len() == 12 {
        let bytes: [u8; 12] = payload
            .as_slice()
            .try_into()
            .map_err(|_| PcompressError::FrameParse("malformed global dedup reference".into()))?;
        return Ok(ChunkOutcome::GlobalRef(GlobalRef::from_bytes(bytes)));
    }

    let mut data = payload;

    if frame.header.flags.contains(ChunkFlags::PREPROCESSED) {
        let (pre_header, consumed) = PreprocessHeader::decode(&data)?;
        data = data[consumed..].to_vec();
        if frame.header.flags.contains(ChunkFlags::COMPRESSED) {
            data = state.compressor.decompress(&data, pre_header.post_length as usize)?;
        }
        let committed = committed_from_flags(pre_header.flags);
        data = preprocess::reverse_chain(data, cfg.level, &committed)?;
    }

    if frame.header.flags.contains(ChunkFlags::DEDUPED) {
        let entries = wire_dedup::decode(&data)?;
        let rab_blk_sz = cfg.dedup.as_ref().map(|d| d.rab_blk_sz).unwrap_or(0);
        data = resolve_local_dedup(&entries, rab_blk_sz)?;
    }

    if !cfg.encrypting() {
        let actual = digest_bytes(cfg.cksum, &data);
        if actual != frame.header.digest {
            return Err(PcompressError::DigestMismatch { chunk_id: frame.id });
        }
    }

    if let Some(original_len) = frame.original_len {
        if data.len() as u64 != original_len {
            return Err(PcompressError::FrameParse(format!(
                "chunk {} resolved to {} bytes, trailing size says {original_len}",
                frame.id,
                data.len()
            )));
        }
    }

    Ok(ChunkOutcome::Bytes(data))
}
