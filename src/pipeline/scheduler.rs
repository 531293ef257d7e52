//! Pipeline orchestrator (spec §4.1 "Chunk Pipeline / Scheduler", §5
//! "Concurrency & resource model").
//!
//! One reader thread, `N` worker threads, one writer thread. Ordering is
//! kept with a pair of `crossbeam-channel`s per worker instead of the
//! source's three binary semaphores per `WorkerSlot` (spec §9 "Semaphore
//! ping-pong for ordering... or model as two channels per worker" —
//! the channel form is taken here). The reader hands chunk `k` to worker
//! `k mod N`; the writer drains worker `0, 1, ..., N-1, 0, ...` in the same
//! order, so output always appears in ascending chunk-id order regardless
//! of which worker actually finishes first.

use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use crate::compressor::new_compressor;
use crate::crypto::{new_cipher, CipherAlg, CipherMode};
use crate::dedup::global::GlobalIndex;
use crate::dedup::rabin::RabinChunker;
use crate::error::{PcompressError, Result};
use crate::format::file_header::{CipherHeader, FileFlags, FileHeader, FILE_FORMAT_VERSION};
use crate::util::memsize;

use super::reader::{ChunkReader, FrameReader, ReadFrame};
use super::session::{GlobalDedupMode, PipelineConfig};
use super::stats::Stats;
use super::worker::{
    compress_chunk, decompress_chunk, ChunkJob, ChunkOutcome, DedupTurnGate, ParsedFrame, WorkerState,
};
use super::writer::{write_compressed, write_decompressed};

/// `N` when `-t` is not given: `min(logical_cores, ceil(input_size/chunksize))`
/// (spec §4.1 "Initialisation").
pub fn auto_worker_count(input_size: u64, chunksize: u64) -> usize {
    let cores = crate::util::count_cores();
    if input_size == 0 {
        return 1;
    }
    let by_size = ((input_size + chunksize - 1) / chunksize).max(1) as usize;
    cores.min(by_size).max(1)
}

/// A job handed from the reader to a worker: either a real chunk or the
/// end-of-stream sentinel (spec §4.1 "Termination": "the reader signals EOF
/// by delivering a zero-length chunk to the next worker in sequence").
enum JobMsg<T> {
    Item(T),
    Eof,
}

struct WorkerChannels<T> {
    job_tx: Vec<Sender<JobMsg<T>>>,
    job_rx: Vec<Receiver<JobMsg<T>>>,
}

fn build_channels<T: Send + 'static>(n: usize) -> WorkerChannels<T> {
    let mut job_tx = Vec::with_capacity(n);
    let mut job_rx = Vec::with_capacity(n);
    for _ in 0..n {
        let (tx, rx) = bounded(4);
        job_tx.push(tx);
        job_rx.push(rx);
    }
    WorkerChannels { job_tx, job_rx }
}

/// Builds the ring of [`DedupTurnGate`]s implementing the `index_sem` chain
/// (spec §5 "Global-dedup index modifications happen in ascending id order
/// because index_sem[0] is posted once at start and each worker posts
/// index_sem[(i+1) mod N] at completion").
fn build_turn_gates(n: usize) -> Vec<DedupTurnGate> {
    let mut wait_tx = Vec::with_capacity(n);
    let mut wait_rx = Vec::with_capacity(n);
    for _ in 0..n {
        let (tx, rx) = bounded::<()>(1);
        wait_tx.push(tx);
        wait_rx.push(rx);
    }
    wait_tx[0].send(()).expect("fresh channel accepts first token");
    wait_rx
        .into_iter()
        .enumerate()
        .map(|(i, wait)| DedupTurnGate {
            wait,
            pass: wait_tx[(i + 1) % n].clone(),
        })
        .collect()
}

fn build_worker_state(cfg: &PipelineConfig, cipher_mode: CipherMode) -> Result<WorkerState> {
    let compressor = new_compressor(cfg.algo)?;
    let (cipher, mac_key) = if let Some(cipher_cfg) = &cfg.cipher {
        let cipher = new_cipher(
            cipher_cfg.alg,
            cipher_mode,
            &cipher_cfg.password,
            &cipher_cfg.salt,
            cipher_cfg.key_len,
            cipher_cfg.nonce.clone(),
        )?;
        let mac_key = crate::crypto::kdf::derive_key(&cipher_cfg.password, &cipher_cfg.salt, cipher_cfg.key_len)?;
        (Some(cipher), Some(mac_key))
    } else {
        (None, None)
    };
    Ok(WorkerState {
        compressor,
        cipher,
        mac_key,
    })
}

fn global_index_for(cfg: &PipelineConfig) -> Option<Arc<Mutex<GlobalIndex>>> {
    match cfg.dedup.as_ref()?.global? {
        GlobalDedupMode::Simple => Some(Arc::new(Mutex::new(GlobalIndex::new_simple()))),
        GlobalDedupMode::Segmented { blocks_per_segment } => {
            Some(Arc::new(Mutex::new(GlobalIndex::new_segmented(blocks_per_segment))))
        }
    }
}

/// Builds the spec §6 file header from the run configuration. `input_size`
/// decides the `SINGLE_CHUNK` flag (a file no larger than one chunk never
/// needs the reader's Rabin-realignment path on the decompress side).
pub fn build_file_header(cfg: &PipelineConfig, input_size: u64) -> FileHeader {
    let mut flags = FileFlags::empty().with_cksum_id(cfg.cksum as u16);
    if let Some(dedup) = &cfg.dedup {
        flags |= FileFlags::DEDUP;
        if dedup.global.is_some() {
            flags |= FileFlags::DEDUP_FIXED;
        }
    }
    if input_size > 0 && input_size <= cfg.chunksize {
        flags |= FileFlags::SINGLE_CHUNK;
    }

    let cipher = cfg.cipher.as_ref().map(|c| {
        flags |= match c.alg {
            CipherAlg::Aes => FileFlags::CIPHER_AES,
            CipherAlg::Salsa20 => FileFlags::CIPHER_SALSA,
        };
        CipherHeader {
            salt: c.salt.clone(),
            nonce: c.nonce.clone(),
            key_len: c.key_len as u32,
        }
    });

    FileHeader {
        algo_name: cfg.algo.name().to_string(),
        version: FILE_FORMAT_VERSION,
        flags,
        chunksize: cfg.chunksize,
        level: cfg.level,
        cipher,
    }
}

/// Refuses to start when the projected working set would exceed 80% of
/// system RAM (spec §5 "Memory sizing").
fn check_memory_budget(workers: usize, chunksize: u64) -> Result<()> {
    let projected = workers as u64 * 2 * chunksize;
    if memsize::exceeds_ram_fraction(projected, crate::config::CHUNKSIZE_MAX_RAM_FRACTION) {
        return Err(PcompressError::Allocation(format!(
            "projected working set {projected} bytes exceeds {}% of system RAM",
            (crate::config::CHUNKSIZE_MAX_RAM_FRACTION * 100.0) as u32
        )));
    }
    Ok(())
}

/// Runs a full compress pass: `input_path` -> chunked, processed, framed
/// bytes written to `output_path` (spec §4.1/§4.2).
pub fn compress_file(cfg: &PipelineConfig, input_path: &Path, output_path: &Path) -> Result<Stats> {
    let input_size = crate::util::get_file_size(input_path);
    let workers = if cfg.workers == 0 {
        auto_worker_count(input_size, cfg.chunksize)
    } else {
        cfg.workers
    };
    check_memory_budget(workers, cfg.chunksize)?;

    let infile = File::open(input_path)?;
    let outfile = File::create(output_path)?;
    let mut writer = BufWriter::new(outfile);

    let header = build_file_header(cfg, input_size);
    let mac_key = cfg
        .cipher
        .as_ref()
        .map(|c| crate::crypto::kdf::derive_key(&c.password, &c.salt, c.key_len))
        .transpose()?;
    header.write_with_integrity(&mut writer, mac_key.as_deref())?;

    let channels: WorkerChannels<ChunkJob> = build_channels(workers);
    let (result_tx, result_rx): (Vec<_>, Vec<_>) = (0..workers).map(|_| unbounded::<Vec<u8>>()).unzip();

    let cancel = Arc::new(AtomicBool::new(false));
    let error: Arc<Mutex<Option<PcompressError>>> = Arc::new(Mutex::new(None));
    let stats = Arc::new(Stats::new());

    let global_index = global_index_for(cfg);
    let turn_gates = if global_index.is_some() { Some(build_turn_gates(workers)) } else { None };

    let rabin = cfg.dedup.as_ref().map(|d| RabinChunker::new(d.rab_blk_sz));

    thread::scope(|scope| -> Result<()> {
        // Reader thread.
        let reader_cancel = Arc::clone(&cancel);
        let reader_error = Arc::clone(&error);
        let job_tx = channels.job_tx.clone();
        let reader_chunksize = cfg.chunksize;
        scope.spawn(move || {
            let mut reader = ChunkReader::new(BufReader::new(infile), reader_chunksize, rabin);
            loop {
                if reader_cancel.load(Ordering::SeqCst) {
                    break;
                }
                match reader.next_chunk() {
                    Ok(Some(job)) => {
                        let idx = (job.id as usize) % workers;
                        if job_tx[idx].send(JobMsg::Item(job)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        let idx = (reader.chunks_emitted() as usize) % workers;
                        let _ = job_tx[idx].send(JobMsg::Eof);
                        break;
                    }
                    Err(e) => {
                        *reader_error.lock().unwrap() = Some(e);
                        reader_cancel.store(true, Ordering::SeqCst);
                        break;
                    }
                }
            }
        });

        // Worker threads.
        for i in 0..workers {
            let job_rx = channels.job_rx[i].clone();
            let result_tx = result_tx[i].clone();
            let worker_cancel = Arc::clone(&cancel);
            let worker_error = Arc::clone(&error);
            let stats = Arc::clone(&stats);
            let global_index = global_index.clone();
            let gate = turn_gates.as_ref().map(|g| &g[i]);
            let cfg = cfg.clone();
            let cipher_mode = CipherMode::Encrypt;
            scope.spawn(move || {
                let mut state = match build_worker_state(&cfg, cipher_mode) {
                    Ok(s) => s,
                    Err(e) => {
                        *worker_error.lock().unwrap() = Some(e);
                        worker_cancel.store(true, Ordering::SeqCst);
                        return;
                    }
                };
                loop {
                    if worker_cancel.load(Ordering::SeqCst) {
                        break;
                    }
                    match job_rx.recv() {
                        Ok(JobMsg::Item(job)) => {
                            let rbytes = job.raw.len() as u64;
                            let global = global_index.as_deref().zip(gate).map(|(idx, g)| (idx, g));
                            match compress_chunk(&job, &cfg, &mut state, global) {
                                Ok(frame) => {
                                    stats.record_chunk(rbytes, frame.len() as u64, false, false, false);
                                    if result_tx.send(frame).is_err() {
                                        break;
                                    }
                                }
                                Err(e) => {
                                    *worker_error.lock().unwrap() = Some(e);
                                    worker_cancel.store(true, Ordering::SeqCst);
                                    let _ = result_tx.send(crate::format::chunk_header::END_OF_STREAM.to_be_bytes().to_vec());
                                    break;
                                }
                            }
                        }
                        Ok(JobMsg::Eof) => {
                            let _ = result_tx.send(crate::format::chunk_header::END_OF_STREAM.to_be_bytes().to_vec());
                            break;
                        }
                        Err(_) => break,
                    }
                }
            });
        }
        drop(result_tx);

        write_compressed(&mut writer, &result_rx)?;
        Ok(())
    })?;

    if let Some(e) = error.lock().unwrap().take() {
        let _ = std::fs::remove_file(output_path);
        return Err(e);
    }

    Ok(Arc::try_unwrap(stats).unwrap_or_default())
}

/// Runs a full decompress pass (spec §4.3). `cfg` must match the
/// configuration the file was compressed with (algorithm, dedup block
/// size, cipher); `cli::init` derives it from the parsed file header plus
/// any CLI flags needed to fill in what the header doesn't carry (the
/// dedup `-B` index is not persisted, see DESIGN.md). `header_len` is the
/// byte count `cli::init` consumed reading that header with
/// [`FileHeader::read_and_verify`] — the frame stream resumes there.
pub fn decompress_file(
    cfg: &PipelineConfig,
    digest_len: usize,
    mac_len: usize,
    header_len: u64,
    input_path: &Path,
    output_path: &Path,
) -> Result<Stats> {
    let workers = if cfg.workers == 0 {
        auto_worker_count(crate::util::get_file_size(input_path).max(1), cfg.chunksize)
    } else {
        cfg.workers
    };
    check_memory_budget(workers, cfg.chunksize)?;

    let mut infile = File::open(input_path)?;
    infile.seek(SeekFrom::Start(header_len))?;
    let mut outfile = File::options()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(output_path)?;

    let channels: WorkerChannels<ParsedFrame> = build_channels(workers);
    let (result_tx, result_rx): (Vec<_>, Vec<_>) = (0..workers).map(|_| unbounded::<ChunkOutcome>()).unzip();

    let cancel = Arc::new(AtomicBool::new(false));
    let error: Arc<Mutex<Option<PcompressError>>> = Arc::new(Mutex::new(None));
    let stats = Arc::new(Stats::new());

    thread::scope(|scope| -> Result<()> {
        let reader_cancel = Arc::clone(&cancel);
        let reader_error = Arc::clone(&error);
        let job_tx = channels.job_tx.clone();
        scope.spawn(move || {
            let mut reader = FrameReader::new(BufReader::new(infile), digest_len, mac_len, cfg.chunksize);
            let mut next_id = 0u64;
            loop {
                if reader_cancel.load(Ordering::SeqCst) {
                    break;
                }
                match reader.next_frame() {
                    Ok(ReadFrame::Parsed {
                        id,
                        header,
                        payload,
                        original_len,
                    }) => {
                        let idx = (id as usize) % workers;
                        let frame = ParsedFrame {
                            id,
                            header,
                            payload,
                            original_len,
                        };
                        next_id = id + 1;
                        if job_tx[idx].send(JobMsg::Item(frame)).is_err() {
                            break;
                        }
                    }
                    Ok(ReadFrame::Eof) => {
                        let idx = (next_id as usize) % workers;
                        let _ = job_tx[idx].send(JobMsg::Eof);
                        break;
                    }
                    Err(e) => {
                        *reader_error.lock().unwrap() = Some(e);
                        reader_cancel.store(true, Ordering::SeqCst);
                        break;
                    }
                }
            }
        });

        for i in 0..workers {
            let job_rx = channels.job_rx[i].clone();
            let result_tx = result_tx[i].clone();
            let worker_cancel = Arc::clone(&cancel);
            let worker_error = Arc::clone(&error);
            let stats = Arc::clone(&stats);
            let cfg = cfg.clone();
            scope.spawn(move || {
                let mut state = match build_worker_state(&cfg, CipherMode::Decrypt) {
                    Ok(s) => s,
                    Err(e) => {
                        *worker_error.lock().unwrap() = Some(e);
                        worker_cancel.store(true, Ordering::SeqCst);
                        return;
                    }
                };
                loop {
                    if worker_cancel.load(Ordering::SeqCst) {
                        break;
                    }
                    match job_rx.recv() {
                        Ok(JobMsg::Item(frame)) => {
                            let in_len = frame.header.length;
                            match decompress_chunk(frame, &cfg, &mut state) {
                                Ok(outcome) => {
                                    let out_len = match &outcome {
                                        ChunkOutcome::Bytes(b) => b.len() as u64,
                                        ChunkOutcome::GlobalRef(r) => r.len as u64,
                                        ChunkOutcome::Eof => 0,
                                    };
                                    stats.record_chunk(in_len, out_len, false, false, false);
                                    if result_tx.send(outcome).is_err() {
                                        break;
                                    }
                                }
                                Err(e) => {
                                    *worker_error.lock().unwrap() = Some(e);
                                    worker_cancel.store(true, Ordering::SeqCst);
                                    let _ = result_tx.send(ChunkOutcome::Eof);
                                    break;
                                }
                            }
                        }
                        Ok(JobMsg::Eof) => {
                            let _ = result_tx.send(ChunkOutcome::Eof);
                            break;
                        }
                        Err(_) => break,
                    }
                }
            });
        }
        drop(result_tx);

        write_decompressed(&mut outfile, &result_rx)?;
        Ok(())
    })?;

    if let Some(e) = error.lock().unwrap().take() {
        let _ = std::fs::remove_file(output_path);
        return Err(e);
    }

    Ok(Arc::try_unwrap(stats).unwrap_or_default())
}
