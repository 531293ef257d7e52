//! End-to-end tests for the reversible preprocessor filter chain (spec
//! §4.5): E8E9/Dispack (executable filters), LZP, and Delta2, each run
//! through the full compress/decompress pipeline rather than unit-tested
//! in isolation.

use pcompress::compressor::Algo;
use pcompress::digest::CksumId;
use pcompress::pipeline::PipelineConfig;
use pcompress::preprocess::FilterId;
use pcompress::{compress_file, decompress_file};
use tempfile::tempdir;

fn cfg(preprocess: Vec<FilterId>) -> PipelineConfig {
    PipelineConfig {
        chunksize: 1 << 16,
        level: 6,
        workers: 2,
        algo: Algo::Lz4,
        cksum: CksumId::Crc64,
        cipher: None,
        dedup: None,
        preprocess,
    }
}

/// Synthetic x86 code-like data: scattered `0xE8`/`0xE9` call/jump opcodes
/// followed by plausible 32-bit relative displacements, the pattern the
/// E8E9 filter is built to rewrite (spec §4.5).
fn pseudo_executable(size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(size);
    let mut counter: u32 = 0;
    while out.len() < size {
        out.push(if counter % 13 == 0 { 0xE8 } else { 0x90 });
        out.extend_from_slice(&counter.to_le_bytes());
        counter = counter.wrapping_add(0x1000);
    }
    out.truncate(size);
    out
}

fn repetitive_text(size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        out.extend_from_slice(b"the lzp filter rewards long repeated substrings in its window. ");
    }
    out.truncate(size);
    out
}

fn run_roundtrip(cfg: PipelineConfig, data: &[u8]) {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out.pz");
    let restored = dir.path().join("restored.bin");
    std::fs::write(&input, data).unwrap();

    compress_file(&cfg, &input, &output).unwrap();
    let mut file = std::fs::File::open(&output).unwrap();
    let (_header, header_len) =
        pcompress::format::file_header::FileHeader::read_and_verify(&mut file, None).unwrap();
    decompress_file(&cfg, cfg.cksum.output_len(), 4, header_len, &output, &restored).unwrap();
    assert_eq!(std::fs::read(&restored).unwrap(), data);
}

#[test]
fn e8e9_preprocessing_roundtrips() {
    run_roundtrip(cfg(vec![FilterId::Dispack, FilterId::E8E9]), &pseudo_executable(60_000));
}

#[test]
fn lzp_preprocessing_roundtrips() {
    run_roundtrip(cfg(vec![FilterId::Lzp]), &repetitive_text(80_000));
}

#[test]
fn delta2_preprocessing_roundtrips() {
    run_roundtrip(cfg(vec![FilterId::Delta2]), &pseudo_executable(40_000));
}

#[test]
fn full_filter_chain_roundtrips() {
    run_roundtrip(
        cfg(vec![
            FilterId::Dispack,
            FilterId::E8E9,
            FilterId::Lzp,
            FilterId::Delta2,
        ]),
        &pseudo_executable(100_000),
    );
}
