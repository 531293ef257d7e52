//! End-to-end tests for content-defined and global dedup (spec §4.4).

use pcompress::compressor::Algo;
use pcompress::digest::CksumId;
use pcompress::pipeline::{DedupConfig, GlobalDedupMode, PipelineConfig};
use pcompress::{compress_file, decompress_file};
use tempfile::tempdir;

fn repetitive_data(size: usize) -> Vec<u8> {
    const BLOCK: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@";
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        out.extend_from_slice(BLOCK);
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
    let (header, header_len) = pcompress::format::file_header::FileHeader::read_and_verify(&mut file, None).unwrap();
    assert!(header.flags.contains(pcompress::format::file_header::FileFlags::DEDUP));

    decompress_file(&cfg, cfg.cksum.output_len(), 4, header_len, &output, &restored).unwrap();
    assert_eq!(std::fs::read(&restored).unwrap(), data);
}

#[test]
fn local_rabin_dedup_roundtrips() {
    let cfg = PipelineConfig {
        chunksize: 1 << 16,
        level: 3,
        workers: 2,
        algo: Algo::Lz4,
        cksum: CksumId::Crc64,
        cipher: None,
        dedup: Some(DedupConfig {
            rab_blk_sz: 2,
            enable_delta: false,
            global: None,
        }),
        preprocess: Vec::new(),
    };
    run_roundtrip(cfg, &repetitive_data(200_000));
}

#[test]
fn global_simple_dedup_roundtrips_across_chunks() {
    let cfg = PipelineConfig {
        chunksize: 16_384,
        level: 3,
        workers: 3,
        algo: Algo::Lz4,
        cksum: CksumId::Sha256,
        cipher: None,
        dedup: Some(DedupConfig {
            rab_blk_sz: 2,
            enable_delta: false,
            global: Some(GlobalDedupMode::Simple),
        }),
        preprocess: Vec::new(),
    };
    run_roundtrip(cfg, &repetitive_data(500_000));
}

#[test]
fn fixed_block_segmented_dedup_roundtrips() {
    let cfg = PipelineConfig {
        chunksize: 16_384,
        level: 3,
        workers: 2,
        algo: Algo::Zlib,
        cksum: CksumId::Crc64,
        cipher: None,
        dedup: Some(DedupConfig {
            rab_blk_sz: 2,
            enable_delta: false,
            global: Some(GlobalDedupMode::Segmented { blocks_per_segment: 4 }),
        }),
        preprocess: Vec::new(),
    };
    run_roundtrip(cfg, &repetitive_data(300_000));
}

#[test]
fn delta_encoding_of_near_duplicates_roundtrips() {
    let mut data = repetitive_data(100_000);
    // Perturb a handful of bytes midway through so similar-but-not-identical
    // blocks exercise the bsdiff delta path rather than exact dedup matches.
    for i in (50_000..50_200).step_by(7) {
        data[i] ^= 0xFF;
    }
    let cfg = PipelineConfig {
        chunksize: 8192,
        level: 3,
        workers: 2,
        algo: Algo::Lz4,
        cksum: CksumId::Crc64,
        cipher: None,
        dedup: Some(DedupConfig {
            rab_blk_sz: 2,
            enable_delta: true,
            global: Some(GlobalDedupMode::Simple),
        }),
        preprocess: Vec::new(),
    };
    run_roundtrip(cfg, &data);
}
