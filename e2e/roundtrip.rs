//! End-to-end compress/decompress roundtrips across algorithms and chunk
//! sizes (spec §4.1-§4.6, §8 "testable properties").

use pcompress::compressor::Algo;
use pcompress::digest::CksumId;
use pcompress::pipeline::PipelineConfig;
use pcompress::{compress_file, decompress_file};
use tempfile::tempdir;

fn cfg(algo: Algo, cksum: CksumId, chunksize: u64) -> PipelineConfig {
    PipelineConfig {
        chunksize,
        level: 3,
        workers: 2,
        algo,
        cksum,
        cipher: None,
        dedup: None,
        preprocess: Vec::new(),
    }
}

fn roundtrip(algo: Algo, cksum: CksumId, chunksize: u64, data: &[u8]) {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out.pz");
    let restored = dir.path().join("restored.bin");
    std::fs::write(&input, data).unwrap();

    let cfg = cfg(algo, cksum, chunksize);
    compress_file(&cfg, &input, &output).unwrap();

    let mut file = std::fs::File::open(&output).unwrap();
    let (header, header_len) = pcompress::format::file_header::FileHeader::read_and_verify(&mut file, None).unwrap();
    assert_eq!(header.algo_name, algo.name());

    decompress_file(&cfg, cksum.output_len(), 4, header_len, &output, &restored).unwrap();
    let recovered = std::fs::read(&restored).unwrap();
    assert_eq!(recovered, data, "roundtrip mismatch for {}/{:?}", algo.name(), cksum);
}

fn sample_data(size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        out.extend_from_slice(b"the quick brown fox jumps over the lazy dog 0123456789 ");
    }
    out.truncate(size);
    out
}

#[test]
fn lz4_roundtrip_multi_chunk() {
    roundtrip(Algo::Lz4, CksumId::Crc64, 4096, &sample_data(50_000));
}

#[test]
fn zlib_roundtrip_single_chunk() {
    roundtrip(Algo::Zlib, CksumId::Sha256, 1 << 20, &sample_data(2_000));
}

#[test]
fn none_algo_roundtrip() {
    roundtrip(Algo::None, CksumId::Crc64, 4096, &sample_data(10_000));
}

#[test]
fn adapt_roundtrip() {
    roundtrip(Algo::Adapt, CksumId::Blake256, 8192, &sample_data(40_000));
}

#[test]
fn empty_input_roundtrip() {
    roundtrip(Algo::Lz4, CksumId::Crc64, 4096, &[]);
}

#[test]
fn bzip2_roundtrip() {
    roundtrip(Algo::Bzip2, CksumId::Sha512, 16384, &sample_data(70_000));
}
