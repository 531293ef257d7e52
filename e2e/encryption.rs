//! End-to-end tests for authenticated encryption (spec §4.7): AES-CTR and
//! Salsa20 payload ciphers, HMAC-SHA256 integrity, and wrong-password
//! rejection.

use pcompress::compressor::Algo;
use pcompress::crypto::mac::MAC_LEN;
use pcompress::crypto::CipherAlg;
use pcompress::digest::CksumId;
use pcompress::format::file_header::FileHeader;
use pcompress::pipeline::{CipherConfig, PipelineConfig};
use pcompress::{compress_file, decompress_file};
use tempfile::tempdir;

fn cfg_with_cipher(alg: CipherAlg, key_len: usize) -> PipelineConfig {
    PipelineConfig {
        chunksize: 1 << 16,
        level: 4,
        workers: 2,
        algo: Algo::Lz4,
        cksum: CksumId::Sha256,
        cipher: Some(CipherConfig {
            alg,
            password: b"correct horse battery staple".to_vec(),
            key_len,
            salt: pcompress::util::securerng::random_bytes(32),
            nonce: pcompress::util::securerng::random_bytes(alg.wire_nonce_len()),
        }),
        dedup: None,
        preprocess: Vec::new(),
    }
}

fn sample_data(size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        out.extend_from_slice(b"plaintext that needs protecting, over and over again. ");
    }
    out.truncate(size);
    out
}

#[test]
fn aes_roundtrip_with_correct_password() {
    let cfg = cfg_with_cipher(CipherAlg::Aes, 32);
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out.pz");
    let restored = dir.path().join("restored.bin");
    let data = sample_data(150_000);
    std::fs::write(&input, &data).unwrap();

    compress_file(&cfg, &input, &output).unwrap();

    let mut file = std::fs::File::open(&output).unwrap();
    let (header, header_len) =
        FileHeader::read_and_verify(&mut file, Some(b"correct horse battery staple")).unwrap();
    assert!(header.cipher.is_some());

    decompress_file(&cfg, cfg.cksum.output_len(), MAC_LEN, header_len, &output, &restored).unwrap();
    assert_eq!(std::fs::read(&restored).unwrap(), data);
}

#[test]
fn salsa20_roundtrip_with_128_bit_key() {
    let cfg = cfg_with_cipher(CipherAlg::Salsa20, 16);
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out.pz");
    let restored = dir.path().join("restored.bin");
    let data = sample_data(80_000);
    std::fs::write(&input, &data).unwrap();

    compress_file(&cfg, &input, &output).unwrap();
    let mut file = std::fs::File::open(&output).unwrap();
    let (_header, header_len) =
        FileHeader::read_and_verify(&mut file, Some(b"correct horse battery staple")).unwrap();

    decompress_file(&cfg, cfg.cksum.output_len(), MAC_LEN, header_len, &output, &restored).unwrap();
    assert_eq!(std::fs::read(&restored).unwrap(), data);
}

#[test]
fn wrong_password_is_rejected_at_header_stage() {
    let cfg = cfg_with_cipher(CipherAlg::Aes, 32);
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out.pz");
    std::fs::write(&input, sample_data(10_000)).unwrap();

    compress_file(&cfg, &input, &output).unwrap();

    let mut file = std::fs::File::open(&output).unwrap();
    let result = FileHeader::read_and_verify(&mut file, Some(b"wrong password"));
    assert!(result.is_err(), "a mismatched password must fail header verification");
}
