#![no_main]
use libfuzzer_sys::fuzz_target;

// Feeds arbitrary bytes through the pcompress frame-header decoders (spec
// §6 "Per-chunk frame", §7 "frame parse error"). Err is expected and fine;
// what we verify is no panics, no OOB reads, no infinite loops.

fuzz_target!(|data: &[u8]| {
    for digest_len in [0usize, 8, 32, 64] {
        for mac_len in [0usize, 4, 32] {
            let _ = pcompress::format::chunk_header::ChunkHeader::decode(data, digest_len, mac_len);
        }
    }
    let _ = pcompress::format::chunk_header::PreprocessHeader::decode(data);
    let _ = pcompress::format::file_header::FileHeader::decode_base(data);
    let _ = pcompress::format::dedup_index::decode(data);
});
