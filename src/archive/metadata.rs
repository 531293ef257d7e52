//! Metadata stream (spec §4.8): interleaved directory-entry records, written
//! as LZ4-compressed 2 MiB segments tagged with the `METADATA_INDICATOR`
//! sentinel so the primary frame reader skips them transparently (see
//! [`crate::pipeline::reader::FrameReader::next_frame`]) without needing a
//! second file descriptor, unlike the donor's two-reader design (DESIGN.md
//! "Metadata stream reader").

use std::io::{Read, Write};
use std::path::PathBuf;

use crate::config::METADATA_INDICATOR;
use crate::error::{PcompressError, Result};
use crate::format::chunk_header::{ChunkFlags, END_OF_STREAM};
use crate::lz4codec::block::{compress_block_to_vec, decompress_block_to_vec};

/// One archive entry (spec §4.8): a walked file's path relative to the
/// archive root plus enough `stat` fields to restore it on extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub relative_path: PathBuf,
    pub size: u64,
    pub mtime: i64,
    pub mode: u32,
}

/// Segment size the producer targets before starting a new LZ4-compressed
/// metadata chunk (spec §4.8 "LZ4-compressed, 2 MiB segments").
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Serializes entries into one flat byte blob: repeated
/// `(path_len u32 | path bytes | size u64 | mtime i64 | mode u32)`, all
/// big-endian, the same integer order the rest of [`crate::format`] uses.
pub fn encode_entries(entries: &[MetadataEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        let path_bytes = entry.relative_path.to_string_lossy().into_owned().into_bytes();
        out.extend_from_slice(&(path_bytes.len() as u32).to_be_bytes());
        out.extend_from_slice(&path_bytes);
        out.extend_from_slice(&entry.size.to_be_bytes());
        out.extend_from_slice(&entry.mtime.to_be_bytes());
        out.extend_from_slice(&entry.mode.to_be_bytes());
    }
    out
}

pub fn decode_entries(mut bytes: &[u8]) -> Result<Vec<MetadataEntry>> {
    let mut out = Vec::new();
    while !bytes.is_empty() {
        if bytes.len() < 4 {
            return Err(PcompressError::FrameParse("truncated metadata entry (path length)".into()));
        }
        let path_len = u32::from_be_bytes(bytes[0..4].try_into().unwrap()) as usize;
        bytes = &bytes[4..];
        if bytes.len() < path_len + 8 + 8 + 4 {
            return Err(PcompressError::FrameParse("truncated metadata entry".into()));
        }
        let relative_path = PathBuf::from(String::from_utf8_lossy(&bytes[..path_len]).into_owned());
        bytes = &bytes[path_len..];
        let size = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        let mtime = i64::from_be_bytes(bytes[8..16].try_into().unwrap());
        let mode = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
        bytes = &bytes[20..];
        out.push(MetadataEntry {
            relative_path,
            size,
            mtime,
            mode,
        });
    }
    Ok(out)
}

/// Writes the whole metadata stream as one or more `METADATA_INDICATOR`
/// segments. Each segment is `1 B compressed-flag | 8 B original length |
/// payload`; the flag falls back to storing the segment raw when LZ4
/// declines to shrink it, the same "use raw" convention
/// [`crate::compressor`] back-ends follow.
///
/// Called once per archive-create run, after the primary chunk-frame
/// stream: building the entry list needs the complete file walk up front,
/// so this port writes the metadata stream as a trailer rather than
/// truly interleaved mid-stream (DESIGN.md "Metadata stream placement").
/// [`crate::pipeline::reader::FrameReader::next_frame`] skips these
/// segments regardless of where they fall, so this is format-compatible.
pub fn write_metadata_stream<W: Write>(writer: &mut W, entries: &[MetadataEntry]) -> Result<()> {
    let blob = encode_entries(entries);
    if blob.is_empty() {
        return Ok(());
    }
    for segment in blob.chunks(SEGMENT_SIZE) {
        let compressed = compress_block_to_vec(segment);
        let (flag, payload): (u8, &[u8]) = if !compressed.is_empty() && compressed.len() < segment.len() {
            (1, &compressed)
        } else {
            (0, segment)
        };
        let mut meta = Vec::with_capacity(1 + 8 + payload.len());
        meta.push(flag);
        meta.extend_from_slice(&(segment.len() as u64).to_be_bytes());
        meta.extend_from_slice(payload);

        writer.write_all(&METADATA_INDICATOR.to_be_bytes())?;
        writer.write_all(&(meta.len() as u64).to_be_bytes())?;
        writer.write_all(&meta)?;
    }
    Ok(())
}

/// Scans a compressed file for its metadata stream, skipping every ordinary
/// data chunk along the way (spec §6 `-i` list command). `digest_len` and
/// `mac_len` come from the already-parsed file header, same convention as
/// [`crate::pipeline::scheduler::decompress_file`].
pub fn scan_metadata<R: Read>(reader: &mut R, digest_len: usize, mac_len: usize) -> Result<Vec<MetadataEntry>> {
    let mut blob = Vec::new();
    loop {
        let mut length_bytes = [0u8; 8];
        match reader.read(&mut length_bytes[..1]) {
            Ok(0) => break,
            Ok(_) => reader.read_exact(&mut length_bytes[1..])?,
            Err(e) => return Err(PcompressError::from(e)),
        }
        let length = u64::from_be_bytes(length_bytes);
        if length == END_OF_STREAM {
            break;
        }

        if length == METADATA_INDICATOR {
            let mut meta_len_bytes = [0u8; 8];
            reader.read_exact(&mut meta_len_bytes)?;
            let meta_len = u64::from_be_bytes(meta_len_bytes) as usize;
            let mut meta = vec![0u8; meta_len];
            reader.read_exact(&mut meta)?;
            if meta.len() < 9 {
                return Err(PcompressError::FrameParse("truncated metadata segment".into()));
            }
            let flag = meta[0];
            let orig_len = u64::from_be_bytes(meta[1..9].try_into().unwrap()) as usize;
            let payload = &meta[9..];
            if flag == 1 {
                let decompressed = decompress_block_to_vec(payload, orig_len);
                if decompressed.len() != orig_len {
                    return Err(PcompressError::FrameParse("metadata segment failed to decompress".into()));
                }
                blob.extend_from_slice(&decompressed);
            } else {
                blob.extend_from_slice(payload);
            }
            continue;
        }

        // An ordinary data chunk: skip it without materializing the payload.
        let mut fixed = vec![0u8; digest_len + mac_len + 1];
        reader.read_exact(&mut fixed)?;
        let flags = ChunkFlags::from_bits_truncate(*fixed.last().expect("fixed header is non-empty"));
        let mut payload = vec![0u8; length as usize];
        reader.read_exact(&mut payload)?;
        if flags.contains(ChunkFlags::VARIABLE_SIZE) {
            let mut trailing = [0u8; 8];
            reader.read_exact(&mut trailing)?;
        }
    }
    decode_entries(&blob)
}
