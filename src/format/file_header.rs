//! File header (spec §6): 24-byte base header (name/version/flags/chunksize
//! /level/CRC32), extended with salt/nonce/key-length and an HMAC in place
//! of the trailing CRC32 when encryption is active.

use std::io::{Read, Write};

use crate::digest::crc32::crc32;
use crate::error::{PcompressError, Result};

pub const ALGO_NAME_LEN: usize = 8;
pub const FILE_FORMAT_VERSION: u16 = 1;

bitflags::bitflags! {
    /// FileFlags (spec §6), 16 bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileFlags: u16 {
        const DEDUP        = 0x0001;
        const DEDUP_FIXED  = 0x0002;
        const SINGLE_CHUNK = 0x0004;
        const ARCHIVE      = 0x0008;
        const META_STREAM  = 0x0010;
        const CIPHER_AES   = 0x0100;
        const CIPHER_SALSA = 0x0200;
        const CKSUM_MASK   = 0x0700;
    }
}

impl FileFlags {
    pub fn with_cksum_id(mut self, id: u16) -> Self {
        self.remove(FileFlags::CKSUM_MASK);
        self |= FileFlags::from_bits_truncate((id << 8) & FileFlags::CKSUM_MASK.bits());
        self
    }

    pub fn cksum_id(self) -> u16 {
        (self.bits() & FileFlags::CKSUM_MASK.bits()) >> 8
    }
}

#[derive(Debug, Clone)]
pub struct CipherHeader {
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub key_len: u32,
}

#[derive(Debug, Clone)]
pub struct FileHeader {
    pub algo_name: String,
    pub version: u16,
    pub flags: FileFlags,
    pub chunksize: u64,
    pub level: u32,
    pub cipher: Option<CipherHeader>,
}

impl FileHeader {
    /// Serializes the base 24-byte header plus, when `cipher` is set, the
    /// salt/nonce/key-length extension (spec §6 "File header (with
    /// encryption)"). The trailing integrity field (CRC32 or HMAC) is
    /// NOT written here: the caller computes it over these bytes and
    /// appends it, since the HMAC needs a key this module does not hold.
    pub fn encode_without_integrity(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(24);
        let mut name_bytes = [0u8; ALGO_NAME_LEN];
        let src = self.algo_name.as_bytes();
        let n = src.len().min(ALGO_NAME_LEN);
        name_bytes[..n].copy_from_slice(&src[..n]);
        out.extend_from_slice(&name_bytes);
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.flags.bits().to_be_bytes());
        out.extend_from_slice(&self.chunksize.to_be_bytes());
        out.extend_from_slice(&self.level.to_be_bytes());

        if let Some(cipher) = &self.cipher {
            out.extend_from_slice(&(cipher.salt.len() as u32).to_be_bytes());
            out.extend_from_slice(&cipher.salt);
            out.extend_from_slice(&cipher.nonce);
            out.extend_from_slice(&cipher.key_len.to_be_bytes());
        }
        out
    }

    /// Computes the plain (non-encrypted) integrity field: CRC32 of the 24
    /// base bytes (spec §6).
    pub fn crc32_integrity(&self) -> u32 {
        crc32(&self.encode_without_integrity())
    }

    /// Parses the base header plus, when `has_cipher` is known from the
    /// flags word, the cipher extension. Does not verify the trailing
    /// integrity field; callers do that with [`crate::crypto::mac`] or
    /// [`crc32_integrity`](Self::crc32_integrity) once the cipher is known.
    pub fn decode_base(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < 24 {
            return Err(PcompressError::FrameParse("file header shorter than 24 bytes".into()));
        }
        let algo_name = String::from_utf8_lossy(&bytes[0..8])
            .trim_end_matches('\0')
            .to_string();
        let version = u16::from_be_bytes(bytes[8..10].try_into().unwrap());
        let flags = FileFlags::from_bits_truncate(u16::from_be_bytes(bytes[10..12].try_into().unwrap()));
        let chunksize = u64::from_be_bytes(bytes[12..20].try_into().unwrap());
        let level = u32::from_be_bytes(bytes[20..24].try_into().unwrap());

        let mut cursor = 24;
        let cipher = if flags.intersects(FileFlags::CIPHER_AES | FileFlags::CIPHER_SALSA) {
            if bytes.len() < cursor + 4 {
                return Err(PcompressError::FrameParse("truncated cipher header (salt length)".into()));
            }
            let salt_len = u32::from_be_bytes(bytes[cursor..cursor + 4].try_into().unwrap()) as usize;
            cursor += 4;
            let salt = bytes
                .get(cursor..cursor + salt_len)
                .ok_or_else(|| PcompressError::FrameParse("truncated cipher header (salt)".into()))?
                .to_vec();
            cursor += salt_len;

            let nonce_len = if flags.contains(FileFlags::CIPHER_AES) { 8 } else { 24 };
            let nonce = bytes
                .get(cursor..cursor + nonce_len)
                .ok_or_else(|| PcompressError::FrameParse("truncated cipher header (nonce)".into()))?
                .to_vec();
            cursor += nonce_len;

            if bytes.len() < cursor + 4 {
                return Err(PcompressError::FrameParse("truncated cipher header (key length)".into()));
            }
            let key_len = u32::from_be_bytes(bytes[cursor..cursor + 4].try_into().unwrap());
            cursor += 4;
            Some(CipherHeader { salt, nonce, key_len })
        } else {
            None
        };

        Ok((
            FileHeader {
                algo_name,
                version,
                flags,
                chunksize,
                level,
                cipher,
            },
            cursor,
        ))
    }

    /// Writes this header followed by its trailing integrity field: an HMAC
    /// under `mac_key` when the cipher extension is present, otherwise the
    /// plain [`crc32_integrity`](Self::crc32_integrity).
    pub fn write_with_integrity<W: Write>(&self, writer: &mut W, mac_key: Option<&[u8]>) -> Result<()> {
        let bytes = self.encode_without_integrity();
        writer.write_all(&bytes)?;
        if let Some(key) = mac_key {
            let tag = crate::crypto::mac::hmac(key, &[&bytes]);
            writer.write_all(&tag)?;
        } else {
            writer.write_all(&self.crc32_integrity().to_be_bytes())?;
        }
        Ok(())
    }

    /// Reads and verifies a header straight off `reader`, field by field so
    /// no byte beyond the header and its integrity trailer is ever consumed
    /// (the caller needs the exact consumed length to seek the chunk-frame
    /// stream past it). `password` is required when the decoded flags carry
    /// a cipher extension.
    ///
    /// Returns the header plus the total number of bytes consumed (header +
    /// integrity trailer), so the caller can seek past it.
    pub fn read_and_verify<R: Read>(reader: &mut R, password: Option<&[u8]>) -> Result<(Self, u64)> {
        let mut base = [0u8; 24];
        reader.read_exact(&mut base)?;
        let mut bytes = base.to_vec();

        let flags_peek = FileFlags::from_bits_truncate(u16::from_be_bytes(base[10..12].try_into().unwrap()));
        if flags_peek.intersects(FileFlags::CIPHER_AES | FileFlags::CIPHER_SALSA) {
            let mut salt_len_bytes = [0u8; 4];
            reader.read_exact(&mut salt_len_bytes)?;
            bytes.extend_from_slice(&salt_len_bytes);
            let salt_len = u32::from_be_bytes(salt_len_bytes) as usize;
            let nonce_len = if flags_peek.contains(FileFlags::CIPHER_AES) { 8 } else { 24 };
            let mut rest = vec![0u8; salt_len + nonce_len + 4];
            reader.read_exact(&mut rest)?;
            bytes.extend_from_slice(&rest);
        }

        let (header, consumed) = Self::decode_base(&bytes)?;
        debug_assert_eq!(consumed, bytes.len());

        let integrity_len = if header.cipher.is_some() { crate::crypto::mac::MAC_LEN } else { 4 };
        let mut integrity = vec![0u8; integrity_len];
        reader.read_exact(&mut integrity)?;

        if let Some(cipher_hdr) = &header.cipher {
            let password = password
                .ok_or_else(|| PcompressError::CipherInit("encrypted file requires a password".into()))?;
            let key = crate::crypto::kdf::derive_key(password, &cipher_hdr.salt, cipher_hdr.key_len as usize)?;
            crate::crypto::mac::verify(&key, &[&bytes], &integrity, None)?;
        } else {
            let crc = u32::from_be_bytes(integrity.as_slice().try_into().unwrap());
            if crc != header.crc32_integrity() {
                return Err(PcompressError::HeaderCrcMismatch);
            }
        }

        Ok((header, (bytes.len() + integrity_len) as u64))
    }
}
