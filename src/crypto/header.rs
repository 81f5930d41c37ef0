//! Fixed 124-byte file header.
//!
//! ```text
//! SIG1 (4) | SIG2 (4) | FLAGS (4) | VERSION (4) | MASTER_SEED (16) | IV (16)
//! | GROUPS (4) | ENTRIES (4) | CONTENT_HASH (32) | TRANSFORM_SEED (32) | ROUNDS (4)
//! ```
//!
//! All integers are little-endian.

use super::{HASH_LEN, IV_LEN, MASTER_SEED_LEN, TRANSFORM_SEED_LEN, TransformParams};
use crate::error::OpenError;

pub const SIGNATURE_1: u32 = 0x9AA2_D903;
pub const SIGNATURE_2: u32 = 0xB54B_FB65;

/// Version written by KeePass 1.x.
pub const VERSION: u32 = 0x0003_0004;
const VERSION_MASK: u32 = 0xFFFF_FF00;

pub const FLAG_SHA2: u32 = 1;
pub const FLAG_RIJNDAEL: u32 = 2;
pub const FLAG_ARCFOUR: u32 = 4;
pub const FLAG_TWOFISH: u32 = 8;
const CIPHER_FLAGS: u32 = FLAG_RIJNDAEL | FLAG_ARCFOUR | FLAG_TWOFISH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    flags: u32,
    version: u32,
    master_seed: [u8; MASTER_SEED_LEN],
    iv: [u8; IV_LEN],
    group_count: u32,
    entry_count: u32,
    content_hash: [u8; HASH_LEN],
    transform: TransformParams,
}

impl Header {
    pub const LEN: usize = 4 + 4 + 4 + 4 + MASTER_SEED_LEN + IV_LEN + 4 + 4 + HASH_LEN
        + TRANSFORM_SEED_LEN
        + 4;

    /// Builds an AES header for the given layout and seeds.
    pub fn new(
        master_seed: [u8; MASTER_SEED_LEN],
        iv: [u8; IV_LEN],
        group_count: u32,
        entry_count: u32,
        content_hash: [u8; HASH_LEN],
        transform: TransformParams,
    ) -> Self {
        Self {
            flags: FLAG_SHA2 | FLAG_RIJNDAEL,
            version: VERSION,
            master_seed,
            iv,
            group_count,
            entry_count,
            content_hash,
            transform,
        }
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn master_seed(&self) -> &[u8; MASTER_SEED_LEN] {
        &self.master_seed
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }

    pub fn content_hash(&self) -> &[u8; HASH_LEN] {
        &self.content_hash
    }

    pub fn transform(&self) -> &TransformParams {
        &self.transform
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);

        buf.extend_from_slice(&SIGNATURE_1.to_le_bytes());
        buf.extend_from_slice(&SIGNATURE_2.to_le_bytes());
        buf.extend_from_slice(&self.flags.to_le_bytes());
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.master_seed);
        buf.extend_from_slice(&self.iv);
        buf.extend_from_slice(&self.group_count.to_le_bytes());
        buf.extend_from_slice(&self.entry_count.to_le_bytes());
        buf.extend_from_slice(&self.content_hash);
        buf.extend_from_slice(self.transform.seed());
        buf.extend_from_slice(&self.transform.rounds().to_le_bytes());

        buf
    }

    /// Decodes and validates the header, returning it with the body offset.
    ///
    /// # Errors
    ///
    /// - [`OpenError::Format`] if the input is too short, a signature is wrong
    ///   or the version is not a 1.x version
    /// - [`OpenError::UnsupportedCipher`] unless AES is the only cipher selected
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), OpenError> {
        if data.len() < Self::LEN {
            return Err(OpenError::Format("file too short"));
        }

        let mut reader = Reader { data, offset: 0 };

        if reader.u32() != SIGNATURE_1 || reader.u32() != SIGNATURE_2 {
            return Err(OpenError::Format("bad signature"));
        }

        let flags = reader.u32();
        let version = reader.u32();
        if version & VERSION_MASK != VERSION & VERSION_MASK {
            return Err(OpenError::Format("unsupported version"));
        }

        if flags & CIPHER_FLAGS != FLAG_RIJNDAEL {
            return Err(OpenError::UnsupportedCipher(flags));
        }

        let master_seed = reader.array();
        let iv = reader.array();
        let group_count = reader.u32();
        let entry_count = reader.u32();
        let content_hash = reader.array();
        let transform_seed = reader.array();
        let rounds = reader.u32();

        Ok((
            Header {
                flags,
                version,
                master_seed,
                iv,
                group_count,
                entry_count,
                content_hash,
                transform: TransformParams::new(transform_seed, rounds),
            },
            reader.offset,
        ))
    }
}

/// Sequential reader over a buffer already checked to hold a full header.
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl Reader<'_> {
    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.offset..self.offset + N]);
        self.offset += N;
        out
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.array())
    }
}
