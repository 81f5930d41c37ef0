//! Cryptographic layer of the database format.
//!
//! Provides header decoding, master key derivation and body decryption.

pub mod cipher;
pub mod header;
pub mod kdf;

pub use cipher::decrypt;
pub use header::Header;
pub use kdf::{TransformParams, derive_key};

/// Length of the master seed (16 bytes).
pub const MASTER_SEED_LEN: usize = 16;
/// Length of the AES-CBC initialization vector (16 bytes).
pub const IV_LEN: usize = 16;
/// Length of the SHA-256 content hash (32 bytes).
pub const HASH_LEN: usize = 32;
/// Length of the key transform seed (32 bytes).
pub const TRANSFORM_SEED_LEN: usize = 32;
/// Length of the derived key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// AES block size.
pub const BLOCK_LEN: usize = 16;
