use aes::Aes256;
use aes::cipher::{BlockEncrypt, KeyInit, generic_array::GenericArray};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{BLOCK_LEN, KEY_LEN, MASTER_SEED_LEN, TRANSFORM_SEED_LEN};
use crate::error::OpenError;

/// Key stretching parameters stored in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformParams {
    seed: [u8; TRANSFORM_SEED_LEN],
    rounds: u32,
}

impl TransformParams {
    pub fn new(seed: [u8; TRANSFORM_SEED_LEN], rounds: u32) -> Self {
        Self { seed, rounds }
    }

    pub fn seed(&self) -> &[u8; TRANSFORM_SEED_LEN] {
        &self.seed
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }
}

/// Derives the body decryption key from a password.
///
/// `SHA256(password)` is encrypted `rounds` times with AES-256 keyed by the
/// transform seed (both 16-byte halves, ECB), hashed again, and finally hashed
/// together with the master seed.
pub fn derive_key(
    password: &[u8],
    master_seed: &[u8; MASTER_SEED_LEN],
    transform: &TransformParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, OpenError> {
    let cipher = Aes256::new_from_slice(&transform.seed).map_err(|_| OpenError::KeyDerivation)?;

    let mut stretched = Zeroizing::new([0u8; KEY_LEN]);
    stretched.copy_from_slice(&Sha256::digest(password));

    for _ in 0..transform.rounds {
        for block in stretched.chunks_exact_mut(BLOCK_LEN) {
            cipher.encrypt_block(GenericArray::from_mut_slice(block));
        }
    }

    let mut transformed = Zeroizing::new([0u8; KEY_LEN]);
    transformed.copy_from_slice(&Sha256::digest(stretched.as_slice()));

    let mut hasher = Sha256::new();
    hasher.update(master_seed);
    hasher.update(transformed.as_slice());

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&hasher.finalize());

    tracing::trace!(rounds = transform.rounds, "master key derived");

    Ok(key)
}
