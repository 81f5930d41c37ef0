use super::{BLOCK_LEN, HASH_LEN, IV_LEN, KEY_LEN};
use crate::error::OpenError;
use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Decrypts the database body and checks it against the header content hash.
///
/// The content hash is a plain SHA-256 of the plaintext, not a MAC. A mismatch
/// most often means the password was wrong.
///
/// # Errors
///
/// - [`OpenError::Decryption`] if the body is empty, not block aligned or
///   carries invalid padding
/// - [`OpenError::Integrity`] if the plaintext hash does not match
pub fn decrypt(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    content_hash: &[u8; HASH_LEN],
    body: &[u8],
) -> Result<Zeroizing<Vec<u8>>, OpenError> {
    if body.is_empty() || body.len() % BLOCK_LEN != 0 {
        return Err(OpenError::Decryption);
    }

    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|e| OpenError::Unknown(format!("cipher setup failed: {e}")))?;

    let mut buf = Zeroizing::new(body.to_vec());
    let len = cipher
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|_| OpenError::Decryption)?
        .len();
    buf.truncate(len);

    if Sha256::digest(buf.as_slice()).as_slice() != content_hash {
        return Err(OpenError::Integrity);
    }

    tracing::trace!(plaintext_len = len, "body decrypted and verified");

    Ok(buf)
}
