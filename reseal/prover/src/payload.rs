//! Payload encryption under the asset's master key.
//!
//! The master key protects the asset's actual content (the "ciphertext
//! blob" uploaded to blob storage next to the public image). Format:
//! `nonce (12 bytes) || ChaCha20-Poly1305(plaintext) || tag (16 bytes)`.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand_core::{CryptoRng, RngCore};

use reseal_primitives::{Error, AEAD_TAG_SIZE};

use crate::keys::MasterKey;

/// Size of ChaCha20-Poly1305 nonce in bytes
pub const NONCE_SIZE: usize = 12;

fn cipher(master: &MasterKey) -> ChaCha20Poly1305 {
    ChaCha20Poly1305::new(Key::from_slice(master.as_bytes()))
}

/// Encrypt an asset payload. A random nonce is drawn from `rng` for every call.
///
/// # Errors
/// Returns `Error::Malformed` only if the AEAD itself fails, which it does not
/// for in-memory buffers.
pub fn encrypt_payload<R: RngCore + CryptoRng>(
    master: &MasterKey,
    plaintext: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>, Error> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher(master)
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| Error::Malformed("payload encrypt"))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt an asset payload produced by [`encrypt_payload`].
///
/// # Errors
/// * `Error::DecryptionFailure` - truncated input, wrong key, or tampered data
pub fn decrypt_payload(master: &MasterKey, data: &[u8]) -> Result<Vec<u8>, Error> {
    if data.len() < NONCE_SIZE + AEAD_TAG_SIZE {
        return Err(Error::DecryptionFailure);
    }
    cipher(master)
        .decrypt(Nonce::from_slice(&data[..NONCE_SIZE]), &data[NONCE_SIZE..])
        .map_err(|_| Error::DecryptionFailure)
}
