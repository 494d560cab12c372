//! Message body encryption using `XChaCha20-Poly1305`
//!
//! Each message gets its own [`SymmetricKey`]. The body is encrypted once
//! under it. The same AEAD also seals the body key inside each recipient wrap.

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use roomseal_proto::{NONCE_SIZE, SYMMETRIC_KEY_SIZE};
use zeroize::Zeroize;

use crate::env::RandomSource;

/// One-time body key.
///
/// Generated fresh for every sealed message and zeroized on drop. Never
/// reused across messages.
pub struct SymmetricKey([u8; SYMMETRIC_KEY_SIZE]);

impl SymmetricKey {
    /// Draw a fresh key from the randomness source.
    pub fn generate<R: RandomSource>(rng: &R) -> Self {
        Self(rng.random_array())
    }

    /// Wrap raw key bytes (as recovered from a recipient wrap).
    pub fn from_bytes(bytes: [u8; SYMMETRIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// 32-byte key for `XChaCha20-Poly1305`.
    pub fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.0
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Encrypt `plaintext` under `key`, binding `aad`.
///
/// Returns the ciphertext with its 16-byte tag appended.
pub fn encrypt(
    key: &[u8; SYMMETRIC_KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
    plaintext: &[u8],
) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new(key.into());

    let Ok(ciphertext) =
        cipher.encrypt(XNonce::from_slice(nonce), Payload { msg: plaintext, aad })
    else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    ciphertext
}

/// Decrypt and authenticate `ciphertext` under `key`.
///
/// Returns `None` if the tag does not verify: wrong key, wrong nonce, wrong
/// associated data, or modified ciphertext. The causes are indistinguishable.
pub fn decrypt(
    key: &[u8; SYMMETRIC_KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
    ciphertext: &[u8],
) -> Option<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(key.into());
    cipher.decrypt(XNonce::from_slice(nonce), Payload { msg: ciphertext, aad }).ok()
}
