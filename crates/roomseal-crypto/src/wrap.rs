//! Per-recipient wrapping of the body key.
//!
//! ```text
//! X25519(sender secret, recipient public)
//!        │
//!        ▼
//! HKDF-SHA256(info = label || sender pk || recipient pk) → Wrap Key
//!        │
//!        ▼
//! XChaCha20-Poly1305(wrap key, key nonce) → encrypted symmetric key
//! ```
//!
//! Both sides compute the same shared secret, so the reader recovers the wrap
//! key from their own secret key and the sender's public key. Binding both
//! public keys into the derivation means a wrap lifted into another envelope
//! (different sender) or relabelled for another reader no longer opens.

use hkdf::Hkdf;
use roomseal_proto::{NONCE_SIZE, RecipientWrap, SYMMETRIC_KEY_SIZE};
use sha2::{Digest, Sha256};
use x25519_dalek::SharedSecret;
use zeroize::Zeroize;

use crate::{
    error::{EnvelopeError, IntegrityStage},
    keys::{KeyPair, PublicKey},
    symmetric::{self, SymmetricKey},
};

/// Label used for wrap key derivation
const WRAP_KEY_LABEL: &[u8] = b"roomsealWrapV1";

/// Label for the recipient list digest bound into the body
const BODY_AAD_LABEL: &[u8] = b"roomsealBodyV1";

/// Key-encryption key for one (sender, recipient) pair.
struct WrapKey([u8; SYMMETRIC_KEY_SIZE]);

impl Drop for WrapKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

fn derive_wrap_key(shared: &SharedSecret, sender: &PublicKey, recipient: &PublicKey) -> WrapKey {
    let hkdf = Hkdf::<Sha256>::new(None, shared.as_bytes());

    // Capacity: 14 (label) + 32 (sender) + 32 (recipient) = 78
    let mut info = Vec::with_capacity(WRAP_KEY_LABEL.len() + 64);
    info.extend_from_slice(WRAP_KEY_LABEL);
    info.extend_from_slice(sender.as_bytes());
    info.extend_from_slice(recipient.as_bytes());

    let mut key = [0u8; SYMMETRIC_KEY_SIZE];
    let Ok(()) = hkdf.expand(&info, &mut key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    WrapKey(key)
}

/// Associated data for the message body.
///
/// `sender pk || SHA-256(label || for each wrap: recipient pk || key nonce ||
/// len(encrypted key) || encrypted key)`. Every reader recomputes it from
/// the envelope, so changing any wrap (not just the reader's own) breaks the
/// body tag for everyone.
pub fn body_aad(sender: &PublicKey, wraps: &[RecipientWrap]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(BODY_AAD_LABEL);
    for wrap in wraps {
        hasher.update(wrap.recipient_public_key);
        hasher.update(wrap.key_nonce);
        hasher.update((wrap.encrypted_symmetric_key.len() as u64).to_be_bytes());
        hasher.update(&wrap.encrypted_symmetric_key);
    }

    let mut aad = Vec::with_capacity(64);
    aad.extend_from_slice(sender.as_bytes());
    aad.extend_from_slice(&hasher.finalize());
    aad
}

/// Wrap `key` for `recipient`.
///
/// # Errors
///
/// - `InvalidKey`: `recipient` is a low-order point, so no secret can be
///   agreed with it
pub fn wrap_key(
    key: &SymmetricKey,
    sender: &KeyPair,
    recipient: &PublicKey,
    key_nonce: [u8; NONCE_SIZE],
) -> Result<RecipientWrap, EnvelopeError> {
    let shared = sender.secret_key().diffie_hellman(recipient).ok_or_else(|| {
        EnvelopeError::invalid_key(format!("recipient {recipient} is a low-order point"))
    })?;
    let wrap_key = derive_wrap_key(&shared, sender.public_key(), recipient);

    Ok(RecipientWrap {
        recipient_public_key: recipient.to_bytes(),
        encrypted_symmetric_key: symmetric::encrypt(&wrap_key.0, &key_nonce, &[], key.as_bytes()),
        key_nonce,
    })
}

/// Recover the body key from the reader's wrap.
///
/// # Errors
///
/// - `Integrity { stage: KeyWrap }`: the wrap does not authenticate for this
///   reader and sender, or the sender key is a low-order point
pub fn unwrap_key(
    wrap: &RecipientWrap,
    sender: &PublicKey,
    reader: &KeyPair,
) -> Result<SymmetricKey, EnvelopeError> {
    let rejected = || EnvelopeError::Integrity { stage: IntegrityStage::KeyWrap };

    let shared = reader.secret_key().diffie_hellman(sender).ok_or_else(rejected)?;
    let wrap_key = derive_wrap_key(&shared, sender, reader.public_key());

    let mut bytes =
        symmetric::decrypt(&wrap_key.0, &wrap.key_nonce, &[], &wrap.encrypted_symmetric_key)
            .ok_or_else(rejected)?;

    let parsed: Result<[u8; SYMMETRIC_KEY_SIZE], _> = bytes.as_slice().try_into();
    bytes.zeroize();

    parsed.map(SymmetricKey::from_bytes).map_err(|_| rejected())
}
