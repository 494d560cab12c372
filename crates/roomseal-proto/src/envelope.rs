//! Envelope payload types.
//!
//! An [`Envelope`] carries one message body encrypted once under a fresh
//! symmetric key, plus one [`RecipientWrap`] per reader holding that key
//! encrypted for them. The envelope is self-describing: a reader needs only
//! their own key pair to attempt decryption.
//!
//! Field names are serialized in camelCase (`senderPublicKey`,
//! `recipients[].keyNonce`, ...) so the CBOR map matches the documented
//! envelope layout.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{ProtocolError, Result},
    limits::EnvelopeLimits,
};

/// X25519 public key size (32 bytes)
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Symmetric body key size (32 bytes)
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// `XChaCha20` nonce size (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// Wrapped symmetric key size: key plus tag (48 bytes)
pub const WRAPPED_KEY_SIZE: usize = SYMMETRIC_KEY_SIZE + TAG_SIZE;

/// Sealed message envelope.
///
/// # Invariants
///
/// - `recipients` is non-empty and holds at most one entry per distinct
///   `recipient_public_key`
/// - Every wrap encrypts the same symmetric key, and that key is the only key
///   that opens `ciphertext`
/// - Immutable once built: readers decode their own copy and never write back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Sender's X25519 public key.
    /// Readers combine it with their secret key to unwrap the body key.
    pub sender_public_key: [u8; PUBLIC_KEY_SIZE],

    /// Message body including 16-byte Poly1305 authentication tag.
    pub ciphertext: Vec<u8>,

    /// Nonce used for the body encryption (24 bytes, random).
    pub ciphertext_nonce: [u8; NONCE_SIZE],

    /// One wrap per intended reader.
    pub recipients: Vec<RecipientWrap>,
}

/// The body key, wrapped for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientWrap {
    /// Which reader this wrap is for
    pub recipient_public_key: [u8; PUBLIC_KEY_SIZE],

    /// Symmetric key encrypted to the recipient (48 bytes: key + tag)
    pub encrypted_symmetric_key: Vec<u8>,

    /// Nonce used for this wrap (24 bytes, random)
    pub key_nonce: [u8; NONCE_SIZE],
}

impl Envelope {
    /// Find the wrap addressed to `public_key`.
    ///
    /// Linear scan: rooms are small and the list is short.
    pub fn recipient(&self, public_key: &[u8; PUBLIC_KEY_SIZE]) -> Option<&RecipientWrap> {
        self.recipients.iter().find(|wrap| &wrap.recipient_public_key == public_key)
    }

    /// Body length without the authentication tag.
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_SIZE)
    }

    /// Check structural invariants that serde cannot express.
    ///
    /// Fixed-size fields are already enforced by deserialization; this covers
    /// variable-length fields and the recipient list.
    ///
    /// # Errors
    ///
    /// - `MalformedEnvelope`: empty or oversized recipient list, duplicate
    ///   recipient, mis-sized wrapped key, or ciphertext shorter than a tag
    pub fn validate(&self, limits: &EnvelopeLimits) -> Result<()> {
        if self.ciphertext.len() < TAG_SIZE {
            return Err(ProtocolError::envelope(format!(
                "ciphertext is {} bytes, shorter than the {TAG_SIZE}-byte tag",
                self.ciphertext.len()
            )));
        }

        if self.recipients.is_empty() {
            return Err(ProtocolError::envelope("no recipients"));
        }

        if self.recipients.len() > limits.max_recipients {
            return Err(ProtocolError::envelope(format!(
                "{} recipients exceeds limit of {}",
                self.recipients.len(),
                limits.max_recipients
            )));
        }

        let mut seen = HashSet::with_capacity(self.recipients.len());
        for (index, wrap) in self.recipients.iter().enumerate() {
            if wrap.encrypted_symmetric_key.len() != WRAPPED_KEY_SIZE {
                return Err(ProtocolError::envelope(format!(
                    "recipient {index}: wrapped key is {} bytes, expected {WRAPPED_KEY_SIZE}",
                    wrap.encrypted_symmetric_key.len()
                )));
            }

            if !seen.insert(wrap.recipient_public_key) {
                return Err(ProtocolError::envelope(format!(
                    "recipient {index}: duplicate recipient public key"
                )));
            }
        }

        Ok(())
    }
}
