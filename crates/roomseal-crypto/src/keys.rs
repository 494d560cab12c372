//! Participant identity keys.
//!
//! Each participant owns one X25519 [`KeyPair`]. The public half is shared
//! with the room (it addresses wraps and authenticates the sender); the secret
//! half never leaves the participant.
//!
//! Keys have a text form (standard base64) for publishing the public key to a
//! profile and for handing the secret key to the platform's secure storage.

use std::{fmt, str::FromStr};

use roomseal_proto::{PUBLIC_KEY_SIZE, codec};
use serde::{Deserialize, Serialize};
use x25519_dalek::{SharedSecret, StaticSecret};
use zeroize::Zeroize;

use crate::{
    env::{RandomSource, SystemRandom},
    error::EnvelopeError,
};

/// X25519 secret key size (32 bytes)
pub const SECRET_KEY_SIZE: usize = 32;

/// A participant's public key.
///
/// Compared byte-for-byte; two keys are the same identity iff their bytes are
/// equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    /// Wrap raw key bytes.
    pub const fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse key bytes of unchecked length.
    ///
    /// # Errors
    ///
    /// - `InvalidKey`: slice is not exactly 32 bytes
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, EnvelopeError> {
        let bytes: [u8; PUBLIC_KEY_SIZE] = slice.try_into().map_err(|_| {
            EnvelopeError::invalid_key(format!(
                "public key must be {PUBLIC_KEY_SIZE} bytes, got {}",
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Parse the base64 form published in profiles.
    ///
    /// # Errors
    ///
    /// - `InvalidKey`: not base64, or wrong decoded length
    pub fn from_base64(text: &str) -> Result<Self, EnvelopeError> {
        let bytes = codec::decode_text(text)
            .map_err(|e| EnvelopeError::invalid_key(format!("public key: {e}")))?;
        Self::try_from_slice(&bytes)
    }

    /// Base64 form for publishing.
    pub fn to_base64(&self) -> String {
        codec::encode_text(&self.0)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Copy of the raw key bytes.
    pub fn to_bytes(self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0
    }

    fn to_dalek(self) -> x25519_dalek::PublicKey {
        x25519_dalek::PublicKey::from(self.0)
    }
}

impl From<[u8; PUBLIC_KEY_SIZE]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

impl FromStr for PublicKey {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64(s)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_base64()).finish()
    }
}

/// A participant's secret key.
///
/// Zeroized on drop. `Debug` never prints key bytes.
#[derive(Clone)]
pub struct SecretKey([u8; SECRET_KEY_SIZE]);

impl SecretKey {
    /// Wrap raw secret key bytes.
    pub fn from_bytes(bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse the base64 form returned by secure storage.
    ///
    /// # Errors
    ///
    /// - `InvalidKey`: not base64, or wrong decoded length
    pub fn from_base64(text: &str) -> Result<Self, EnvelopeError> {
        let mut bytes = codec::decode_text(text)
            .map_err(|e| EnvelopeError::invalid_key(format!("secret key: {e}")))?;

        let parsed: Result<[u8; SECRET_KEY_SIZE], _> = bytes.as_slice().try_into();
        let len = bytes.len();
        bytes.zeroize();

        parsed.map(Self).map_err(|_| {
            EnvelopeError::invalid_key(format!(
                "secret key must be {SECRET_KEY_SIZE} bytes, got {len}"
            ))
        })
    }

    /// Base64 form for secure storage.
    ///
    /// **Security Warning:** the returned string is the secret key.
    pub fn to_base64(&self) -> String {
        codec::encode_text(&self.0)
    }

    /// Raw secret key bytes.
    ///
    /// **Security Warning:** handle with care.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.0
    }

    /// Public key matching this secret key.
    pub fn public_key(&self) -> PublicKey {
        let secret = StaticSecret::from(self.0);
        PublicKey(*x25519_dalek::PublicKey::from(&secret).as_bytes())
    }

    /// X25519 key agreement with a peer.
    ///
    /// Returns `None` for non-contributory results (low-order peer keys such
    /// as all zeros), which would give an attacker-known shared secret.
    pub(crate) fn diffie_hellman(&self, peer: &PublicKey) -> Option<SharedSecret> {
        let secret = StaticSecret::from(self.0);
        let shared = secret.diffie_hellman(&peer.to_dalek());
        shared.was_contributory().then_some(shared)
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// A matched public/secret key pair for one participant.
///
/// # Invariants
///
/// - `public` is derived from `secret`; the two are never mixed across
///   identities
#[derive(Clone)]
pub struct KeyPair {
    public: PublicKey,
    secret: SecretKey,
}

impl KeyPair {
    /// Generate a fresh key pair from OS entropy.
    pub fn generate() -> Self {
        Self::generate_with(&SystemRandom)
    }

    /// Generate a fresh key pair from the given randomness source.
    pub fn generate_with<R: RandomSource>(rng: &R) -> Self {
        let mut bytes: [u8; SECRET_KEY_SIZE] = rng.random_array();
        let secret = SecretKey::from_bytes(bytes);
        bytes.zeroize();
        Self::from_secret_key(secret)
    }

    /// Rebuild the pair from a stored secret key.
    pub fn from_secret_key(secret: SecretKey) -> Self {
        Self { public: secret.public_key(), secret }
    }

    /// Rebuild the pair from its text form.
    ///
    /// # Errors
    ///
    /// - `InvalidKey`: either key fails to parse, or the public key does not
    ///   belong to the secret key
    pub fn from_encoded(encoded: &EncodedKeyPair) -> Result<Self, EnvelopeError> {
        let secret = SecretKey::from_base64(&encoded.secret_key)?;
        let claimed = PublicKey::from_base64(&encoded.public_key)?;
        let pair = Self::from_secret_key(secret);

        if pair.public != claimed {
            return Err(EnvelopeError::invalid_key("public key does not match secret key"));
        }
        Ok(pair)
    }

    /// Text form of both halves.
    pub fn to_encoded(&self) -> EncodedKeyPair {
        EncodedKeyPair {
            public_key: self.public.to_base64(),
            secret_key: self.secret.to_base64(),
        }
    }

    /// Public half, safe to share.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Secret half, never transmitted.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").field("public", &self.public).finish_non_exhaustive()
    }
}

/// Generate a fresh, independent key pair from OS entropy.
pub fn generate_key_pair() -> KeyPair {
    KeyPair::generate()
}

/// Base64 text form of a [`KeyPair`].
///
/// Serialized as `{ "publicKey": ..., "secretKey": ... }`. The secret string
/// is zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedKeyPair {
    /// Base64 public key
    pub public_key: String,
    /// Base64 secret key
    pub secret_key: String,
}

impl Drop for EncodedKeyPair {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

impl fmt::Debug for EncodedKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedKeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
