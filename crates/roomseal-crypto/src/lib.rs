//! Roomseal Envelope Encryption
//!
//! End-to-end encryption of one message for many readers. The relay that
//! stores and forwards messages only ever sees an opaque transport string.
//!
//! # Sealing
//!
//! ```text
//! plaintext
//!    │
//!    ▼
//! fresh Symmetric Key
//!    │
//!    ▼  for each distinct recipient
//! X25519 + HKDF → Wrap Key ──► XChaCha20-Poly1305 → encrypted symmetric key
//!    │
//!    ▼
//! XChaCha20-Poly1305 (aad = sender pk || digest of wraps) → ciphertext
//!    │
//!    ▼
//! Envelope → CBOR → DEFLATE → base64 → TransportPayload
//! ```
//!
//! Opening reverses the pipeline for a single reader: find the reader's wrap,
//! unwrap the symmetric key, decrypt the body.
//!
//! # Security
//!
//! Confidentiality:
//! - Only holders of a recipient secret key can unwrap the body key
//! - The body key is random per message and zeroized after use
//!
//! Authenticity:
//! - Every wrap and the body are AEAD-protected; any modified byte in a
//!   ciphertext, nonce or wrapped key is rejected
//! - The sender public key is bound into both the wrap derivation and the body
//!   associated data, so a message cannot be re-attributed
//! - The body associated data also covers every wrap, so a change to any
//!   recipient's entry is detected by all readers
//!
//! Freshness:
//! - Body key and all nonces are drawn fresh on every seal; identical inputs
//!   never produce identical payloads under a real entropy source
//!
//! Not provided: forward secrecy (a leaked secret key opens every past message
//! addressed to it) and recipient privacy (recipient public keys are visible
//! in the envelope).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod keys;
pub mod open;
pub mod seal;
pub mod symmetric;
pub mod wrap;

pub use env::{RandomSource, SeededRandom, SystemRandom};
pub use error::{EnvelopeError, IntegrityStage};
pub use keys::{EncodedKeyPair, KeyPair, PublicKey, SECRET_KEY_SIZE, SecretKey, generate_key_pair};
pub use open::{OpenedMessage, open, open_message, open_with};
pub use roomseal_proto::{EnvelopeLimits, TransportPayload};
pub use seal::{seal, seal_with};
