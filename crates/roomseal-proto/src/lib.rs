//! Wire format for roomseal envelopes.
//!
//! An envelope travels as one opaque text string:
//!
//! ```text
//! Envelope ──CBOR──▶ bytes ──zlib/DEFLATE──▶ bytes ──base64──▶ TransportPayload
//! ```
//!
//! This crate owns that shape and nothing else. It knows the field sizes of
//! the cryptographic material it carries, but never touches keys or ciphers.
//! Every function here is pure and stateless.
//!
//! # Security
//!
//! Decoding is strict. Inputs above [`EnvelopeLimits`] are rejected before any
//! work is done, decompression never returns partial output, and a decoded
//! [`Envelope`] has passed structural validation (field sizes, non-empty and
//! duplicate-free recipient list) before the caller ever sees it.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod envelope;
pub mod errors;
pub mod limits;
pub mod payload;

pub use envelope::{
    Envelope, NONCE_SIZE, PUBLIC_KEY_SIZE, RecipientWrap, SYMMETRIC_KEY_SIZE, TAG_SIZE,
    WRAPPED_KEY_SIZE,
};
pub use errors::{ProtocolError, Result};
pub use limits::EnvelopeLimits;
pub use payload::TransportPayload;
