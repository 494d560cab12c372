//! Error types for the envelope wire format.

use thiserror::Error;

/// Result alias for wire format operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding a transport payload.
///
/// The variants follow the decode pipeline: text decoding, decompression,
/// then structure parsing. Callers that only care about "foreign or corrupt
/// message" can use [`ProtocolError::is_structural`] to tell the two halves
/// apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Input is not valid text-safe encoding
    #[error("malformed encoding: {reason}")]
    MalformedEncoding {
        /// Decoder diagnostic
        reason: String,
    },

    /// Compressed stream is corrupt, truncated or oversized
    #[error("malformed payload: {reason}")]
    MalformedPayload {
        /// Decompressor diagnostic
        reason: String,
    },

    /// Decompressed bytes do not describe a valid envelope
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope {
        /// What was missing or mis-sized
        reason: String,
    },

    /// Transport string exceeds the configured limit
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Actual size
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Envelope could not be serialized
    #[error("serialization failed: {reason}")]
    Serialization {
        /// Serializer diagnostic
        reason: String,
    },
}

impl ProtocolError {
    /// Returns true if the bytes decoded and decompressed but the envelope
    /// structure itself is invalid.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MalformedEnvelope { .. })
    }

    pub(crate) fn envelope(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope { reason: reason.into() }
    }

    pub(crate) fn payload(reason: impl Into<String>) -> Self {
        Self::MalformedPayload { reason: reason.into() }
    }
}
