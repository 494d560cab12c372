//! Error types for sealing and opening envelopes

use std::fmt;

use roomseal_proto::ProtocolError;
use thiserror::Error;

/// Which authenticated decryption step rejected the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityStage {
    /// The recipient's wrapped symmetric key did not authenticate
    KeyWrap,
    /// The message body did not authenticate under the unwrapped key
    Body,
}

impl fmt::Display for IntegrityStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyWrap => f.write_str("key wrap"),
            Self::Body => f.write_str("message body"),
        }
    }
}

/// Errors from envelope operations
///
/// Every error is local to one `seal` or `open` call. None of them carries key
/// material, nonces or plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// `seal` was called with an empty recipient set
    #[error("no recipients supplied")]
    NoRecipients,

    /// Key material is malformed or unusable
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// What was wrong with the key
        reason: String,
    },

    /// More distinct recipients than the configured limit
    #[error("too many recipients: {count} (max {max})")]
    TooManyRecipients {
        /// Distinct recipients requested
        count: usize,
        /// Configured maximum
        max: usize,
    },

    /// Sealed payload would exceed the configured transport limit
    #[error("message too large: payload would be {size} bytes (max {max})")]
    MessageTooLarge {
        /// Size of the encoded payload
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Transport string failed to decode or decompress
    #[error("malformed payload: {reason}")]
    MalformedPayload {
        /// Decoder diagnostic
        reason: String,
    },

    /// Envelope structure is missing fields or mis-sized
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope {
        /// Parser diagnostic
        reason: String,
    },

    /// The reader's public key is not among the envelope's recipients
    #[error("not a recipient of this message")]
    NotARecipient,

    /// Authenticated decryption failed (tamper, corruption or key mismatch)
    #[error("integrity check failed: {stage}")]
    Integrity {
        /// Step that rejected the envelope
        stage: IntegrityStage,
    },
}

impl EnvelopeError {
    /// Returns true if the caller supplied bad input to `seal`.
    ///
    /// These are bugs on the calling side and will fail again on retry.
    pub fn is_caller_error(&self) -> bool {
        match self {
            Self::NoRecipients => true,
            Self::InvalidKey { .. } => true,
            Self::TooManyRecipients { .. } => true,
            Self::MessageTooLarge { .. } => true,

            Self::MalformedPayload { .. } => false,
            Self::MalformedEnvelope { .. } => false,
            Self::NotARecipient => false,
            Self::Integrity { .. } => false,
        }
    }

    /// Returns true if a message addressed to the reader failed
    /// verification.
    ///
    /// Stronger signal than [`EnvelopeError::NotARecipient`], which is the
    /// normal outcome for messages meant for someone else.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }

    pub(crate) fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey { reason: reason.into() }
    }
}

impl From<ProtocolError> for EnvelopeError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::MalformedEncoding { reason }
            | ProtocolError::MalformedPayload { reason } => Self::MalformedPayload { reason },
            ProtocolError::PayloadTooLarge { size, max } => {
                Self::MalformedPayload { reason: format!("{size} bytes exceeds limit of {max}") }
            },
            ProtocolError::MalformedEnvelope { reason }
            | ProtocolError::Serialization { reason } => Self::MalformedEnvelope { reason },
        }
    }
}
