//! The transport string: what actually crosses the wire.
//!
//! ```text
//! encode:  Envelope → CBOR → compress → encode_text → TransportPayload
//! decode:  TransportPayload → decode_text → decompress → CBOR → validate → Envelope
//! ```
//!
//! The payload is opaque to everything outside this crate. The chat transport
//! stores and forwards it as a plain string.

use std::fmt;

use crate::{
    codec,
    envelope::Envelope,
    errors::{ProtocolError, Result},
    limits::EnvelopeLimits,
};

/// A serialized, compressed, text-encoded [`Envelope`].
///
/// Construction from an arbitrary string is allowed (that is how received
/// messages arrive); validity is only established by [`TransportPayload::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportPayload(String);

impl TransportPayload {
    /// Serialize, compress and text-encode an envelope.
    ///
    /// # Errors
    ///
    /// - `Serialization`: the CBOR writer rejected the envelope
    pub fn encode(envelope: &Envelope) -> Result<Self> {
        let serialized = serialize(envelope)?;
        let compressed = codec::compress(&serialized);
        Ok(Self(codec::encode_text(&compressed)))
    }

    /// Encode, refusing anything [`TransportPayload::decode`] would reject
    /// for size under the same limits.
    ///
    /// # Errors
    ///
    /// - `PayloadTooLarge`: serialized envelope exceeds
    ///   `limits.max_envelope_len`, or transport string exceeds
    ///   `limits.max_payload_len`
    /// - `Serialization`: the CBOR writer rejected the envelope
    pub fn encode_within(envelope: &Envelope, limits: &EnvelopeLimits) -> Result<Self> {
        let serialized = serialize(envelope)?;
        if serialized.len() > limits.max_envelope_len {
            return Err(ProtocolError::PayloadTooLarge {
                size: serialized.len(),
                max: limits.max_envelope_len,
            });
        }

        let payload = Self(codec::encode_text(&codec::compress(&serialized)));
        if payload.len() > limits.max_payload_len {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload.len(),
                max: limits.max_payload_len,
            });
        }
        Ok(payload)
    }

    /// Text-decode, decompress, parse and validate the envelope.
    ///
    /// # Errors
    ///
    /// - `PayloadTooLarge`: string longer than `limits.max_payload_len`
    /// - `MalformedEncoding`: not valid text encoding
    /// - `MalformedPayload`: corrupt or oversized compressed stream
    /// - `MalformedEnvelope`: missing, mis-sized or inconsistent fields, or
    ///   bytes left over after the envelope
    pub fn decode(&self, limits: &EnvelopeLimits) -> Result<Envelope> {
        if self.0.len() > limits.max_payload_len {
            return Err(ProtocolError::PayloadTooLarge {
                size: self.0.len(),
                max: limits.max_payload_len,
            });
        }

        let compressed = codec::decode_text(&self.0)?;
        let serialized = codec::decompress(&compressed, limits.max_envelope_len)?;

        let mut reader = serialized.as_slice();
        let envelope: Envelope = ciborium::from_reader(&mut reader)
            .map_err(|e| ProtocolError::envelope(e.to_string()))?;
        if !reader.is_empty() {
            return Err(ProtocolError::envelope("trailing bytes after envelope"));
        }
        envelope.validate(limits)?;

        Ok(envelope)
    }

    /// Borrow the transport string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the transport string in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty string (never a valid payload).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take ownership of the transport string.
    pub fn into_string(self) -> String {
        self.0
    }
}

fn serialize(envelope: &Envelope) -> Result<Vec<u8>> {
    let mut serialized = Vec::new();
    ciborium::into_writer(envelope, &mut serialized)
        .map_err(|e| ProtocolError::Serialization { reason: e.to_string() })?;
    Ok(serialized)
}

impl From<String> for TransportPayload {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TransportPayload {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<TransportPayload> for String {
    fn from(value: TransportPayload) -> Self {
        value.0
    }
}

impl AsRef<str> for TransportPayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransportPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
