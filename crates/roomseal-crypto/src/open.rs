//! Opening: transport payload in, plaintext out.
//!
//! Checks run in a fixed order, and the first failure wins:
//!
//! 1. Decode the payload (`MalformedPayload` / `MalformedEnvelope`)
//! 2. Find the reader's wrap (`NotARecipient`)
//! 3. Unwrap the body key (`Integrity { stage: KeyWrap }`)
//! 4. Decrypt the body (`Integrity { stage: Body }`)
//! 5. Interpret the body as UTF-8 (`MalformedEnvelope`)
//!
//! Opening never mutates the payload, so it can be repeated any number of
//! times with the same result.

use roomseal_proto::{EnvelopeLimits, TransportPayload};

use crate::{
    error::{EnvelopeError, IntegrityStage},
    keys::{KeyPair, PublicKey},
    symmetric, wrap,
};

/// A successfully opened message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedMessage {
    /// Who sealed the message. Authenticated: the body and the reader's wrap
    /// only verify under this key.
    pub sender: PublicKey,
    /// The decrypted text
    pub plaintext: String,
}

/// Decrypt `payload` as `reader`, with default limits.
///
/// # Errors
///
/// See [`open_with`].
pub fn open(payload: &TransportPayload, reader: &KeyPair) -> Result<String, EnvelopeError> {
    open_message(payload, reader).map(|opened| opened.plaintext)
}

/// Decrypt `payload` as `reader` and report the authenticated sender.
///
/// # Errors
///
/// See [`open_with`].
pub fn open_message(
    payload: &TransportPayload,
    reader: &KeyPair,
) -> Result<OpenedMessage, EnvelopeError> {
    open_with(&EnvelopeLimits::default(), payload, reader)
}

/// Decrypt `payload` as `reader` under explicit limits.
///
/// # Errors
///
/// - `MalformedPayload`: not decodable or decompressible
/// - `MalformedEnvelope`: structure invalid, or body is not UTF-8
/// - `NotARecipient`: no wrap addressed to `reader`
/// - `Integrity`: the reader's wrap or the body failed authentication
pub fn open_with(
    limits: &EnvelopeLimits,
    payload: &TransportPayload,
    reader: &KeyPair,
) -> Result<OpenedMessage, EnvelopeError> {
    let envelope = payload.decode(limits)?;
    let sender = PublicKey::from_bytes(envelope.sender_public_key);

    let Some(own_wrap) = envelope.recipient(reader.public_key().as_bytes()) else {
        tracing::debug!(
            recipients = envelope.recipients.len(),
            "envelope not addressed to reader"
        );
        return Err(EnvelopeError::NotARecipient);
    };

    let body_key = wrap::unwrap_key(own_wrap, &sender, reader).inspect_err(|_| {
        tracing::warn!(%sender, "key wrap failed authentication");
    })?;

    let Some(plaintext) = symmetric::decrypt(
        body_key.as_bytes(),
        &envelope.ciphertext_nonce,
        &wrap::body_aad(&sender, &envelope.recipients),
        &envelope.ciphertext,
    ) else {
        tracing::warn!(%sender, "message body failed authentication");
        return Err(EnvelopeError::Integrity { stage: IntegrityStage::Body });
    };

    let plaintext = String::from_utf8(plaintext).map_err(|e| EnvelopeError::MalformedEnvelope {
        reason: format!("decrypted body is not UTF-8: {}", e.utf8_error()),
    })?;

    tracing::debug!(%sender, payload_len = payload.len(), "opened envelope");

    Ok(OpenedMessage { sender, plaintext })
}
