//! Outcome of opening one message from the room history.

use roomseal_crypto::{EnvelopeError, OpenedMessage, PublicKey};

/// Shown in place of a message addressed to us that failed to open.
pub const UNREADABLE_PLACEHOLDER: &str = "Unable to decrypt message";

/// Shown in place of a message that was never addressed to us.
pub const NOT_ADDRESSED_PLACEHOLDER: &str = "Message not addressed to you";

/// One received payload, classified for display.
///
/// A failure here is local to the message: the rest of the history still
/// renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceivedMessage {
    /// Opened and verified.
    Readable(OpenedMessage),

    /// Sealed for other participants only.
    ///
    /// Normal in rooms whose membership changed after the message was sent.
    NotAddressed,

    /// Could not be opened: malformed, tampered, or not verifiable.
    Unreadable(EnvelopeError),
}

impl ReceivedMessage {
    /// Plaintext, or a placeholder for messages that could not be read.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Readable(opened) => &opened.plaintext,
            Self::NotAddressed => NOT_ADDRESSED_PLACEHOLDER,
            Self::Unreadable(_) => UNREADABLE_PLACEHOLDER,
        }
    }

    /// Authenticated sender, if the message was readable.
    pub fn sender(&self) -> Option<&PublicKey> {
        match self {
            Self::Readable(opened) => Some(&opened.sender),
            Self::NotAddressed | Self::Unreadable(_) => None,
        }
    }

    /// True if the message was readable and sealed by `key`.
    pub fn is_from(&self, key: &PublicKey) -> bool {
        self.sender() == Some(key)
    }

    /// True if opening succeeded.
    pub fn is_readable(&self) -> bool {
        matches!(self, Self::Readable(_))
    }

    pub(crate) fn from_result(result: Result<OpenedMessage, EnvelopeError>) -> Self {
        match result {
            Ok(opened) => Self::Readable(opened),
            Err(EnvelopeError::NotARecipient) => Self::NotAddressed,
            Err(err) => Self::Unreadable(err),
        }
    }
}
