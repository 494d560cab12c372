//! Room session errors

use roomseal_crypto::EnvelopeError;
use thiserror::Error;

/// Errors from sending into a room.
///
/// Receiving never fails as a whole; per-message failures are reported
/// through [`crate::ReceivedMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// Message was empty after trimming whitespace
    #[error("message is empty")]
    EmptyMessage,

    /// Sealing or key parsing failed
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_errors_display_transparently() {
        let err = RoomError::from(EnvelopeError::NoRecipients);
        assert_eq!(err.to_string(), EnvelopeError::NoRecipients.to_string());
    }
}
