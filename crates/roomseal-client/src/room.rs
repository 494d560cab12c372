//! A participant's view of one chat room.
//!
//! The session pairs the local identity with the public keys of everyone
//! currently in the room. Outgoing messages are sealed for all of them plus
//! the local identity; incoming payloads are opened one at a time.

use roomseal_crypto::{
    EnvelopeLimits, KeyPair, PublicKey, RandomSource, SystemRandom, TransportPayload, open_with,
    seal_with,
};

use crate::{error::RoomError, message::ReceivedMessage};

/// Sealing and opening for one room.
///
/// # Invariants
///
/// - `participants` holds each public key at most once
/// - Every message this session seals is readable by its own identity,
///   whether or not that identity is listed in `participants`
pub struct RoomSession {
    identity: KeyPair,
    participants: Vec<PublicKey>,
    limits: EnvelopeLimits,
}

impl RoomSession {
    /// Create a session with the given participants.
    ///
    /// Duplicate keys are dropped; the first occurrence keeps its position.
    pub fn new(identity: KeyPair, participants: impl IntoIterator<Item = PublicKey>) -> Self {
        let mut session =
            Self { identity, participants: Vec::new(), limits: EnvelopeLimits::default() };
        for key in participants {
            session.add_participant(key);
        }
        session
    }

    /// Create a session from public keys in their published base64 form.
    ///
    /// # Errors
    ///
    /// - `Envelope(InvalidKey)`: a published key does not parse
    pub fn from_published<S: AsRef<str>>(
        identity: KeyPair,
        published: &[S],
    ) -> Result<Self, RoomError> {
        let keys = published
            .iter()
            .map(|text| PublicKey::from_base64(text.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(identity, keys))
    }

    /// Replace the size limits used for sealing and opening.
    #[must_use]
    pub fn with_limits(mut self, limits: EnvelopeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Local identity's public key.
    pub fn identity(&self) -> &PublicKey {
        self.identity.public_key()
    }

    /// Current participants, in join order.
    pub fn participants(&self) -> &[PublicKey] {
        &self.participants
    }

    /// Add a participant. Returns false if already present.
    ///
    /// Only changes the recipient list for messages sealed after this call.
    pub fn add_participant(&mut self, key: PublicKey) -> bool {
        if self.participants.contains(&key) {
            return false;
        }
        self.participants.push(key);
        true
    }

    /// Remove a participant. Returns false if not present.
    ///
    /// Only changes the recipient list for messages sealed after this call.
    pub fn remove_participant(&mut self, key: &PublicKey) -> bool {
        let before = self.participants.len();
        self.participants.retain(|existing| existing != key);
        self.participants.len() != before
    }

    /// Seal `content` for every participant and the local identity.
    ///
    /// Leading and trailing whitespace is trimmed before sealing.
    ///
    /// # Errors
    ///
    /// - `EmptyMessage`: nothing left after trimming
    /// - `Envelope`: sealing failed (low-order participant key, limits)
    pub fn seal_message(&self, content: &str) -> Result<TransportPayload, RoomError> {
        self.seal_message_with(&SystemRandom, content)
    }

    /// [`RoomSession::seal_message`] with an explicit randomness source.
    ///
    /// # Errors
    ///
    /// See [`RoomSession::seal_message`].
    pub fn seal_message_with<R: RandomSource>(
        &self,
        rng: &R,
        content: &str,
    ) -> Result<TransportPayload, RoomError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(RoomError::EmptyMessage);
        }

        let payload =
            seal_with(rng, &self.limits, content, &self.identity, &self.recipients())?;

        tracing::debug!(
            participants = self.participants.len(),
            payload_len = payload.len(),
            "sealed room message"
        );
        Ok(payload)
    }

    /// Open one payload from the room history.
    pub fn open_message(&self, payload: &TransportPayload) -> ReceivedMessage {
        let result = open_with(&self.limits, payload, &self.identity);
        let received = ReceivedMessage::from_result(result);

        if let ReceivedMessage::Unreadable(err) = &received {
            tracing::warn!(error = %err, payload_len = payload.len(), "unreadable room message");
        }
        received
    }

    /// Open each payload independently, preserving order.
    pub fn open_history<'a>(
        &self,
        payloads: impl IntoIterator<Item = &'a TransportPayload>,
    ) -> Vec<ReceivedMessage> {
        payloads.into_iter().map(|payload| self.open_message(payload)).collect()
    }

    /// Local identity first, then participants. Duplicates are collapsed by
    /// the sealer.
    fn recipients(&self) -> Vec<PublicKey> {
        let mut recipients = Vec::with_capacity(self.participants.len() + 1);
        recipients.push(*self.identity.public_key());
        recipients.extend_from_slice(&self.participants);
        recipients
    }
}

impl std::fmt::Debug for RoomSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSession")
            .field("identity", self.identity.public_key())
            .field("participants", &self.participants.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use roomseal_crypto::EnvelopeError;

    use super::*;

    #[test]
    fn duplicate_participants_are_dropped() {
        let bob = *KeyPair::generate().public_key();
        let mut session = RoomSession::new(KeyPair::generate(), [bob, bob]);

        assert_eq!(session.participants(), &[bob]);
        assert!(!session.add_participant(bob));
    }

    #[test]
    fn remove_participant_reports_presence() {
        let bob = *KeyPair::generate().public_key();
        let mut session = RoomSession::new(KeyPair::generate(), [bob]);

        assert!(session.remove_participant(&bob));
        assert!(!session.remove_participant(&bob));
        assert!(session.participants().is_empty());
    }

    #[test]
    fn list_edits_only_change_later_recipients() {
        let bob = KeyPair::generate();
        let mut session = RoomSession::new(KeyPair::generate(), [*bob.public_key()]);

        let earlier = session.seal_message("before").unwrap();
        assert!(session.remove_participant(bob.public_key()));
        let later = session.seal_message("after").unwrap();

        let opened = open_with(&EnvelopeLimits::default(), &earlier, &bob).unwrap();
        assert_eq!(opened.plaintext, "before");
        assert_eq!(
            open_with(&EnvelopeLimits::default(), &later, &bob).unwrap_err(),
            EnvelopeError::NotARecipient
        );
    }

    #[test]
    fn whitespace_only_message_is_rejected() {
        let session = RoomSession::new(KeyPair::generate(), []);
        assert_eq!(session.seal_message("  \n\t ").unwrap_err(), RoomError::EmptyMessage);
    }

    #[test]
    fn content_is_trimmed() {
        let session = RoomSession::new(KeyPair::generate(), []);
        let payload = session.seal_message("  hello  \n").unwrap();

        assert_eq!(session.open_message(&payload).display_text(), "hello");
    }

    #[test]
    fn sender_always_reads_own_message() {
        let bob = *KeyPair::generate().public_key();
        let session = RoomSession::new(KeyPair::generate(), [bob]);

        let payload = session.seal_message("mine").unwrap();
        let received = session.open_message(&payload);

        assert!(received.is_from(session.identity()));
        assert_eq!(received.display_text(), "mine");
    }

    #[test]
    fn invalid_published_key_is_rejected() {
        let result = RoomSession::from_published(KeyPair::generate(), &["not-a-key"]);
        assert!(matches!(result, Err(RoomError::Envelope(EnvelopeError::InvalidKey { .. }))));
    }

    #[test]
    fn limits_apply_to_sealing() {
        let limits = EnvelopeLimits { max_envelope_len: 256, ..Default::default() };
        let session = RoomSession::new(KeyPair::generate(), []).with_limits(limits);

        let result = session.seal_message(&"x".repeat(1024));
        assert!(matches!(
            result,
            Err(RoomError::Envelope(EnvelopeError::MessageTooLarge { max: 256, .. }))
        ));
    }

    #[test]
    fn debug_hides_secret_key() {
        let identity = KeyPair::generate();
        let secret = identity.secret_key().to_base64();
        let session = RoomSession::new(identity, []);

        assert!(!format!("{session:?}").contains(&secret));
    }
}
