//! Sealing: plaintext in, transport payload out.

use std::collections::HashSet;

use roomseal_proto::{Envelope, EnvelopeLimits, ProtocolError, TransportPayload};

use crate::{
    env::{RandomSource, SystemRandom},
    error::EnvelopeError,
    keys::{KeyPair, PublicKey},
    symmetric::{self, SymmetricKey},
    wrap,
};

/// Encrypt `plaintext` so that every key in `recipients` can read it.
///
/// Uses OS entropy and the default [`EnvelopeLimits`]. The sender is not
/// added implicitly: include `sender.public_key()` in `recipients` to be able
/// to read your own message later.
///
/// # Errors
///
/// See [`seal_with`].
pub fn seal(
    plaintext: &str,
    sender: &KeyPair,
    recipients: &[PublicKey],
) -> Result<TransportPayload, EnvelopeError> {
    seal_with(&SystemRandom, &EnvelopeLimits::default(), plaintext, sender, recipients)
}

/// Encrypt `plaintext` with an explicit randomness source and limits.
///
/// Duplicate recipients are collapsed to one wrap; the first occurrence
/// decides the order. Every call draws a fresh body key and fresh nonces, so
/// sealing the same input twice yields unrelated payloads.
///
/// # Errors
///
/// - `NoRecipients`: `recipients` is empty
/// - `TooManyRecipients`: more distinct recipients than
///   `limits.max_recipients`
/// - `InvalidKey`: a recipient key is a low-order point
/// - `MessageTooLarge`: the sealed payload would exceed `limits`
pub fn seal_with<R: RandomSource>(
    rng: &R,
    limits: &EnvelopeLimits,
    plaintext: &str,
    sender: &KeyPair,
    recipients: &[PublicKey],
) -> Result<TransportPayload, EnvelopeError> {
    let recipients = distinct(recipients);

    if recipients.is_empty() {
        return Err(EnvelopeError::NoRecipients);
    }

    if recipients.len() > limits.max_recipients {
        return Err(EnvelopeError::TooManyRecipients {
            count: recipients.len(),
            max: limits.max_recipients,
        });
    }

    let body_key = SymmetricKey::generate(rng);

    let wraps = recipients
        .iter()
        .map(|recipient| wrap::wrap_key(&body_key, sender, recipient, rng.random_array()))
        .collect::<Result<Vec<_>, _>>()?;

    // Body is sealed last so its tag covers the finished recipient list
    let ciphertext_nonce = rng.random_array();
    let ciphertext = symmetric::encrypt(
        body_key.as_bytes(),
        &ciphertext_nonce,
        &wrap::body_aad(sender.public_key(), &wraps),
        plaintext.as_bytes(),
    );

    let envelope = Envelope {
        sender_public_key: sender.public_key().to_bytes(),
        ciphertext,
        ciphertext_nonce,
        recipients: wraps,
    };

    let payload = TransportPayload::encode_within(&envelope, limits).map_err(|e| match e {
        ProtocolError::PayloadTooLarge { size, max } => EnvelopeError::MessageTooLarge { size, max },
        other => EnvelopeError::from(other),
    })?;

    tracing::debug!(
        recipients = envelope.recipients.len(),
        plaintext_len = plaintext.len(),
        payload_len = payload.len(),
        "sealed envelope"
    );

    Ok(payload)
}

/// Recipients with duplicates removed, first occurrence kept.
fn distinct(recipients: &[PublicKey]) -> Vec<PublicKey> {
    let mut seen = HashSet::with_capacity(recipients.len());
    recipients.iter().copied().filter(|key| seen.insert(*key)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::SeededRandom;

    fn decode(payload: &TransportPayload) -> Envelope {
        payload.decode(&EnvelopeLimits::default()).unwrap()
    }

    #[test]
    fn empty_recipients_rejected() {
        let alice = KeyPair::generate();
        assert_eq!(seal("hi", &alice, &[]).unwrap_err(), EnvelopeError::NoRecipients);
    }

    #[test]
    fn one_wrap_per_recipient() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();
        let carol = KeyPair::generate();

        let payload =
            seal("hi", &alice, &[*alice.public_key(), *bob.public_key(), *carol.public_key()])
                .unwrap();
        let envelope = decode(&payload);

        assert_eq!(envelope.sender_public_key, alice.public_key().to_bytes());
        assert_eq!(envelope.recipients.len(), 3);
        assert!(envelope.recipient(bob.public_key().as_bytes()).is_some());
        assert!(envelope.recipient(carol.public_key().as_bytes()).is_some());
    }

    #[test]
    fn duplicate_recipients_collapse() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        let payload = seal(
            "hi",
            &alice,
            &[*bob.public_key(), *alice.public_key(), *bob.public_key(), *bob.public_key()],
        )
        .unwrap();
        let envelope = decode(&payload);

        let order: Vec<_> = envelope.recipients.iter().map(|w| w.recipient_public_key).collect();
        assert_eq!(order, vec![bob.public_key().to_bytes(), alice.public_key().to_bytes()]);
    }

    #[test]
    fn ciphertext_is_plaintext_plus_tag() {
        let alice = KeyPair::generate();
        let payload = seal("hello room", &alice, &[*alice.public_key()]).unwrap();
        assert_eq!(decode(&payload).plaintext_len(), "hello room".len());
    }

    #[test]
    fn empty_plaintext_is_sealable() {
        let alice = KeyPair::generate();
        let payload = seal("", &alice, &[*alice.public_key()]).unwrap();
        assert_eq!(decode(&payload).plaintext_len(), 0);
    }

    #[test]
    fn too_many_recipients_rejected() {
        let rng = SeededRandom::from_u64(11);
        let alice = KeyPair::generate_with(&rng);
        let keys: Vec<_> = (0..3).map(|_| *KeyPair::generate_with(&rng).public_key()).collect();
        let limits = EnvelopeLimits { max_recipients: 2, ..Default::default() };

        let result = seal_with(&rng, &limits, "hi", &alice, &keys);
        assert_eq!(result.unwrap_err(), EnvelopeError::TooManyRecipients { count: 3, max: 2 });
    }

    #[test]
    fn duplicates_do_not_count_against_limit() {
        let rng = SeededRandom::from_u64(12);
        let alice = KeyPair::generate_with(&rng);
        let bob = *KeyPair::generate_with(&rng).public_key();
        let limits = EnvelopeLimits { max_recipients: 1, ..Default::default() };

        assert!(seal_with(&rng, &limits, "hi", &alice, &[bob, bob, bob]).is_ok());
    }

    #[test]
    fn oversized_message_rejected() {
        let alice = KeyPair::generate();
        let limits = EnvelopeLimits { max_envelope_len: 1024, ..Default::default() };
        let body = "x".repeat(4096);

        let result = seal_with(&SystemRandom, &limits, &body, &alice, &[*alice.public_key()]);
        assert!(matches!(result, Err(EnvelopeError::MessageTooLarge { max: 1024, .. })));
    }

    #[test]
    fn low_order_recipient_rejected() {
        let alice = KeyPair::generate();
        let zero = PublicKey::from_bytes([0; 32]);

        let result = seal("hi", &alice, &[*alice.public_key(), zero]);
        assert!(matches!(result, Err(EnvelopeError::InvalidKey { .. })));
    }

    #[test]
    fn seeded_seal_is_reproducible() {
        let alice = KeyPair::generate_with(&SeededRandom::from_u64(1));
        let limits = EnvelopeLimits::default();
        let to = [*alice.public_key()];

        let a = seal_with(&SeededRandom::from_u64(5), &limits, "hi", &alice, &to).unwrap();
        let b = seal_with(&SeededRandom::from_u64(5), &limits, "hi", &alice, &to).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn repeated_seal_is_fresh() {
        let alice = KeyPair::generate();
        let to = [*alice.public_key()];

        let a = decode(&seal("same", &alice, &to).unwrap());
        let b = decode(&seal("same", &alice, &to).unwrap());

        assert_ne!(a.ciphertext_nonce, b.ciphertext_nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
        assert_ne!(a.recipients[0].key_nonce, b.recipients[0].key_nonce);
        assert_ne!(a.recipients[0].encrypted_symmetric_key, b.recipients[0].encrypted_symmetric_key);
    }
}
