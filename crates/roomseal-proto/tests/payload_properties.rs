//! Property-based tests for the transport payload codec
//!
//! 1. **Round-trip**: decode(encode(e)) == e for every structurally valid
//!    envelope
//! 2. **Totality**: decoding arbitrary strings never panics
//! 3. **No partial data**: a truncated payload is always rejected

use proptest::prelude::*;
use roomseal_proto::{
    Envelope, EnvelopeLimits, NONCE_SIZE, PUBLIC_KEY_SIZE, ProtocolError, RecipientWrap,
    TAG_SIZE, TransportPayload, WRAPPED_KEY_SIZE, codec,
};

fn arbitrary_key() -> impl Strategy<Value = [u8; PUBLIC_KEY_SIZE]> {
    any::<[u8; PUBLIC_KEY_SIZE]>()
}

fn arbitrary_nonce() -> impl Strategy<Value = [u8; NONCE_SIZE]> {
    any::<[u8; NONCE_SIZE]>()
}

fn arbitrary_wrap() -> impl Strategy<Value = RecipientWrap> {
    (
        arbitrary_key(),
        prop::collection::vec(any::<u8>(), WRAPPED_KEY_SIZE..=WRAPPED_KEY_SIZE),
        arbitrary_nonce(),
    )
        .prop_map(|(recipient_public_key, encrypted_symmetric_key, key_nonce)| RecipientWrap {
            recipient_public_key,
            encrypted_symmetric_key,
            key_nonce,
        })
}

/// Valid envelopes: recipients deduplicated by public key
fn arbitrary_envelope() -> impl Strategy<Value = Envelope> {
    (
        arbitrary_key(),
        prop::collection::vec(any::<u8>(), TAG_SIZE..512),
        arbitrary_nonce(),
        prop::collection::vec(arbitrary_wrap(), 1..8),
    )
        .prop_map(|(sender_public_key, ciphertext, ciphertext_nonce, mut recipients)| {
            let mut seen = std::collections::HashSet::new();
            recipients.retain(|wrap| seen.insert(wrap.recipient_public_key));
            Envelope { sender_public_key, ciphertext, ciphertext_nonce, recipients }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_payload_roundtrip(envelope in arbitrary_envelope()) {
        let payload = TransportPayload::encode(&envelope).unwrap();
        let decoded = payload.decode(&EnvelopeLimits::default()).unwrap();

        prop_assert_eq!(decoded, envelope);
    }

    #[test]
    fn prop_decode_arbitrary_string_never_panics(text in ".{0,256}") {
        let _ = TransportPayload::from(text).decode(&EnvelopeLimits::default());
    }

    #[test]
    fn prop_decode_arbitrary_compressed_bytes_never_panics(
        bytes in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let payload = TransportPayload::from(codec::encode_text(&codec::compress(&bytes)));
        let result = payload.decode(&EnvelopeLimits::default());

        let malformed = matches!(
            result,
            Err(ProtocolError::MalformedEncoding { .. } | ProtocolError::MalformedPayload { .. })
        );
        prop_assert!(!malformed);
    }

    #[test]
    fn prop_truncated_payload_rejected(
        envelope in arbitrary_envelope(),
        cut in 1usize..64,
    ) {
        let payload = TransportPayload::encode(&envelope).unwrap();
        let text = payload.as_str();
        let cut = cut.min(text.len());
        let truncated = TransportPayload::from(&text[..text.len() - cut]);

        let result = truncated.decode(&EnvelopeLimits::default());

        prop_assert!(result.is_err(), "truncated payload must not decode");
    }

    #[test]
    fn prop_text_codec_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..1024)) {
        let text = codec::encode_text(&bytes);
        prop_assert_eq!(codec::decode_text(&text).unwrap(), bytes);
    }

    #[test]
    fn prop_compression_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..4096)) {
        let compressed = codec::compress(&bytes);
        prop_assert_eq!(codec::decompress(&compressed, bytes.len()).unwrap(), bytes);
    }
}

#[test]
fn single_byte_truncation_never_yields_an_envelope() {
    let envelope = Envelope {
        sender_public_key: [7; PUBLIC_KEY_SIZE],
        ciphertext: b"0123456789abcdef-body".to_vec(),
        ciphertext_nonce: [8; NONCE_SIZE],
        recipients: vec![RecipientWrap {
            recipient_public_key: [9; PUBLIC_KEY_SIZE],
            encrypted_symmetric_key: vec![10; WRAPPED_KEY_SIZE],
            key_nonce: [11; NONCE_SIZE],
        }],
    };
    let payload = TransportPayload::encode(&envelope).unwrap();
    let text = payload.as_str();

    let truncated = TransportPayload::from(&text[..text.len() - 1]);
    let result = truncated.decode(&EnvelopeLimits::default());

    assert!(matches!(
        result,
        Err(ProtocolError::MalformedEncoding { .. }
            | ProtocolError::MalformedPayload { .. }
            | ProtocolError::MalformedEnvelope { .. })
    ));
}
