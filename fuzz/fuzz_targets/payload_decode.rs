//! Fuzz target for TransportPayload::decode
//!
//! This fuzzer feeds the decoder with:
//! - Arbitrary text (invalid base64, wrong padding)
//! - Arbitrary bytes behind valid base64 (corrupt zlib streams)
//! - Arbitrary bytes behind valid base64 and zlib (malformed CBOR, missing
//!   or mis-sized fields, duplicate recipients)
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error,
//! and anything that does decode must satisfy the envelope invariants.

#![no_main]

use libfuzzer_sys::fuzz_target;
use roomseal_proto::{codec, EnvelopeLimits, TransportPayload, WRAPPED_KEY_SIZE, TAG_SIZE};

fuzz_target!(|data: &[u8]| {
    let limits = EnvelopeLimits { max_envelope_len: 64 * 1024, ..Default::default() };

    let candidates = [
        TransportPayload::from(String::from_utf8_lossy(data).into_owned()),
        TransportPayload::from(codec::encode_text(data)),
        TransportPayload::from(codec::encode_text(&codec::compress(data))),
    ];

    for payload in candidates {
        let Ok(envelope) = payload.decode(&limits) else {
            continue;
        };

        assert!(!envelope.recipients.is_empty());
        assert!(envelope.recipients.len() <= limits.max_recipients);
        assert!(envelope.ciphertext.len() >= TAG_SIZE);
        for wrap in &envelope.recipients {
            assert_eq!(wrap.encrypted_symmetric_key.len(), WRAPPED_KEY_SIZE);
        }

        // Re-encoding a decoded envelope must decode to the same envelope
        let reencoded = TransportPayload::encode(&envelope).expect("valid envelope encodes");
        assert_eq!(reencoded.decode(&limits).expect("re-encoded envelope decodes"), envelope);
    }
});
