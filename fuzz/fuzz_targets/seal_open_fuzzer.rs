//! Fuzz target for the full seal/open pipeline
//!
//! # Strategy
//!
//! - Arbitrary plaintext and recipient selections (with duplicates)
//! - Deterministic key pairs from a fuzzer-chosen seed
//! - Arbitrary byte-level corruption of one envelope field after sealing
//!
//! # Invariants
//!
//! - Every selected recipient opens to the original plaintext
//! - Unselected participants get NotARecipient
//! - Any corruption of a ciphertext, nonce or wrapped key fails integrity for
//!   every recipient, never yielding different plaintext
//! - Opening is idempotent

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use roomseal_crypto::{
    open, seal_with, EnvelopeError, EnvelopeLimits, KeyPair, SeededRandom, TransportPayload,
};

const PARTICIPANTS: usize = 4;

#[derive(Debug, Clone, Arbitrary)]
struct SealScenario {
    seed: u64,
    plaintext: String,
    /// Indices into the participant list (taken modulo its length)
    recipients: Vec<u8>,
    corruption: Option<Corruption>,
}

#[derive(Debug, Clone, Arbitrary)]
enum Corruption {
    Ciphertext { index: u16, mask: u8 },
    CiphertextNonce { index: u8, mask: u8 },
    EncryptedSymmetricKey { wrap: u8, index: u8, mask: u8 },
    KeyNonce { wrap: u8, index: u8, mask: u8 },
}

fn flip(bytes: &mut [u8], index: usize, mask: u8) {
    let len = bytes.len();
    bytes[index % len] ^= mask | 1;
}

fuzz_target!(|scenario: SealScenario| {
    if scenario.plaintext.len() > 4096 || scenario.recipients.len() > 16 {
        return;
    }

    let rng = SeededRandom::from_u64(scenario.seed);
    let pairs: Vec<KeyPair> = (0..PARTICIPANTS).map(|_| KeyPair::generate_with(&rng)).collect();
    let selected: Vec<usize> =
        scenario.recipients.iter().map(|&i| usize::from(i) % PARTICIPANTS).collect();
    let keys: Vec<_> = selected.iter().map(|&i| *pairs[i].public_key()).collect();

    let limits = EnvelopeLimits::default();
    let sealed = seal_with(&rng, &limits, &scenario.plaintext, &pairs[0], &keys);

    let payload = match sealed {
        Ok(payload) => payload,
        Err(EnvelopeError::NoRecipients) => {
            assert!(keys.is_empty());
            return;
        }
        Err(err) => panic!("unexpected seal failure: {err}"),
    };

    let Some(corruption) = scenario.corruption else {
        for (index, pair) in pairs.iter().enumerate() {
            let first = open(&payload, pair);
            assert_eq!(first, open(&payload, pair), "open must be idempotent");

            if selected.contains(&index) {
                assert_eq!(first.as_deref(), Ok(scenario.plaintext.as_str()));
            } else {
                assert_eq!(first, Err(EnvelopeError::NotARecipient));
            }
        }
        return;
    };

    let mut envelope = payload.decode(&limits).expect("freshly sealed payload decodes");
    let wraps = envelope.recipients.len();
    match corruption {
        Corruption::Ciphertext { index, mask } => {
            flip(&mut envelope.ciphertext, usize::from(index), mask);
        }
        Corruption::CiphertextNonce { index, mask } => {
            flip(&mut envelope.ciphertext_nonce, usize::from(index), mask);
        }
        Corruption::EncryptedSymmetricKey { wrap, index, mask } => {
            let wrap = &mut envelope.recipients[usize::from(wrap) % wraps];
            flip(&mut wrap.encrypted_symmetric_key, usize::from(index), mask);
        }
        Corruption::KeyNonce { wrap, index, mask } => {
            let wrap = &mut envelope.recipients[usize::from(wrap) % wraps];
            flip(&mut wrap.key_nonce, usize::from(index), mask);
        }
    }
    let tampered = TransportPayload::encode(&envelope).expect("tampered envelope encodes");

    for &index in &selected {
        let result = open(&tampered, &pairs[index]);
        assert!(
            matches!(result, Err(EnvelopeError::Integrity { .. })),
            "corruption must fail integrity, got {result:?}"
        );
    }
});
