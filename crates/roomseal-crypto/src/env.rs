//! Randomness sources.
//!
//! Everything that needs entropy (key generation, body keys, nonces) draws it
//! through [`RandomSource`], so production code uses the OS generator while
//! tests and simulations can substitute a seeded one and get reproducible
//! envelopes.
//!
//! Sources are shared by reference across threads. A source whose underlying
//! generator is not thread-safe serializes access internally; callers never
//! see that locking.

use std::sync::{Mutex, PoisonError};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Cryptographically secure random bytes.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` fills the whole buffer from a CSPRNG in production
/// - Concurrent calls from multiple threads never observe the same output
/// - Failure to obtain entropy is not reported as success
pub trait RandomSource: Send + Sync {
    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Returns a fresh random array.
    fn random_array<const N: usize>(&self) -> [u8; N]
    where
        Self: Sized,
    {
        let mut bytes = [0u8; N];
        self.random_bytes(&mut bytes);
        bytes
    }
}

/// Operating system entropy via getrandom.
///
/// # Panics
///
/// Panics if the OS RNG fails. Without working entropy no key or nonce can be
/// generated safely, so the process must not continue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl SystemRandom {
    /// Create a handle to the OS generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for SystemRandom {
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - cannot generate keys or nonces");
    }
}

/// Deterministic ChaCha20 generator for tests and simulations.
///
/// Same seed, same byte sequence. Never use in production: anyone who knows
/// the seed can recompute every key and nonce.
pub struct SeededRandom {
    rng: Mutex<ChaCha20Rng>,
}

impl SeededRandom {
    /// Create a generator from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { rng: Mutex::new(ChaCha20Rng::from_seed(seed)) }
    }

    /// Create a generator from a small integer seed.
    pub fn from_u64(seed: u64) -> Self {
        Self { rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)) }
    }
}

impl RandomSource for SeededRandom {
    fn random_bytes(&self, buffer: &mut [u8]) {
        // A panic while holding the lock cannot leave the RNG half-updated
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.fill_bytes(buffer);
    }
}

impl std::fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededRandom").finish_non_exhaustive()
    }
}
