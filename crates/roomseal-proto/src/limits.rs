//! Size limits applied when producing and accepting payloads.

use serde::Deserialize;

/// Upper bounds for envelope processing.
///
/// Defaults are generous for chat traffic. Hosts that load configuration from
/// a file can deserialize this directly; omitted fields keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnvelopeLimits {
    /// Maximum length of a transport string, in bytes
    pub max_payload_len: usize,
    /// Maximum size of a decompressed envelope, in bytes
    pub max_envelope_len: usize,
    /// Maximum number of recipient wraps in one envelope
    pub max_recipients: usize,
}

impl EnvelopeLimits {
    /// 16 MiB, matching the largest frame the chat transport carries.
    pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

    /// 16 MiB of decompressed envelope.
    pub const DEFAULT_MAX_ENVELOPE_LEN: usize = 16 * 1024 * 1024;

    /// Room size ceiling.
    pub const DEFAULT_MAX_RECIPIENTS: usize = 1024;
}

impl Default for EnvelopeLimits {
    fn default() -> Self {
        Self {
            max_payload_len: Self::DEFAULT_MAX_PAYLOAD_LEN,
            max_envelope_len: Self::DEFAULT_MAX_ENVELOPE_LEN,
            max_recipients: Self::DEFAULT_MAX_RECIPIENTS,
        }
    }
}
