//! Byte-level transcoding: text-safe encoding and DEFLATE compression.
//!
//! Text encoding is standard base64 with padding so a payload can sit inside a
//! JSON string field unchanged. Compression is DEFLATE in a zlib container.
//!
//! # Invariants
//!
//! - `decode_text(&encode_text(b)) == Ok(b)` for every byte string `b`
//! - `decompress(&compress(b), limit) == Ok(b)` whenever `b.len() <= limit`
//! - `decompress` either returns the complete stream or an error, never a
//!   prefix of the original data

use std::io::Write;

use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::{Compression, Decompress, FlushDecompress, Status, write::ZlibEncoder};

use crate::errors::{ProtocolError, Result};

/// Initial output reservation per compressed input byte.
const INFLATE_RATIO_HINT: usize = 4;

/// Smallest chunk the inflate buffer grows by.
const MIN_INFLATE_CHUNK: usize = 256;

/// Encode bytes into the transport alphabet.
pub fn encode_text(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a transport string back into bytes.
///
/// # Errors
///
/// - `MalformedEncoding`: characters outside the alphabet, bad padding or an
///   impossible length
pub fn decode_text(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| ProtocolError::MalformedEncoding { reason: e.to_string() })
}

/// Compress bytes with DEFLATE (zlib container).
pub fn compress(bytes: &[u8]) -> Vec<u8> {
    let mut encoder =
        ZlibEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::default());

    // Writes into a Vec cannot fail
    let Ok(()) = encoder.write_all(bytes) else {
        unreachable!("in-memory zlib encoding cannot fail");
    };
    let Ok(compressed) = encoder.finish() else {
        unreachable!("in-memory zlib encoding cannot fail");
    };

    compressed
}

/// Decompress a zlib stream produced by [`compress`].
///
/// Output is capped at `max_len` bytes so a small hostile payload cannot
/// expand into an unbounded allocation.
///
/// # Errors
///
/// - `MalformedPayload`: corrupt stream, checksum mismatch, truncated input,
///   bytes after the end of the stream, or output above `max_len`
pub fn decompress(compressed: &[u8], max_len: usize) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    // One byte of headroom so an over-limit stream is detected rather than
    // mistaken for an exact fit
    let ceiling = max_len.saturating_add(1);
    let initial =
        compressed.len().saturating_mul(INFLATE_RATIO_HINT).max(MIN_INFLATE_CHUNK).min(ceiling);
    let mut out = Vec::with_capacity(initial);

    loop {
        if out.len() == out.capacity() {
            if out.len() > max_len {
                return Err(ProtocolError::payload(format!(
                    "decompressed size exceeds {max_len} bytes"
                )));
            }
            let grow = out.capacity().max(MIN_INFLATE_CHUNK).min(ceiling - out.len());
            out.reserve_exact(grow);
        }

        let before_in = inflater.total_in();
        let before_out = inflater.total_out();
        let remaining = compressed.get(before_in as usize..).unwrap_or_default();

        let status = inflater
            .decompress_vec(remaining, &mut out, FlushDecompress::None)
            .map_err(|e| ProtocolError::payload(e.to_string()))?;

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                let stalled =
                    inflater.total_in() == before_in && inflater.total_out() == before_out;
                if stalled && out.len() < out.capacity() {
                    return Err(ProtocolError::payload("truncated compressed stream"));
                }
            },
        }
    }

    if inflater.total_in() as usize != compressed.len() {
        return Err(ProtocolError::payload("trailing bytes after compressed stream"));
    }

    if out.len() > max_len {
        return Err(ProtocolError::payload(format!("decompressed size exceeds {max_len} bytes")));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024 * 1024;

    #[test]
    fn text_roundtrip() {
        let bytes = [0x00, 0xFF, 0x10, 0x80, 0x7F];
        let text = encode_text(&bytes);
        assert_eq!(decode_text(&text).unwrap(), bytes);
    }

    #[test]
    fn text_uses_padded_standard_alphabet() {
        assert_eq!(encode_text(b"hello room"), "aGVsbG8gcm9vbQ==");
        assert_eq!(encode_text(&[0xFB, 0xFF]), "+/8=");
    }

    #[test]
    fn empty_text_is_empty_bytes() {
        assert_eq!(encode_text(&[]), "");
        assert!(decode_text("").unwrap().is_empty());
    }

    #[test]
    fn invalid_alphabet_rejected() {
        let result = decode_text("not*base64!");
        assert!(matches!(result, Err(ProtocolError::MalformedEncoding { .. })));
    }

    #[test]
    fn invalid_length_rejected() {
        let result = decode_text("aGVsbG8gcm9vbQ=");
        assert!(matches!(result, Err(ProtocolError::MalformedEncoding { .. })));
    }

    #[test]
    fn compress_roundtrip() {
        let data = b"hello room hello room hello room".repeat(10);
        let compressed = compress(&data);
        assert!(compressed.len() < data.len());
        assert_eq!(decompress(&compressed, LIMIT).unwrap(), data);
    }

    #[test]
    fn compress_empty_roundtrip() {
        let compressed = compress(&[]);
        assert!(!compressed.is_empty(), "zlib header and checksum are always present");
        assert!(decompress(&compressed, LIMIT).unwrap().is_empty());
    }

    #[test]
    fn compressed_stream_has_zlib_header() {
        let compressed = compress(b"x");
        // CMF byte: deflate, 32K window
        assert_eq!(compressed[0], 0x78);
    }

    #[test]
    fn incompressible_data_roundtrip() {
        let data: Vec<u8> =
            (0..4096u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8).collect();
        let compressed = compress(&data);
        assert_eq!(decompress(&compressed, LIMIT).unwrap(), data);
    }

    #[test]
    fn truncated_stream_rejected() {
        let compressed = compress(&b"truncate me please".repeat(20));
        for cut in 1..compressed.len() {
            let result = decompress(&compressed[..compressed.len() - cut], LIMIT);
            assert!(
                matches!(result, Err(ProtocolError::MalformedPayload { .. })),
                "truncation by {cut} bytes must be rejected"
            );
        }
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut compressed = compress(b"payload");
        compressed.extend_from_slice(&[0xAA; 16]);
        let result = decompress(&compressed, LIMIT);
        assert!(matches!(result, Err(ProtocolError::MalformedPayload { .. })));
    }

    #[test]
    fn corrupt_checksum_rejected() {
        let mut compressed = compress(b"payload");
        let last = compressed.len() - 1;
        compressed[last] ^= 0x01;
        let result = decompress(&compressed, LIMIT);
        assert!(matches!(result, Err(ProtocolError::MalformedPayload { .. })));
    }

    #[test]
    fn garbage_rejected() {
        let result = decompress(b"definitely not zlib", LIMIT);
        assert!(matches!(result, Err(ProtocolError::MalformedPayload { .. })));
    }

    #[test]
    fn output_limit_enforced() {
        let data = vec![0u8; 64 * 1024];
        let compressed = compress(&data);

        let result = decompress(&compressed, 1024);
        assert!(matches!(
            result,
            Err(ProtocolError::MalformedPayload { reason }) if reason.contains("exceeds")
        ));

        assert_eq!(decompress(&compressed, data.len()).unwrap().len(), data.len());
    }
}
