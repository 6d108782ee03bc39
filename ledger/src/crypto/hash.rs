//! # Hashing Utilities
//!
//! SHA-256 is the only hash function in the ledger. Block hashes, the
//! predecessor links between them, and catalog identifiers all go through
//! this module so there is exactly one place that decides how bytes become
//! a digest and how a digest becomes text.
//!
//! ## Text encoding
//!
//! Digests leave this module as lowercase hex. Block hashes are compared as
//! strings and shipped over JSON, so there is no separate binary form to
//! keep in sync.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use bookchain_ledger::crypto::sha256;
///
/// let hash = sha256(b"bookchain");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute SHA-256 and return the digest as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Hash several byte slices as if they were one concatenated buffer.
///
/// Parts are fed into the hasher in order with no separators, so
/// `sha256_concat_hex(&[b"ab", b"c"])` equals `sha256_hex(b"abc")`.
/// Callers that need unambiguous framing must build it into the parts.
pub fn sha256_concat_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// Returns `true` if `s` looks like a hex-encoded SHA-256 digest:
/// 64 lowercase hex characters.
pub fn is_hash_hex(s: &str) -> bool {
    s.len() == crate::config::HASH_HEX_LENGTH
        && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
