//! Stable hashing for document IDs and cache directories

use sha2::{Digest, Sha256};

/// First `len` hex characters of the SHA-256 of `input`.
pub fn short_sha256(input: &str, len: usize) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..len.min(hex.len())].to_string()
}

/// Document ID: `sha256("{source}:{locator}:{text[:1000]}")`, first 16 hex chars.
///
/// `locator` disambiguates several documents cut from the same source
/// (a line range, an element index, the first node of a BPMN chunk).
pub fn stable_hash(text: &str, source: &str, locator: &str) -> String {
    // Slice by character so multi-byte content never splits mid code point.
    let text_prefix: String = text.chars().take(1000).collect();
    short_sha256(&format!("{source}:{locator}:{text_prefix}"), 16)
}
