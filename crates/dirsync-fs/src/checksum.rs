//! SHA-256 digest utilities
//!
//! Used to derive stable cache keys from resolved root paths.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of string content.
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Digest of several parts joined with `&&`. Part order matters.
pub fn sha256_joined(parts: &[&str]) -> String {
    sha256_hex(&parts.join("&&"))
}
