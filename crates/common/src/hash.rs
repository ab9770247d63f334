//! Content hashing and identifier derivation.

use sha2::{Digest, Sha256};

/// Calculate a lowercase hex-encoded SHA-256 digest of the provided data.
///
/// Uploaded files are identified by this value, which is stored both
/// as an upload file hash and a content hash.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Derive a content identifier from its hash, creator address and registration timestamp.
pub fn content_id(content_hash: &str, creator: &str, timestamp: i64) -> String {
    sha256_hex(format!("{content_hash}{creator}{timestamp}").as_bytes())
}
