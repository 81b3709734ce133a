use sha2::{Digest, Sha256};

/// Hex SHA-256 of the exact text that is synthesized
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
