pub mod extractor;
pub mod jwt;
pub mod password;

use sha2::{Digest, Sha256};

/// Refresh tokens never reach the database in clear: only this SHA-256
/// fingerprint is stored, exactly like a password hash.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
