use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::seq::{IndexedRandom, SliceRandom};

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.<>?";

/// Hash a password using Argon2id (19MB memory, 2 iterations, parallelism 1).
pub fn hash(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(19 * 1024, 2, 1, None).map_err(|e| format!("Invalid params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("Hashing failed: {e}"))
}

/// Verify a password against a hash.
pub fn verify(password: &str, hash: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(hash).map_err(|e| format!("Invalid hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Check password strength. Returns one reason per unmet rule; an empty
/// vector means the password is acceptable.
pub fn validate_strength(password: &str) -> Vec<String> {
    let mut reasons = Vec::new();

    if password.len() < 8 {
        reasons.push("must be at least 8 characters long".to_string());
    }
    if !password.bytes().any(|b| LOWER.contains(&b)) {
        reasons.push("must contain a lowercase letter".to_string());
    }
    if !password.bytes().any(|b| UPPER.contains(&b)) {
        reasons.push("must contain an uppercase letter".to_string());
    }
    if !password.bytes().any(|b| DIGITS.contains(&b)) {
        reasons.push("must contain a digit".to_string());
    }
    if !password.bytes().any(|b| SYMBOLS.contains(&b)) {
        reasons.push("must contain a symbol (!@#$%^&*()-_=+[]{};:,.<>?)".to_string());
    }

    reasons
}

/// Generate a random password with at least one character from each
/// required class. Lengths below 8 are bumped to 8.
pub fn generate(len: usize) -> String {
    let len = len.max(8);
    let mut rng = rand::rng();

    let mut chars: Vec<u8> = Vec::with_capacity(len);
    for set in [LOWER, UPPER, DIGITS, SYMBOLS] {
        chars.push(*set.choose(&mut rng).expect("character sets are non-empty"));
    }

    let pool: Vec<u8> = [LOWER, UPPER, DIGITS, SYMBOLS].concat();
    while chars.len() < len {
        chars.push(*pool.choose(&mut rng).expect("pool is non-empty"));
    }

    chars.shuffle(&mut rng);
    String::from_utf8(chars).expect("generated characters are ASCII")
}
