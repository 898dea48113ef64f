use chrono::Utc;

use posdesk::auth::jwt::{self, Claims, TokenKind};
use posdesk::auth::{hash_token, password};
use posdesk::models::User;

const SECRET: &str = "test-jwt-secret-that-is-long-enough";

fn sample_user() -> User {
    User {
        id: 42,
        code: "USR42".to_string(),
        name: "Sample User".to_string(),
        email: "sample@test.com".to_string(),
        username: "sample".to_string(),
        phone: "0812-000-0042".to_string(),
        address: None,
        password_hash: "unused".to_string(),
        role: "manager".to_string(),
        expense_limit: 0,
        discount_limit: 0,
        point: 0,
        balance: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ── Password hashing ────────────────────────────────────────────

#[test]
fn password_round_trip() {
    let hash = password::hash("S0me$ecret!pw").unwrap();
    assert!(password::verify("S0me$ecret!pw", &hash).unwrap());
    assert!(!password::verify("0therSecret!pw", &hash).unwrap());
}

#[test]
fn hashes_are_salted() {
    let first = password::hash("S0me$ecret!pw").unwrap();
    let second = password::hash("S0me$ecret!pw").unwrap();
    assert_ne!(first, second);
}

#[test]
fn strength_validator_itemizes_reasons() {
    assert!(password::validate_strength("L0ng&Strong!").is_empty());

    let reasons = password::validate_strength("short");
    // Too short, no uppercase, no digit, no symbol.
    assert_eq!(reasons.len(), 4);

    let reasons = password::validate_strength("alllowercase");
    assert_eq!(reasons.len(), 3);

    let reasons = password::validate_strength("Almost-There1");
    assert!(reasons.is_empty());

    let reasons = password::validate_strength("NoSymbol123");
    assert_eq!(reasons, vec![
        "must contain a symbol (!@#$%^&*()-_=+[]{};:,.<>?)".to_string()
    ]);
}

#[test]
fn generated_passwords_pass_validation() {
    for len in [8, 12, 32] {
        let generated = password::generate(len);
        assert_eq!(generated.len(), len);
        assert!(
            password::validate_strength(&generated).is_empty(),
            "generated password failed validation: {generated}"
        );
    }

    // Requests below the minimum are bumped up.
    assert_eq!(password::generate(4).len(), 8);
}

#[test]
fn generated_passwords_differ() {
    assert_ne!(password::generate(16), password::generate(16));
}

// ── JWT lifecycle ───────────────────────────────────────────────

#[test]
fn token_pair_round_trips_claims() {
    let user = sample_user();
    let pair = jwt::issue_pair(&user, SECRET, 24, 7).unwrap();

    let access = jwt::decode_token(&pair.access_token, SECRET).unwrap();
    assert_eq!(access.sub, 42);
    assert_eq!(access.email, "sample@test.com");
    assert_eq!(access.role, "manager");
    assert_eq!(access.code, "USR42");
    assert_eq!(access.kind, TokenKind::Access);

    let refresh = jwt::decode_token(&pair.refresh_token, SECRET).unwrap();
    assert_eq!(refresh.kind, TokenKind::Refresh);
    assert_eq!(refresh.sub, 42);

    // Refresh outlives access.
    assert!(refresh.exp > access.exp);
}

#[test]
fn wrong_secret_is_rejected() {
    let user = sample_user();
    let pair = jwt::issue_pair(&user, SECRET, 24, 7).unwrap();
    assert!(jwt::decode_token(&pair.access_token, "another-secret-also-long-enough!").is_err());
}

#[test]
fn expired_token_is_rejected() {
    let mut claims = Claims::access(&sample_user(), 24);
    claims.exp = (Utc::now() - chrono::Duration::hours(2)).timestamp();

    let token = jwt::encode_token(&claims, SECRET).unwrap();
    assert!(jwt::decode_token(&token, SECRET).is_err());
}

#[test]
fn tampered_token_is_rejected() {
    let user = sample_user();
    let pair = jwt::issue_pair(&user, SECRET, 24, 7).unwrap();

    let mut tampered = pair.access_token.clone();
    tampered.pop();
    tampered.push('x');
    assert!(jwt::decode_token(&tampered, SECRET).is_err());
}

// ── Refresh-token fingerprints ──────────────────────────────────

#[test]
fn token_fingerprint_is_hex_sha256() {
    let fingerprint = hash_token("some-refresh-token");
    assert_eq!(fingerprint.len(), 64);
    assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));

    // Deterministic for the same input, distinct for different input.
    assert_eq!(fingerprint, hash_token("some-refresh-token"));
    assert_ne!(fingerprint, hash_token("other-refresh-token"));
}
