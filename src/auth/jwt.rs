use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub role: String,
    pub code: String,
    pub kind: TokenKind,
    pub exp: i64,
}

impl Claims {
    pub fn access(user: &User, ttl_hours: i64) -> Self {
        Self::for_user(user, TokenKind::Access, Duration::hours(ttl_hours))
    }

    pub fn refresh(user: &User, ttl_days: i64) -> Self {
        Self::for_user(user, TokenKind::Refresh, Duration::days(ttl_days))
    }

    fn for_user(user: &User, kind: TokenKind, ttl: Duration) -> Self {
        Self {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            code: user.code.clone(),
            kind,
            exp: (Utc::now() + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue an access/refresh pair carrying the same identity payload with
/// separate expiry windows.
pub fn issue_pair(
    user: &User,
    secret: &str,
    access_ttl_hours: i64,
    refresh_ttl_days: i64,
) -> Result<TokenPair, String> {
    Ok(TokenPair {
        access_token: encode_token(&Claims::access(user, access_ttl_hours), secret)?,
        refresh_token: encode_token(&Claims::refresh(user, refresh_ttl_days), secret)?,
    })
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}
