use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A session credential row. Never serialized to clients; the client only
/// ever sees the token itself, this row holds its fingerprint.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: i64,
    pub token_hash: String,
    pub revoked: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
