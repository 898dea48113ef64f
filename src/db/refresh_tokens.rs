use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::RefreshToken;

pub async fn create(
    pool: &PgPool,
    user_id: i64,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<RefreshToken, sqlx::Error> {
    sqlx::query_as::<_, RefreshToken>(
        "INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_hash(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<RefreshToken>, sqlx::Error> {
    sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token_hash = $1")
        .bind(token_hash)
        .fetch_optional(pool)
        .await
}

/// Rotate in one transaction: revoke the consumed row (only while still
/// active) and insert the replacement. Returns false when a concurrent
/// refresh already consumed the row — the caller loses the race.
pub async fn rotate(
    pool: &PgPool,
    consumed_id: Uuid,
    user_id: i64,
    new_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let revoked =
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = $1 AND revoked = FALSE")
            .bind(consumed_id)
            .execute(&mut *tx)
            .await?;

    if revoked.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(new_hash)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Revoke the active row matching this hash, if any. No-op when nothing
/// matches, so logout stays idempotent.
pub async fn revoke_by_hash(
    pool: &PgPool,
    user_id: i64,
    token_hash: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE refresh_tokens SET revoked = TRUE
         WHERE user_id = $1 AND token_hash = $2 AND revoked = FALSE",
    )
    .bind(user_id)
    .bind(token_hash)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn revoke_all_for_user(pool: &PgPool, user_id: i64) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND revoked = FALSE")
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

/// Maintenance sweep: revoke active rows past the retention window.
pub async fn revoke_stale(pool: &PgPool, older_than: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE revoked = FALSE AND created_at < $1")
            .bind(older_than)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}
