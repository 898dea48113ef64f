use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::db;
use crate::state::SharedState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);
const TOKEN_RETENTION_DAYS: i64 = 7;
const LIMITER_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Hourly maintenance loop: revokes refresh tokens past the retention
/// window and prunes the rate-limiter maps. Stops when the shutdown flag
/// flips.
pub fn spawn(state: SharedState, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(SWEEP_INTERVAL) => {}
                _ = shutdown.changed() => break,
            }

            let cutoff = Utc::now() - chrono::Duration::days(TOKEN_RETENTION_DAYS);
            match db::refresh_tokens::revoke_stale(&state.pool, cutoff).await {
                Ok(0) => {}
                Ok(revoked) => tracing::info!(revoked, "Revoked stale refresh tokens"),
                Err(e) => tracing::error!("Refresh token sweep failed: {e}"),
            }

            state.api_limiter.cleanup(LIMITER_MAX_AGE);
            state.login_limiter.cleanup(LIMITER_MAX_AGE);
        }

        tracing::debug!("Maintenance task stopped");
    })
}
