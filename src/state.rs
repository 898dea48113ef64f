use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::rate_limit::{ApiRateLimiter, LoginRateLimiter};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub api_limiter: ApiRateLimiter,
    pub login_limiter: LoginRateLimiter,
}
