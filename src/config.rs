use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub access_ttl_hours: i64,
    pub refresh_ttl_days: i64,
    pub cors_origins: Vec<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_max: u32,
    pub max_body_size: usize,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let jwt_secret = env_required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters long".to_string());
        }

        let host: IpAddr = env_or("POSDESK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid POSDESK_HOST: {e}"))?;

        let port: u16 = env_or("POSDESK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid POSDESK_PORT: {e}"))?;

        let access_ttl_hours: i64 = env_or("POSDESK_ACCESS_TTL_HOURS", "24")
            .parse()
            .map_err(|e| format!("Invalid POSDESK_ACCESS_TTL_HOURS: {e}"))?;

        let refresh_ttl_days: i64 = env_or("POSDESK_REFRESH_TTL_DAYS", "7")
            .parse()
            .map_err(|e| format!("Invalid POSDESK_REFRESH_TTL_DAYS: {e}"))?;

        let cors_origins: Vec<String> = env_or("POSDESK_CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let rate_limit_window_secs: u64 = env_or("POSDESK_RATE_LIMIT_WINDOW", "60")
            .parse()
            .map_err(|e| format!("Invalid POSDESK_RATE_LIMIT_WINDOW: {e}"))?;

        let rate_limit_max: u32 = env_or("POSDESK_RATE_LIMIT_MAX", "120")
            .parse()
            .map_err(|e| format!("Invalid POSDESK_RATE_LIMIT_MAX: {e}"))?;

        let max_body_size: usize = env_or("POSDESK_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid POSDESK_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("POSDESK_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            access_ttl_hours,
            refresh_ttl_days,
            cors_origins,
            rate_limit_window_secs,
            rate_limit_max,
            max_body_size,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
