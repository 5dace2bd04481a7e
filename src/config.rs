// src/config.rs

use std::env;
use std::time::Duration;
use dotenvy::dotenv;

/// Smallest exam the selector will hand out.
pub const MIN_EXAM_QUESTIONS: usize = 5;

/// Percentage of easy and medium questions in a predicted paper; hard takes the rest.
pub const PREDICTED_EASY_PERCENT: usize = 30;
pub const PREDICTED_MEDIUM_PERCENT: usize = 50;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const LEADERBOARD_SIZE: i64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without it the in-memory store is used.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    pub cache_ttl: Duration,
    /// JSON file of subjects upserted on start-up.
    pub curriculum_seed_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let cache_ttl = parse_ttl(env::var("CURRICULUM_CACHE_TTL_SECS").ok().as_deref());

        let curriculum_seed_path = env::var("CURRICULUM_SEED_PATH").ok().filter(|v| !v.is_empty());

        Self {
            database_url,
            jwt_secret,
            rust_log,
            port,
            cache_ttl,
            curriculum_seed_path,
        }
    }
}

fn parse_ttl(raw: Option<&str>) -> Duration {
    let secs = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_CACHE_TTL_SECS);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_defaults_to_five_minutes() {
        assert_eq!(parse_ttl(None), Duration::from_secs(300));
        assert_eq!(parse_ttl(Some("not a number")), Duration::from_secs(300));
        assert_eq!(parse_ttl(Some(" 60 ")), Duration::from_secs(60));
    }
}
