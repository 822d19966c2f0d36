//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use yatube_core::domain::POSTS_PER_PAGE;
use yatube_infra::auth::{DEV_SECRET, JwtConfig};
use yatube_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub posts_per_page: u64,
    /// How long a rendered index page is served from cache.
    pub index_cache_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: None,
            jwt: JwtConfig::default(),
            posts_per_page: POSTS_PER_PAGE,
            index_cache_ttl: Duration::from_secs(20),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = env::var("DATABASE_URL").ok().map(|url| {
            let base = DatabaseConfig::new(url);
            DatabaseConfig {
                max_connections: parse_or("DB_MAX_CONNECTIONS", base.max_connections),
                min_connections: parse_or("DB_MIN_CONNECTIONS", base.min_connections),
                run_migrations: parse_or("RUN_MIGRATIONS", base.run_migrations),
                ..base
            }
        });

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEV_SECRET.to_string()),
            expiration_hours: parse_or("JWT_EXPIRATION_HOURS", defaults.jwt.expiration_hours),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.jwt.issuer),
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", defaults.port),
            database,
            jwt,
            posts_per_page: parse_or("POSTS_PER_PAGE", defaults.posts_per_page).max(1),
            index_cache_ttl: Duration::from_secs(parse_or(
                "INDEX_CACHE_SECONDS",
                defaults.index_cache_ttl.as_secs(),
            )),
        }
    }
}

/// Read `key` and parse it, falling back to `default` when unset or malformed.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring malformed setting");
            default
        }),
        Err(_) => default,
    }
}
