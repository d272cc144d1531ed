use std::path::PathBuf;

use showcase_core::featured::{PinPolicy, DEFAULT_FEATURED_COUNT};
use showcase_core::search::DEFAULT_PAGE_SIZE;

use crate::auth::jwt::JwtConfig;

/// Default upper bound for an imported snapshot body.
pub const DEFAULT_SNAPSHOT_MAX_BYTES: usize = 16 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// SQLite database URL (default: `sqlite://showcase.db`).
    pub database_url: String,
    /// Optional JSON snapshot used to seed an empty database at startup.
    pub snapshot_seed_path: Option<PathBuf>,
    /// Featured slots returned when the client does not ask for a count.
    pub featured_count: usize,
    /// Treatment of pinned projects that are not published.
    pub pin_policy: PinPolicy,
    /// Catalog page size when the client does not ask for one.
    pub default_page_size: i64,
    /// Largest snapshot document accepted by `PUT /admin/snapshot`.
    pub snapshot_max_bytes: usize,
    /// JWT verification settings.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`          | `sqlite://showcase.db`     |
    /// | `SNAPSHOT_SEED_PATH`    | unset                      |
    /// | `FEATURED_COUNT`        | `6`                        |
    /// | `FEATURED_PIN_POLICY`   | `keep`                     |
    /// | `DEFAULT_PAGE_SIZE`     | `12`                       |
    /// | `SNAPSHOT_MAX_BYTES`    | `16777216` (16 MiB)        |
    ///
    /// # Panics
    ///
    /// Panics on unparseable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://showcase.db".into());

        let snapshot_seed_path = std::env::var("SNAPSHOT_SEED_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let featured_count: usize = std::env::var("FEATURED_COUNT")
            .unwrap_or_else(|_| DEFAULT_FEATURED_COUNT.to_string())
            .parse()
            .expect("FEATURED_COUNT must be a valid usize");

        let pin_policy: PinPolicy = std::env::var("FEATURED_PIN_POLICY")
            .unwrap_or_else(|_| "keep".into())
            .parse()
            .expect("FEATURED_PIN_POLICY must be 'keep' or 'drop'");

        let default_page_size: i64 = std::env::var("DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .expect("DEFAULT_PAGE_SIZE must be a valid i64");

        let snapshot_max_bytes: usize = std::env::var("SNAPSHOT_MAX_BYTES")
            .unwrap_or_else(|_| DEFAULT_SNAPSHOT_MAX_BYTES.to_string())
            .parse()
            .expect("SNAPSHOT_MAX_BYTES must be a valid usize");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            snapshot_seed_path,
            featured_count,
            pin_policy,
            default_page_size,
            snapshot_max_bytes,
            jwt,
        }
    }
}
