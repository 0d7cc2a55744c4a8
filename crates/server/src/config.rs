//! Server configuration loaded from environment variables.
//!
//! Every variable has a default, so a bare `fairweather-server` starts a
//! local instance backed by `weather_app.db` in the working directory.
//!
//! # Environment Variables
//!
//! - `FAIRWEATHER_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`, default: `sqlite://weather_app.db?mode=rwc`)
//! - `FAIRWEATHER_HOST` - Bind address (default: 127.0.0.1)
//! - `FAIRWEATHER_PORT` - Listen port (default: 5000)
//! - `FAIRWEATHER_BASE_URL` - Public URL; `https://` enables secure cookies
//!   (default: `http://localhost:5000`)
//! - `FAIRWEATHER_SESSION_TTL_HOURS` - Session inactivity expiry (default: 168)
//! - `FAIRWEATHER_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `FAIRWEATHER_LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry performance sample rate (default: 0.0)

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_DATABASE_URL: &str = "sqlite://weather_app.db?mode=rwc";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_SESSION_TTL_HOURS: u64 = 7 * 24;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration.
///
/// `Debug` output is safe to log: the database URL is a `SecretString`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the API, validated as an http(s) URL
    pub base_url: String,
    /// Sessions expire after this long without a request
    pub session_ttl: Duration,
    /// Maximum number of pooled database connections
    pub db_max_connections: u32,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of requests traced by Sentry
    pub sentry_traces_sample_rate: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: SecretString::from(DEFAULT_DATABASE_URL),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            base_url: DEFAULT_BASE_URL.to_owned(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_HOURS * 60 * 60),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("FAIRWEATHER_DATABASE_URL");
        let host = parse_env("FAIRWEATHER_HOST", "127.0.0.1")?;
        let port = parse_env("FAIRWEATHER_PORT", &DEFAULT_PORT.to_string())?;
        let base_url = match get_optional_env("FAIRWEATHER_BASE_URL") {
            Some(raw) => parse_base_url("FAIRWEATHER_BASE_URL", &raw)?,
            None => DEFAULT_BASE_URL.to_owned(),
        };

        let ttl_hours: u64 = parse_env(
            "FAIRWEATHER_SESSION_TTL_HOURS",
            &DEFAULT_SESSION_TTL_HOURS.to_string(),
        )?;
        let ttl_hours = require_positive("FAIRWEATHER_SESSION_TTL_HOURS", ttl_hours)?;

        let db_max_connections: u32 = parse_env(
            "FAIRWEATHER_DB_MAX_CONNECTIONS",
            &DEFAULT_DB_MAX_CONNECTIONS.to_string(),
        )?;
        let db_max_connections =
            require_positive("FAIRWEATHER_DB_MAX_CONNECTIONS", db_max_connections)?;

        let log_format = get_optional_env("FAIRWEATHER_LOG_FORMAT")
            .map_or(LogFormat::Text, |v| parse_log_format(&v));

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_ttl: Duration::from_secs(ttl_hours * 60 * 60),
            db_max_connections,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to the generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> SecretString {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_or_else(
            |_| SecretString::from(DEFAULT_DATABASE_URL),
            SecretString::from,
        )
}

/// Get an optional, non-empty environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value and parse it.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_value(key, &raw)
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_base_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url: Url = parse_value(key, raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url.as_str().trim_end_matches('/').to_owned()),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {other:?}"),
        )),
    }
}

fn require_positive<T>(key: &str, value: T) -> Result<T, ConfigError>
where
    T: PartialOrd + Default + Display,
{
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be greater than zero (got {value})"),
        ))
    }
}

fn parse_log_format(value: &str) -> LogFormat {
    if value.eq_ignore_ascii_case("json") {
        LogFormat::Json
    } else {
        LogFormat::Text
    }
}
