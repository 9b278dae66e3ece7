// crates/titanic-e2e/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed endpoint configuration for the harness.
// Purpose: Centralize env parsing with strict UTF-8 and URL validation.
// Dependencies: thiserror, url
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8, empty values, non-HTTP URLs and zero
//! timeouts fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default API gateway address.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8000";
/// Default passenger service address.
pub const DEFAULT_PASSENGER_URL: &str = "http://localhost:8001";
/// Default statistics service address.
pub const DEFAULT_STATS_URL: &str = "http://localhost:8002";
/// Default auth service address.
pub const DEFAULT_AUTH_URL: &str = "http://localhost:8003";
/// Default Kafka bootstrap broker.
pub const DEFAULT_KAFKA_BROKER: &str = "localhost:9092";
/// Default topic carrying Titanic domain events.
pub const DEFAULT_KAFKA_TOPIC: &str = "titanic-events";
/// Default per-request HTTP timeout.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// API gateway base URL.
    GatewayUrl,
    /// Passenger service base URL.
    PassengerUrl,
    /// Statistics service base URL.
    StatsUrl,
    /// Auth service base URL.
    AuthUrl,
    /// Comma-separated Kafka bootstrap brokers.
    KafkaBrokers,
    /// Kafka topic for domain events.
    KafkaTopic,
    /// Per-request HTTP timeout in seconds (positive integer).
    HttpTimeoutSeconds,
}

impl HarnessEnv {
    /// Every key, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::GatewayUrl,
        Self::PassengerUrl,
        Self::StatsUrl,
        Self::AuthUrl,
        Self::KafkaBrokers,
        Self::KafkaTopic,
        Self::HttpTimeoutSeconds,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GatewayUrl => "TITANIC_E2E_GATEWAY_URL",
            Self::PassengerUrl => "TITANIC_E2E_PASSENGER_URL",
            Self::StatsUrl => "TITANIC_E2E_STATS_URL",
            Self::AuthUrl => "TITANIC_E2E_AUTH_URL",
            Self::KafkaBrokers => "TITANIC_E2E_KAFKA_BROKERS",
            Self::KafkaTopic => "TITANIC_E2E_KAFKA_TOPIC",
            Self::HttpTimeoutSeconds => "TITANIC_E2E_HTTP_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading harness configuration.
///
/// # Invariants
/// - Every variant names the offending environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Value is not valid UTF-8.
    #[error("{0} must be valid UTF-8")]
    InvalidUtf8(String),
    /// Value is set but empty or whitespace.
    #[error("{0} must not be empty")]
    Empty(String),
    /// Value is not an absolute http(s) URL.
    #[error("{name} must be an http(s) URL: {reason}")]
    InvalidUrl {
        /// Environment variable name.
        name: String,
        /// Parse or scheme failure.
        reason: String,
    },
    /// Value is not a positive integer number of seconds.
    #[error("{0} must be a positive integer number of seconds")]
    InvalidTimeout(String),
    /// Broker list contains an empty entry.
    #[error("{0} must be a comma-separated list of host:port entries")]
    InvalidBrokers(String),
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Swagger UI page exposed by one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsEndpoint {
    /// Display name of the service.
    pub name: &'static str,
    /// Absolute URL of the docs page.
    pub url: String,
}

/// Typed harness configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// API gateway base URL.
    pub gateway_url: Url,
    /// Passenger service base URL.
    pub passenger_url: Url,
    /// Statistics service base URL.
    pub stats_url: Url,
    /// Auth service base URL.
    pub auth_url: Url,
    /// Kafka bootstrap brokers.
    pub kafka_brokers: Vec<String>,
    /// Kafka topic for domain events.
    pub kafka_topic: String,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl HarnessConfig {
    /// Loads configuration from environment variables, falling back to the
    /// local defaults for unset keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is not valid UTF-8, is empty, or
    /// fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let gateway_url = read_url(HarnessEnv::GatewayUrl, DEFAULT_GATEWAY_URL)?;
        let passenger_url = read_url(HarnessEnv::PassengerUrl, DEFAULT_PASSENGER_URL)?;
        let stats_url = read_url(HarnessEnv::StatsUrl, DEFAULT_STATS_URL)?;
        let auth_url = read_url(HarnessEnv::AuthUrl, DEFAULT_AUTH_URL)?;
        let kafka_brokers = read_env_nonempty(HarnessEnv::KafkaBrokers.as_str())?
            .map(|raw| parse_brokers(HarnessEnv::KafkaBrokers.as_str(), &raw))
            .transpose()?
            .unwrap_or_else(|| vec![DEFAULT_KAFKA_BROKER.to_string()]);
        let kafka_topic = read_env_nonempty(HarnessEnv::KafkaTopic.as_str())?
            .map_or_else(|| DEFAULT_KAFKA_TOPIC.to_string(), |topic| topic.trim().to_string());
        let http_timeout = read_env_nonempty(HarnessEnv::HttpTimeoutSeconds.as_str())?
            .map(|raw| parse_timeout_seconds(HarnessEnv::HttpTimeoutSeconds.as_str(), &raw))
            .transpose()?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT);
        Ok(Self {
            gateway_url,
            passenger_url,
            stats_url,
            auth_url,
            kafka_brokers,
            kafka_topic,
            http_timeout,
        })
    }

    /// Builds a configuration whose four service URLs all point at `base`.
    ///
    /// Used when a single stub server stands in for the whole deployment.
    #[must_use]
    pub fn single_host(base: Url) -> Self {
        Self {
            gateway_url: base.clone(),
            passenger_url: base.clone(),
            stats_url: base.clone(),
            auth_url: base,
            kafka_brokers: vec![DEFAULT_KAFKA_BROKER.to_string()],
            kafka_topic: DEFAULT_KAFKA_TOPIC.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Returns the gateway base URL without a trailing slash.
    #[must_use]
    pub fn gateway_base(&self) -> String {
        trim_base(&self.gateway_url)
    }

    /// Returns the auth service base URL without a trailing slash.
    #[must_use]
    pub fn auth_base(&self) -> String {
        trim_base(&self.auth_url)
    }

    /// Returns the Swagger UI endpoints for every service.
    #[must_use]
    pub fn docs_endpoints(&self) -> Vec<DocsEndpoint> {
        [
            ("Gateway", &self.gateway_url),
            ("Auth Service", &self.auth_url),
            ("Passenger Service", &self.passenger_url),
            ("Statistics Service", &self.stats_url),
        ]
        .into_iter()
        .map(|(name, base)| DocsEndpoint {
            name,
            url: format!("{}/docs", trim_base(base)),
        })
        .collect()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUtf8`] when the variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::InvalidUtf8(name.to_string()))
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(name.to_string())),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Reads and validates an http(s) URL variable, parsing `default` when unset.
fn read_url(key: HarnessEnv, default: &str) -> Result<Url, ConfigError> {
    let raw = read_env_nonempty(key.as_str())?;
    parse_http_url(key.as_str(), raw.as_deref().unwrap_or(default))
}

/// Parses an absolute http(s) URL.
fn parse_http_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidUrl {
        name: name.to_string(),
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl {
            name: name.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

/// Parses a comma-separated broker list.
fn parse_brokers(name: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let brokers: Vec<String> = raw.split(',').map(|entry| entry.trim().to_string()).collect();
    if brokers.iter().any(String::is_empty) {
        return Err(ConfigError::InvalidBrokers(name.to_string()));
    }
    Ok(brokers)
}

/// Parses a positive timeout value from an environment variable string.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 =
        raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout(name.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidTimeout(name.to_string()));
    }
    Ok(Duration::from_secs(secs))
}

/// Renders a base URL without its trailing slash.
fn trim_base(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}
