//! Products API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `LUXE_ENV` - `development` or `production` (default: development)
//! - `LUXE_API_BASE_URL` - Override the products API base URL
//! - `LUXE_API_TOKEN` - Bearer token sent with every request
//! - `LUXE_API_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `LUXE_API_ACCEPT_INVALID_CERTS` - Accept self-signed TLS certificates
//!   (default: true in development, false in production)

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Base URL of the API when running locally.
pub const DEVELOPMENT_BASE_URL: &str = "https://localhost:7231/api";

/// Base URL of the API behind the production gateway.
pub const PRODUCTION_BASE_URL: &str = "http://172.20.1.17:82/api";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Deployment environment, used to pick the default base URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// The API base URL this environment talks to by default.
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Development => DEVELOPMENT_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Products API client configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Environment the base URL was resolved for
    pub environment: Environment,
    /// API base URL, without a trailing slash
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Accept self-signed certificates (local dev API uses one)
    pub accept_invalid_certs: bool,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration for a given base URL with every other setting defaulted.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            environment: Environment::Development,
            base_url,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            accept_invalid_certs: false,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("LUXE_ENV") {
            Some(raw) => raw
                .parse::<Environment>()
                .map_err(|e| ConfigError::InvalidEnvVar("LUXE_ENV".to_string(), e))?,
            None => Environment::default(),
        };

        let base_url = resolve_base_url(environment, get("LUXE_API_BASE_URL").as_deref())?;

        let timeout_secs = match get("LUXE_API_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("LUXE_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let accept_invalid_certs = match get("LUXE_API_ACCEPT_INVALID_CERTS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "LUXE_API_ACCEPT_INVALID_CERTS".to_string(),
                    format!("expected true or false, got '{raw}'"),
                )
            })?,
            None => environment == Environment::Development,
        };

        Ok(Self {
            environment,
            base_url,
            token: get("LUXE_API_TOKEN").map(SecretString::from),
            timeout: Duration::from_secs(timeout_secs),
            accept_invalid_certs,
        })
    }
}

/// Pick the API base URL: an explicit override wins, otherwise the
/// environment's default.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the override is not an absolute
/// `http(s)` URL.
pub fn resolve_base_url(
    environment: Environment,
    override_url: Option<&str>,
) -> Result<Url, ConfigError> {
    let (key, raw) = match override_url.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => ("LUXE_API_BASE_URL", raw),
        None => ("LUXE_ENV", environment.default_base_url()),
    };

    let url = Url::parse(raw.trim_end_matches('/'))
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_to_development() {
        let config = load(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.base_url.as_str(), "https://localhost:7231/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.accept_invalid_certs);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_production_default_url() {
        let config = load(&[("LUXE_ENV", "Production")]).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.base_url.as_str(), "http://172.20.1.17:82/api");
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_override_wins_and_trailing_slash_dropped() {
        let config = load(&[
            ("LUXE_ENV", "production"),
            ("LUXE_API_BASE_URL", "https://api.example.test/v2/"),
        ])
        .unwrap();
        assert_eq!(config.base_url.as_str(), "https://api.example.test/v2");
    }

    #[test]
    fn test_blank_override_ignored() {
        let config = load(&[("LUXE_API_BASE_URL", "   ")]).unwrap();
        assert_eq!(config.base_url.as_str(), DEVELOPMENT_BASE_URL);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            load(&[("LUXE_ENV", "staging")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "LUXE_ENV"
        ));
        assert!(matches!(
            load(&[("LUXE_API_BASE_URL", "ftp://files.test/api")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "LUXE_API_BASE_URL"
        ));
        assert!(matches!(
            load(&[("LUXE_API_TIMEOUT_SECS", "ten")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "LUXE_API_TIMEOUT_SECS"
        ));
        assert!(matches!(
            load(&[("LUXE_API_ACCEPT_INVALID_CERTS", "maybe")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "LUXE_API_ACCEPT_INVALID_CERTS"
        ));
    }

    #[test]
    fn test_token_and_timeout() {
        let config = load(&[
            ("LUXE_API_TOKEN", "tok_abc123"),
            ("LUXE_API_TIMEOUT_SECS", "3"),
            ("LUXE_API_ACCEPT_INVALID_CERTS", "false"),
        ])
        .unwrap();
        assert_eq!(config.token.as_ref().unwrap().expose_secret(), "tok_abc123");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[("LUXE_API_TOKEN", "tok_abc123")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("tok_abc123"));
        assert!(debug.contains("[REDACTED]"));
    }
}
