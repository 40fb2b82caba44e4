//! Centralized configuration.
//!
//! All configuration is read from environment variables once at startup
//! into an immutable struct. Defaults follow the conventional deployment
//! layout under `/var/lib/tsa`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::TsaError;

/// Strategy used to acquire trusted time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSourceKind {
    /// Local clock plus chrony tracking offset.
    Chrony,
    /// Roughtime client midpoint and radius.
    Roughtime,
}

impl TimeSourceKind {
    /// Parses a strategy name.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown names.
    pub fn from_str(s: &str) -> Result<Self, TsaError> {
        match s.to_lowercase().as_str() {
            "chrony" => Ok(Self::Chrony),
            "roughtime" => Ok(Self::Roughtime),
            _ => Err(TsaError::config(format!("Invalid time source: {s}"))),
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chrony => "chrony",
            Self::Roughtime => "roughtime",
        }
    }
}

/// Time-stamping authority configuration.
#[derive(Debug, Clone)]
pub struct Config {
    // Key material
    /// PEM RSA private signing key.
    pub private_key_path: PathBuf,
    /// PEM public key (SPKI).
    pub public_key_path: PathBuf,
    /// PEM certificate.
    pub certificate_path: PathBuf,

    // Serial state
    /// File holding the last issued serial number.
    pub serial_path: PathBuf,

    // Time source
    /// Selected acquisition strategy.
    pub time_source: TimeSourceKind,
    /// chrony client binary.
    pub chrony_command: String,
    /// roughtime client binary.
    pub roughtime_client: String,
    /// roughtime server address.
    pub roughtime_server: String,
    /// roughtime server port.
    pub roughtime_port: u16,
    /// Bound on any single time client invocation.
    pub time_source_timeout: Duration,

    // Token header references
    /// Advertised JWKS URL (`jku`), omitted when unset.
    pub jwks_url: Option<String>,
    /// Advertised certificate URL (`x5u`), omitted when unset.
    pub certificate_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a present variable fails to parse.
    pub fn from_env() -> Result<Self, TsaError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            private_key_path: path_env("TSA_PRIVATE_KEY_PATH", "/var/lib/tsa/tsa_key1.pem"),
            public_key_path: path_env("TSA_PUBLIC_KEY_PATH", "/var/lib/tsa/tsa_pub1.pem"),
            certificate_path: path_env("TSA_CERTIFICATE_PATH", "/var/lib/tsa/tsa_cert1.pem"),
            serial_path: path_env("TSA_SERIAL_PATH", "/var/lib/tsa/serial.num"),
            time_source: TimeSourceKind::from_str(
                &env::var("TSA_TIME_SOURCE").unwrap_or_else(|_| "chrony".to_string()),
            )?,
            chrony_command: env::var("TSA_CHRONY_COMMAND")
                .unwrap_or_else(|_| "/usr/bin/chronyc".to_string()),
            roughtime_client: env::var("TSA_ROUGHTIME_CLIENT")
                .unwrap_or_else(|_| "/usr/local/bin/roughenough-client".to_string()),
            roughtime_server: env::var("TSA_ROUGHTIME_SERVER")
                .unwrap_or_else(|_| "roughtime.int08h.com".to_string()),
            roughtime_port: parse_env("TSA_ROUGHTIME_PORT", 2002)?,
            time_source_timeout: Duration::from_secs(parse_env("TSA_TIME_SOURCE_TIMEOUT", 5)?),
            jwks_url: env::var("TSA_JWKS_URL").ok(),
            certificate_url: env::var("TSA_CERTIFICATE_URL").ok(),
        })
    }
}

/// Parses an environment variable with a default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, TsaError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| TsaError::config(format!("Invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Reads a path variable with a default value.
fn path_env(name: &str, default: &str) -> PathBuf {
    env::var(name)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
