//! Error types for the time-stamping authority.

use thiserror::Error;

use crate::time::TimeSourceError;

/// Faults raised inside the issuance pipeline.
///
/// Client-side protocol violations never appear here; they are expressed as
/// rejection responses. These variants cover authority-side conditions that
/// the pipeline maps to `timeNotAvailable` or `systemFailure` outcomes.
#[derive(Error, Debug)]
pub enum TsaError {
    /// Key material could not be loaded or is unusable for signing.
    #[error("Key material error: {0}")]
    KeyMaterial(String),

    /// Canonicalizing or signing a response failed.
    #[error("Token signing error: {0}")]
    Signing(String),

    /// Serial number issuance or persistence failed.
    #[error("Serial number error: {0}")]
    Serial(String),

    /// No trustworthy time sample could be acquired.
    #[error("Trusted time unavailable: {0}")]
    TimeUnavailable(#[from] TimeSourceError),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TsaError {
    /// Creates a key material error.
    pub fn key_material(msg: impl Into<String>) -> Self {
        Self::KeyMaterial(msg.into())
    }

    /// Creates a signing error.
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    /// Creates a serial number error.
    pub fn serial(msg: impl Into<String>) -> Self {
        Self::Serial(msg.into())
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<jsonwebtoken::errors::Error> for TsaError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Signing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_context() {
        let err = TsaError::key_material("missing PEM");
        assert!(err.to_string().contains("missing PEM"));

        let err = TsaError::serial("disk full");
        assert!(err.to_string().contains("Serial number error"));
    }
}
