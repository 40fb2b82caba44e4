//! Signing key material.
//!
//! Keys are provisioned out of band as PEM files (private key, public key,
//! certificate), loaded once at startup, validated, and shared read-only
//! for the life of the process. The public half is also exposed as a JWKS
//! document whose key id is the RFC 7638 thumbprint, so verifiers can fetch
//! `{n, e}` without parsing PEM.

use std::path::Path;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use zeroize::Zeroize;

use crate::config::Config;
use crate::error::TsaError;

/// A single public JSON Web Key (RSA, signature use).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type, always `RSA`.
    pub kty: String,
    /// Key identifier, the RFC 7638 thumbprint.
    pub kid: String,
    /// Key use, always `sig`.
    #[serde(rename = "use")]
    pub key_use: String,
    /// Signature algorithm the key is used with.
    pub alg: String,
    /// Base64url modulus.
    pub n: String,
    /// Base64url public exponent.
    pub e: String,
}

/// A JSON Web Key Set carrying this authority's public keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    /// Published keys, currently exactly one.
    pub keys: Vec<Jwk>,
}

impl Jwks {
    /// Serializes the key set document.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Immutable key material shared across all issuances.
pub struct KeyStore {
    encoding_key: EncodingKey,
    public_key_pem: String,
    certificate_pem: String,
    key_id: String,
    jwks: Jwks,
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("key_id", &self.key_id)
            .field("jwks", &self.jwks)
            .finish_non_exhaustive()
    }
}

impl KeyStore {
    /// Loads key material from the configured paths.
    ///
    /// # Errors
    ///
    /// See [`KeyStore::open`].
    pub fn load(config: &Config) -> Result<Self, TsaError> {
        Self::open(
            &config.private_key_path,
            &config.public_key_path,
            &config.certificate_path,
        )
    }

    /// Loads and validates key material from explicit paths.
    ///
    /// # Errors
    ///
    /// Fails fast on unreadable files or encodings the signer cannot use.
    /// This is a deployment fault and is checked at startup, never per
    /// request.
    pub fn open(
        private_key: &Path,
        public_key: &Path,
        certificate: &Path,
    ) -> Result<Self, TsaError> {
        let mut private_pem = std::fs::read(private_key).map_err(|err| {
            TsaError::key_material(format!(
                "cannot read private key {}: {err}",
                private_key.display()
            ))
        })?;
        let encoding_key = EncodingKey::from_rsa_pem(&private_pem).map_err(|err| {
            TsaError::key_material(format!(
                "private key {} is not a usable RSA PEM: {err}",
                private_key.display()
            ))
        });
        private_pem.zeroize();
        let encoding_key = encoding_key?;

        let public_key_pem = std::fs::read_to_string(public_key).map_err(|err| {
            TsaError::key_material(format!(
                "cannot read public key {}: {err}",
                public_key.display()
            ))
        })?;
        let certificate_pem = std::fs::read_to_string(certificate).map_err(|err| {
            TsaError::key_material(format!(
                "cannot read certificate {}: {err}",
                certificate.display()
            ))
        })?;

        let rsa_public = RsaPublicKey::from_public_key_pem(&public_key_pem).map_err(|err| {
            TsaError::key_material(format!(
                "public key {} is not an RSA SPKI PEM: {err}",
                public_key.display()
            ))
        })?;
        let n = URL_SAFE_NO_PAD.encode(rsa_public.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(rsa_public.e().to_bytes_be());
        let key_id = thumbprint(&n, &e);
        let jwks = Jwks {
            keys: vec![Jwk {
                kty: "RSA".to_string(),
                kid: key_id.clone(),
                key_use: "sig".to_string(),
                alg: "RS256".to_string(),
                n,
                e,
            }],
        };

        info!(kid = %key_id, "Key material loaded");

        Ok(Self {
            encoding_key,
            public_key_pem,
            certificate_pem,
            key_id,
            jwks,
        })
    }

    /// Key used to sign responses.
    #[must_use]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Verification key matching the signer, mainly for tests and local
    /// verification tooling.
    ///
    /// # Errors
    ///
    /// Fails if the stored public PEM cannot back a verification key.
    pub fn decoding_key(&self) -> Result<DecodingKey, TsaError> {
        DecodingKey::from_rsa_pem(self.public_key_pem.as_bytes()).map_err(|err| {
            TsaError::key_material(format!("public key cannot verify: {err}"))
        })
    }

    /// Identifier of the active signing key.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// PEM public key, served read-only by the surrounding service.
    #[must_use]
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    /// PEM certificate, served read-only by the surrounding service.
    #[must_use]
    pub fn certificate_pem(&self) -> &str {
        &self.certificate_pem
    }

    /// Published key set.
    #[must_use]
    pub fn jwks(&self) -> &Jwks {
        &self.jwks
    }

    /// Serialized key set document.
    #[must_use]
    pub fn jwks_json(&self) -> String {
        self.jwks.to_json()
    }
}

/// RFC 7638 thumbprint over the canonical `{"e":..,"kty":"RSA","n":..}`
/// member ordering.
fn thumbprint(n: &str, e: &str) -> String {
    let canonical = format!(r#"{{"e":"{e}","kty":"RSA","n":"{n}"}}"#);
    let hash = Sha256::digest(canonical.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbprint_is_deterministic_and_url_safe() {
        let a = thumbprint("AQAB-modulus", "AQAB");
        let b = thumbprint("AQAB-modulus", "AQAB");
        assert_eq!(a, b);
        assert_eq!(a.len(), 43);
        assert!(!a.contains('='));
        assert!(!a.contains('+'));
        assert!(!a.contains('/'));
    }

    #[test]
    fn thumbprint_depends_on_both_members() {
        assert_ne!(thumbprint("n1", "AQAB"), thumbprint("n2", "AQAB"));
        assert_ne!(thumbprint("n1", "AQAB"), thumbprint("n1", "AQAC"));
    }

    #[test]
    fn jwks_serializes_use_member() {
        let jwks = Jwks {
            keys: vec![Jwk {
                kty: "RSA".to_string(),
                kid: "kid".to_string(),
                key_use: "sig".to_string(),
                alg: "RS256".to_string(),
                n: "n".to_string(),
                e: "AQAB".to_string(),
            }],
        };
        let json = jwks.to_json();
        assert!(json.contains("\"use\":\"sig\""));
        assert!(json.contains("\"kty\":\"RSA\""));
    }
}
