//! Compact signed encoding of responses.
//!
//! Every pipeline outcome, granted or rejected, leaves as
//! `base64url(header).base64url(payload).base64url(signature)` with an
//! RS256 signature over the exact `header.payload` bytes. The header names
//! the active key (`kid`) and, when configured, where verifiers can fetch
//! it (`jku`, `x5u`).

use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, Header};

use crate::error::TsaError;
use crate::keystore::KeyStore;
use crate::protocol::Response;

/// Type label carried in the token header.
const TOKEN_TYPE: &str = "Time-Stamp";

/// Signs canonicalized responses with the authority's RSA key.
pub struct TokenSigner {
    keys: Arc<KeyStore>,
    header: Header,
}

impl TokenSigner {
    /// Creates a signer bound to loaded key material.
    #[must_use]
    pub fn new(keys: Arc<KeyStore>) -> Self {
        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some(TOKEN_TYPE.to_string());
        header.kid = Some(keys.key_id().to_string());
        Self { keys, header }
    }

    /// Advertises the JWKS URL in every token header.
    #[must_use]
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.header.jku = Some(url.into());
        self
    }

    /// Advertises the certificate URL in every token header.
    #[must_use]
    pub fn with_certificate_url(mut self, url: impl Into<String>) -> Self {
        self.header.x5u = Some(url.into());
        self
    }

    /// The key material backing this signer.
    #[must_use]
    pub fn key_store(&self) -> &KeyStore {
        &self.keys
    }

    /// Canonicalizes and signs a response into its compact wire encoding.
    ///
    /// # Errors
    ///
    /// Fails only on key material faults; request-level problems never
    /// reach this point.
    pub fn sign(&self, response: &Response) -> Result<String, TsaError> {
        encode(&self.header, response, self.keys.encoding_key()).map_err(TsaError::from)
    }
}
