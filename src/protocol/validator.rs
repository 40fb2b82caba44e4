//! Protocol rules for inbound requests.

use crate::protocol::nonce::Nonce;
use crate::protocol::request::{MessageImprint, Request, PROTOCOL_VERSION};
use crate::protocol::response::FailureReason;

/// Digest algorithms this authority accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-1, kept for legacy clients.
    Sha1,
    /// SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Resolves a request's algorithm name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    /// Expected digest length in hex characters.
    #[must_use]
    pub const fn digest_hex_len(&self) -> usize {
        match self {
            Self::Sha1 => 40,
            Self::Sha256 => 64,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

/// A request that passed protocol validation, with its resolved algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRequest {
    request: Request,
    algorithm: HashAlgorithm,
}

impl ValidRequest {
    /// The resolved digest algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The underlying request.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The validated message imprint.
    #[must_use]
    pub fn imprint(&self) -> &MessageImprint {
        &self.request.message_imprint
    }

    /// Client label, if supplied.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.request.context.as_deref()
    }

    /// Client nonce, if supplied.
    #[must_use]
    pub fn nonce(&self) -> Option<Nonce> {
        self.request.nonce
    }
}

/// Checks parsed requests against the protocol rules.
///
/// Pure and stateless: each check reads the request and produces either a
/// [`ValidRequest`] or the rejection reason the response must carry.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestValidator;

impl RequestValidator {
    /// Creates a validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validates a parsed request, or its absence.
    ///
    /// # Errors
    ///
    /// - [`FailureReason::BadDataFormat`] when the request is absent (the
    ///   body did not parse) or the digest does not match the algorithm's
    ///   expected hex form.
    /// - [`FailureReason::BadRequest`] when the version is not the
    ///   implemented protocol version.
    /// - [`FailureReason::BadAlg`] when the hash algorithm is unsupported.
    pub fn validate(&self, raw: Option<Request>) -> Result<ValidRequest, FailureReason> {
        let request = raw.ok_or(FailureReason::BadDataFormat)?;

        if request.version != PROTOCOL_VERSION {
            return Err(FailureReason::BadRequest);
        }

        let algorithm = HashAlgorithm::from_name(&request.message_imprint.hash_algorithm)
            .ok_or(FailureReason::BadAlg)?;

        let digest = &request.message_imprint.hashed_message;
        if digest.len() != algorithm.digest_hex_len()
            || !digest.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(FailureReason::BadDataFormat);
        }

        Ok(ValidRequest { request, algorithm })
    }
}
