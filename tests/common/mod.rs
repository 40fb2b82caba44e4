//! Shared fixtures and fakes for the integration suites.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use tsa_service::keystore::KeyStore;
use tsa_service::pipeline::TsaPipeline;
use tsa_service::protocol::{Accuracy, MessageImprint, Nonce, Request, Response};
use tsa_service::serial::SerialNumberGenerator;
use tsa_service::time::{TimeSample, TimeSource, TimeSourceError};
use tsa_service::token::TokenSigner;

/// Digest of `"test"`, a convenient well-formed sha256 imprint.
pub const SHA256_DIGEST: &str =
    "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn key_store() -> KeyStore {
    KeyStore::open(
        &fixture("tsa_key1.pem"),
        &fixture("tsa_pub1.pem"),
        &fixture("tsa_cert1.pem"),
    )
    .expect("fixture key material must load")
}

pub fn signer() -> TokenSigner {
    TokenSigner::new(Arc::new(key_store()))
}

/// Pipeline over the fixture keys with an injected time source and a serial
/// state file under the caller's temp directory.
pub fn pipeline_with(source: Arc<dyn TimeSource>, serial_path: &Path) -> TsaPipeline {
    TsaPipeline::new(source, SerialNumberGenerator::open(serial_path), signer())
        .expect("pipeline must start with fixture key material")
}

/// Time source returning one fixed sample forever.
pub struct FakeTimeSource {
    pub sample: TimeSample,
}

impl FakeTimeSource {
    /// Midnight 2024-01-01 UTC with zero uncertainty.
    pub fn at_epoch_2024() -> Self {
        Self {
            sample: TimeSample {
                gen_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                accuracy: Accuracy::zero(),
            },
        }
    }

    pub fn with_accuracy(accuracy: Accuracy) -> Self {
        let mut fake = Self::at_epoch_2024();
        fake.sample.accuracy = accuracy;
        fake
    }
}

#[async_trait]
impl TimeSource for FakeTimeSource {
    async fn sample(&self) -> Result<TimeSample, TimeSourceError> {
        Ok(self.sample)
    }
}

/// Time source that never has trustworthy time.
pub struct FailingTimeSource;

#[async_trait]
impl TimeSource for FailingTimeSource {
    async fn sample(&self) -> Result<TimeSample, TimeSourceError> {
        Err(TimeSourceError::Unsynchronized)
    }
}

pub fn sha256_request(nonce: Option<Nonce>) -> Request {
    Request {
        version: 1,
        message_imprint: MessageImprint {
            hash_algorithm: "sha256".to_string(),
            hashed_message: SHA256_DIGEST.to_string(),
        },
        context: None,
        nonce,
    }
}

pub fn decoding_key() -> DecodingKey {
    let pem = std::fs::read(fixture("tsa_pub1.pem")).expect("public key fixture");
    DecodingKey::from_rsa_pem(&pem).expect("public key fixture must parse")
}

/// Verification rules for the compact tokens: RS256, signature required,
/// no registered-claim checks since the payload is a response, not a JWT.
pub fn verification() -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Verifies the signature against the fixture public key and returns the
/// decoded response payload.
pub fn decode_response(compact: &str) -> Response {
    jsonwebtoken::decode::<Response>(compact, &decoding_key(), &verification())
        .expect("response must verify against the fixture public key")
        .claims
}
