//! The issuance pipeline.
//!
//! One request flows validate -> acquire trusted time -> issue serial ->
//! assemble -> sign. The first failed stage short-circuits into a rejection
//! carrying the matching reason, and the rejection is signed exactly like a
//! grant: every response that leaves this pipeline is a compact signed
//! string, so clients can authenticate refusals too.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::TsaError;
use crate::keystore::KeyStore;
use crate::metrics;
use crate::protocol::{FailureReason, Request, RequestValidator, Response};
use crate::serial::SerialNumberGenerator;
use crate::time::{self, TimeSource};
use crate::token::{TokenBuilder, TokenSigner};

/// Orchestrates the whole issuance flow for one authority.
pub struct TsaPipeline {
    validator: RequestValidator,
    time_source: Arc<dyn TimeSource>,
    serials: SerialNumberGenerator,
    builder: TokenBuilder,
    signer: TokenSigner,
    /// Pre-signed `systemFailure` rejection, the answer of last resort if
    /// signing itself starts failing mid-flight.
    system_failure: String,
}

impl TsaPipeline {
    /// Wires a pipeline from its parts.
    ///
    /// # Errors
    ///
    /// Fails when the signer cannot produce the pre-signed `systemFailure`
    /// fallback, which means the key material is unusable and the authority
    /// must not start.
    pub fn new(
        time_source: Arc<dyn TimeSource>,
        serials: SerialNumberGenerator,
        signer: TokenSigner,
    ) -> Result<Self, TsaError> {
        let system_failure = signer.sign(&Response::rejection(FailureReason::SystemFailure))?;
        Ok(Self {
            validator: RequestValidator::new(),
            time_source,
            serials,
            builder: TokenBuilder::new(),
            signer,
            system_failure,
        })
    }

    /// Wires a pipeline from configuration: key material, serial state and
    /// the selected time source strategy.
    ///
    /// # Errors
    ///
    /// Fails on unusable key material.
    pub fn from_config(config: &Config) -> Result<Self, TsaError> {
        let keys = Arc::new(KeyStore::load(config)?);
        let mut signer = TokenSigner::new(keys);
        if let Some(url) = &config.jwks_url {
            signer = signer.with_jwks_url(url.clone());
        }
        if let Some(url) = &config.certificate_url {
            signer = signer.with_certificate_url(url.clone());
        }
        let serials = SerialNumberGenerator::open(&config.serial_path);
        let time_source = time::from_config(config);
        Self::new(time_source, serials, signer)
    }

    /// Key material backing this pipeline, for the read-only distribution
    /// endpoints of the surrounding service.
    #[must_use]
    pub fn key_store(&self) -> &KeyStore {
        self.signer.key_store()
    }

    /// Handles one request end to end, always yielding a signed compact
    /// string.
    ///
    /// `raw` is `None` when the transport could not parse a request at all;
    /// that still gets a signed `badDataFormat` rejection.
    pub async fn respond(&self, raw: Option<Request>) -> String {
        let response = self.process(raw).await;
        let started = Instant::now();
        match self.signer.sign(&response) {
            Ok(compact) => {
                metrics::record_signing_latency(started.elapsed().as_secs_f64());
                compact
            }
            Err(err) => {
                error!(error = %err, "Signing failed; answering with pre-signed systemFailure");
                metrics::record_rejection(FailureReason::SystemFailure.as_str());
                self.system_failure.clone()
            }
        }
    }

    /// Runs the unsigned part of the flow, mapping every fault to its
    /// rejection reason.
    async fn process(&self, raw: Option<Request>) -> Response {
        let request = match self.validator.validate(raw) {
            Ok(request) => request,
            Err(reason) => {
                warn!(reason = reason.as_str(), "Request failed validation");
                return self.reject(reason);
            }
        };

        let sample = match self.time_source.sample().await {
            Ok(sample) => {
                metrics::record_time_source_sample("ok");
                sample
            }
            Err(err) => {
                warn!(error = %err, "Trusted time unavailable");
                metrics::record_time_source_sample("error");
                return self.reject(FailureReason::TimeNotAvailable);
            }
        };

        let serial = match self.serials.next().await {
            Ok(serial) => serial,
            Err(err) => {
                error!(error = %err, "Serial issuance failed");
                return self.reject(FailureReason::SystemFailure);
            }
        };

        let token = self.builder.build(&request, &sample, serial);
        info!(
            serial = %serial,
            algorithm = request.algorithm().as_str(),
            "Issued time-stamp token"
        );
        metrics::record_token_issued(request.algorithm().as_str());
        Response::granted(token)
    }

    fn reject(&self, reason: FailureReason) -> Response {
        metrics::record_rejection(reason.as_str());
        Response::rejection(reason)
    }
}
