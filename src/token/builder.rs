//! Token assembly.

use crate::protocol::{TokenContent, ValidRequest, PROTOCOL_VERSION};
use crate::serial::SerialNumber;
use crate::time::TimeSample;

/// Fixed policy: `genTime` alone does not totally order tokens.
const ORDERING: bool = false;

/// Assembles validated inputs into a token payload.
///
/// Deterministic and infallible: every field is copied from the request or
/// the time sample, or fixed by policy. All validation happened earlier in
/// the pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenBuilder;

impl TokenBuilder {
    /// Creates a builder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the token payload for a granted request.
    #[must_use]
    pub fn build(
        &self,
        request: &ValidRequest,
        sample: &TimeSample,
        serial: SerialNumber,
    ) -> TokenContent {
        TokenContent {
            version: PROTOCOL_VERSION,
            context: request.context().map(str::to_owned),
            message_imprint: request.imprint().hashed_message.clone(),
            serial_number: serial.value(),
            gen_time: sample.gen_time,
            accuracy: sample.accuracy,
            ordering: ORDERING,
            nonce: request.nonce(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Accuracy, MessageImprint, Nonce, Request, RequestValidator};
    use chrono::{TimeZone, Utc};

    fn valid_request(nonce: Option<Nonce>) -> ValidRequest {
        RequestValidator::new()
            .validate(Some(Request {
                version: 1,
                message_imprint: MessageImprint {
                    hash_algorithm: "sha256".to_string(),
                    hashed_message: "ab".repeat(32),
                },
                context: Some("batch-7".to_string()),
                nonce,
            }))
            .unwrap()
    }

    #[test]
    fn copies_request_and_sample_fields() {
        let sample = TimeSample {
            gen_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            accuracy: Accuracy::from_micros(1_234_567),
        };
        let token = TokenBuilder::new().build(
            &valid_request(Some(Nonce::new(99))),
            &sample,
            SerialNumber::new(41),
        );

        assert_eq!(token.version, 1);
        assert_eq!(token.context.as_deref(), Some("batch-7"));
        assert_eq!(token.message_imprint, "ab".repeat(32));
        assert_eq!(token.serial_number, 41);
        assert_eq!(token.gen_time, sample.gen_time);
        assert_eq!(token.accuracy, sample.accuracy);
        assert!(!token.ordering);
        assert_eq!(token.nonce, Some(Nonce::new(99)));
    }

    #[test]
    fn absent_nonce_stays_absent() {
        let sample = TimeSample {
            gen_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            accuracy: Accuracy::zero(),
        };
        let token =
            TokenBuilder::new().build(&valid_request(None), &sample, SerialNumber::new(1));
        assert_eq!(token.nonce, None);
    }
}
