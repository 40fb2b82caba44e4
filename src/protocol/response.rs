//! Response and token wire types with their canonical JSON encoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::nonce::Nonce;

/// Status code carried by a granted response.
pub const STATUS_GRANTED: u8 = 0;
/// Status code carried by a rejection.
pub const STATUS_REJECTION: u8 = 1;

/// Reasons a request can be refused, as carried in `statusString`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureReason {
    /// Unsupported or unrecognized hash algorithm.
    BadAlg,
    /// Unsupported protocol version.
    BadRequest,
    /// Malformed or unparseable request content.
    BadDataFormat,
    /// No usable sample from the trusted time source.
    TimeNotAvailable,
    /// Signing or state fault on the authority side.
    SystemFailure,
}

impl FailureReason {
    /// Stable label used in logs and metric dimensions.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BadAlg => "badAlg",
            Self::BadRequest => "badRequest",
            Self::BadDataFormat => "badDataFormat",
            Self::TimeNotAvailable => "timeNotAvailable",
            Self::SystemFailure => "systemFailure",
        }
    }
}

/// Uncertainty bound around `genTime`, decomposed to microsecond resolution.
///
/// `millis` is always below 1000 and `micros` below 1000; the three
/// components recompose exactly to the total microsecond magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accuracy {
    /// Whole seconds of uncertainty.
    pub seconds: u64,
    /// Milliseconds component, 0..=999.
    pub millis: u32,
    /// Microseconds component, 0..=999.
    pub micros: u32,
}

impl Accuracy {
    /// Zero uncertainty.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            seconds: 0,
            millis: 0,
            micros: 0,
        }
    }

    /// Splits a microsecond magnitude into its (seconds, millis, micros)
    /// components.
    #[must_use]
    pub const fn from_micros(total: u64) -> Self {
        Self {
            seconds: total / 1_000_000,
            millis: ((total % 1_000_000) / 1_000) as u32,
            micros: (total % 1_000) as u32,
        }
    }

    /// Recomposed total magnitude in microseconds.
    #[must_use]
    pub const fn total_micros(&self) -> u128 {
        self.seconds as u128 * 1_000_000 + self.millis as u128 * 1_000 + self.micros as u128
    }
}

/// Serialization of `genTime` with a fixed, sortable UTC wire format.
pub mod gen_time_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    /// UTC at microsecond precision, e.g. `2024-01-01T00:00:00.000000Z`.
    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

    /// Formats a timestamp for the wire.
    pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format(FORMAT))
    }

    /// Parses a wire timestamp.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// The signed body of a granted token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenContent {
    /// Protocol version of the issuing authority.
    pub version: u32,
    /// Client label copied from the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// The hex digest echoed from the request's message imprint.
    pub message_imprint: String,
    /// Unique serial of this token.
    pub serial_number: u64,
    /// The trusted time this token asserts.
    #[serde(with = "gen_time_format")]
    pub gen_time: DateTime<Utc>,
    /// Uncertainty bound around `gen_time`.
    pub accuracy: Accuracy,
    /// Fixed policy: `genTime` alone does not totally order tokens.
    pub ordering: bool,
    /// Client nonce echoed by value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Nonce>,
}

/// Outcome header of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseStatus {
    /// Numeric outcome, 0 granted or 1 rejection.
    pub status: u8,
    /// Rejection reason, absent on grants.
    #[serde(rename = "statusString", default, skip_serializing_if = "Option::is_none")]
    pub status_string: Option<FailureReason>,
}

/// A complete response payload: an outcome plus the token when granted.
///
/// This is the exact structure that gets canonicalized and signed; there is
/// no unsigned response shape anywhere in the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Outcome of the request.
    pub status: ResponseStatus,
    /// Issued token, present exactly when the request was granted.
    #[serde(rename = "timeStampToken", default, skip_serializing_if = "Option::is_none")]
    pub time_stamp_token: Option<TokenContent>,
}

impl Response {
    /// A granted response wrapping an issued token.
    #[must_use]
    pub fn granted(token: TokenContent) -> Self {
        Self {
            status: ResponseStatus {
                status: STATUS_GRANTED,
                status_string: None,
            },
            time_stamp_token: Some(token),
        }
    }

    /// A rejection carrying the given reason and no token.
    #[must_use]
    pub fn rejection(reason: FailureReason) -> Self {
        Self {
            status: ResponseStatus {
                status: STATUS_REJECTION,
                status_string: Some(reason),
            },
            time_stamp_token: None,
        }
    }

    /// Whether this response grants a token.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        self.status.status == STATUS_GRANTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn failure_reasons_use_camel_case_labels() {
        assert_eq!(
            serde_json::to_string(&FailureReason::TimeNotAvailable).unwrap(),
            "\"timeNotAvailable\""
        );
        assert_eq!(FailureReason::BadAlg.as_str(), "badAlg");
    }

    #[test]
    fn accuracy_components_stay_in_range() {
        let acc = Accuracy::from_micros(1_234_567);
        assert_eq!(acc.seconds, 1);
        assert_eq!(acc.millis, 234);
        assert_eq!(acc.micros, 567);
        assert_eq!(acc.total_micros(), 1_234_567);
    }

    #[test]
    fn gen_time_wire_format_is_stable() {
        let token = TokenContent {
            version: 1,
            context: None,
            message_imprint: "00".repeat(32),
            serial_number: 1,
            gen_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            accuracy: Accuracy::zero(),
            ordering: false,
            nonce: None,
        };
        let json = serde_json::to_string(&token).unwrap();
        assert!(json.contains("\"genTime\":\"2024-01-01T00:00:00.000000Z\""));
        let back: TokenContent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn rejection_carries_reason_and_no_token() {
        let response = Response::rejection(FailureReason::BadAlg);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":1"));
        assert!(json.contains("\"statusString\":\"badAlg\""));
        assert!(!json.contains("timeStampToken"));
        assert!(!response.is_granted());
    }
}
