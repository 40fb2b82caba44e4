//! Time-stamp request wire types.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::protocol::nonce::Nonce;

/// Protocol version implemented by this authority.
pub const PROTOCOL_VERSION: u32 = 1;

/// A hash algorithm name paired with the hex digest of the client's data.
///
/// The authority never sees the data itself, only this imprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageImprint {
    /// Digest algorithm name, e.g. `sha256`.
    pub hash_algorithm: String,
    /// Hex-encoded digest of the message being stamped.
    pub hashed_message: String,
}

/// A parsed time-stamp request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Protocol version the client speaks.
    pub version: u32,
    /// Digest being bound to a point in time.
    pub message_imprint: MessageImprint,
    /// Free-form client label, copied into the token when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Echoed verbatim in the token so the client can match responses
    /// without trusting its own clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Nonce>,
}

impl Request {
    /// Parses a request body, yielding `None` on any malformed input.
    ///
    /// The transport layer hands the outcome (present or absent) to the
    /// pipeline as-is; an absent request is rejected there with
    /// `badDataFormat`. Version and imprint rules are the validator's job,
    /// not this parser's.
    #[must_use]
    pub fn from_json(body: &str) -> Option<Self> {
        match serde_json::from_str(body) {
            Ok(request) => Some(request),
            Err(err) => {
                debug!(error = %err, "Discarding unparseable request body");
                None
            }
        }
    }
}
