//! Client nonce representation.
//!
//! Nonces are large random integers chosen by the client and echoed back
//! verbatim in the issued token. JSON cannot carry arbitrary-precision
//! integers portably, so a nonce is accepted as either a JSON integer or a
//! decimal string, and emitted as an integer when it fits in `u64` and as a
//! decimal string otherwise. The echo contract is value equality, not
//! lexical equality.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque client-chosen value linking a request to its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce(u128);

impl Nonce {
    /// Wraps a raw nonce value.
    #[must_use]
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// The raw value.
    #[must_use]
    pub const fn value(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Nonce {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl From<u128> for Nonce {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl Serialize for Nonce {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match u64::try_from(self.0) {
            Ok(small) => serializer.serialize_u64(small),
            Err(_) => serializer.collect_str(&self.0),
        }
    }
}

struct NonceVisitor;

impl Visitor<'_> for NonceVisitor {
    type Value = Nonce;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Nonce, E> {
        Ok(Nonce(u128::from(v)))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Nonce, E> {
        Ok(Nonce(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Nonce, E> {
        u128::try_from(v)
            .map(Nonce)
            .map_err(|_| E::custom("nonce must be non-negative"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Nonce, E> {
        v.parse::<u128>()
            .map(Nonce)
            .map_err(|_| E::custom("nonce must be an unsigned decimal integer"))
    }
}

impl<'de> Deserialize<'de> for Nonce {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NonceVisitor)
    }
}
