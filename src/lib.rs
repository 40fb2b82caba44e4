//! Time-stamping authority core.
//!
//! Issues RSA-signed, compact-encoded assertions that a message digest
//! existed at a trustworthy point in time. A request carries a digest and
//! an optional nonce; the granted token binds that digest to a trusted
//! `genTime` with an explicit uncertainty bound and a durable unique serial
//! number. Rejections are signed exactly like grants, so clients can
//! authenticate every answer.
//!
//! The crate provides request validation, trusted time acquisition (chrony
//! or roughtime), durable serial numbers, token assembly and signing. The
//! surrounding service owns transport and key provisioning.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod keystore;
pub mod metrics;
pub mod pipeline;
pub mod protocol;
pub mod serial;
pub mod time;
pub mod token;

pub use config::Config;
pub use error::TsaError;
pub use pipeline::TsaPipeline;
