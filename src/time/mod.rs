//! Trusted time acquisition.
//!
//! A [`TimeSource`] produces a dated estimate with an uncertainty bound by
//! consulting an external time authority at the moment of issuance. Two
//! interchangeable strategies exist: [`ChronyTimeSource`] reads the local
//! clock's tracked offset from a chrony daemon, and [`RoughtimeTimeSource`]
//! takes a midpoint/radius pair from a roughtime client. Neither result is
//! ever cached.

pub mod chrony;
pub mod offset;
pub mod roughtime;

pub use chrony::ChronyTimeSource;
pub use roughtime::RoughtimeTimeSource;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{Config, TimeSourceKind};
use crate::protocol::Accuracy;

/// A point-in-time estimate with its uncertainty, taken at issuance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// The authority's claimed time.
    pub gen_time: DateTime<Utc>,
    /// Uncertainty bound around `gen_time`.
    pub accuracy: Accuracy,
}

/// Failures while acquiring a trusted time sample.
#[derive(Error, Debug)]
pub enum TimeSourceError {
    /// The external client could not be started.
    #[error("Failed to invoke time client `{command}`: {source}")]
    Spawn {
        /// Command that failed to start.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The external client did not finish within the configured bound.
    #[error("Time client `{command}` produced no result within {timeout:?}")]
    Timeout {
        /// Command that hung.
        command: String,
        /// Wait bound that expired.
        timeout: Duration,
    },

    /// The external client exited unsuccessfully.
    #[error("Time client `{command}` exited with status {status}")]
    Failed {
        /// Command that failed.
        command: String,
        /// Exit code, -1 when killed by signal.
        status: i32,
    },

    /// No tracking line reported a healthy synchronization state.
    #[error("No synchronized tracking line in daemon output")]
    Unsynchronized,

    /// Client output did not have the expected shape.
    #[error("Unparseable time client output: {reason}")]
    Malformed {
        /// What was wrong with the output.
        reason: String,
    },
}

/// Produces a dated estimate with an uncertainty bound.
///
/// Implementations consult their external authority exactly once per call
/// and bound the wait, so a hung client surfaces as
/// [`TimeSourceError::Timeout`] rather than a stuck request.
#[async_trait]
pub trait TimeSource: Send + Sync {
    /// Acquires a fresh sample.
    async fn sample(&self) -> Result<TimeSample, TimeSourceError>;
}

/// Builds the configured time source strategy.
#[must_use]
pub fn from_config(config: &Config) -> Arc<dyn TimeSource> {
    match config.time_source {
        TimeSourceKind::Chrony => Arc::new(ChronyTimeSource::new(
            config.chrony_command.clone(),
            config.time_source_timeout,
        )),
        TimeSourceKind::Roughtime => Arc::new(RoughtimeTimeSource::new(
            config.roughtime_client.clone(),
            config.roughtime_server.clone(),
            config.roughtime_port,
            config.time_source_timeout,
        )),
    }
}
