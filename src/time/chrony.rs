//! Offset strategy: local clock plus chrony tracking.
//!
//! Invokes the chrony client in CSV mode (`chronyc -c tracking`) and reads
//! the estimated offset between the local clock and chrony's reference.
//! `genTime` is the local wall clock; the offset magnitude becomes the
//! accuracy bound. Only lines whose final field reads `Normal` count as a
//! healthy synchronization state.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::protocol::Accuracy;
use crate::time::offset::offset_micros;
use crate::time::{TimeSample, TimeSource, TimeSourceError};

/// Field index of the reference offset in `chronyc -c tracking` output.
const OFFSET_FIELD: usize = 5;
/// Leap status marking a healthy synchronization state.
const HEALTHY_STATUS: &str = "Normal";

/// Time source backed by a chrony daemon on the same host.
pub struct ChronyTimeSource {
    command: String,
    timeout: Duration,
}

impl ChronyTimeSource {
    /// Creates a source invoking `command -c tracking` with a wait bound.
    #[must_use]
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// Extracts the offset field (decimal seconds) from CSV tracking
    /// output, taking the first healthy line.
    fn tracking_offset(stdout: &str) -> Result<&str, TimeSourceError> {
        let line = stdout
            .lines()
            .find(|line| line.trim_end().rsplit(',').next() == Some(HEALTHY_STATUS))
            .ok_or(TimeSourceError::Unsynchronized)?;
        line.split(',')
            .nth(OFFSET_FIELD)
            .ok_or_else(|| TimeSourceError::Malformed {
                reason: format!("tracking line has too few fields: {line}"),
            })
    }
}

#[async_trait]
impl TimeSource for ChronyTimeSource {
    async fn sample(&self) -> Result<TimeSample, TimeSourceError> {
        let mut command = Command::new(&self.command);
        command
            .args(["-c", "tracking"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.timeout, command.output())
            .await
            .map_err(|_| TimeSourceError::Timeout {
                command: self.command.clone(),
                timeout: self.timeout,
            })?
            .map_err(|err| TimeSourceError::Spawn {
                command: self.command.clone(),
                source: err,
            })?;

        if !output.status.success() {
            return Err(TimeSourceError::Failed {
                command: self.command.clone(),
                status: output.status.code().unwrap_or(-1),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let field = Self::tracking_offset(&stdout)?;
        let micros = offset_micros(field).ok_or_else(|| TimeSourceError::Malformed {
            reason: format!("offset field is not a decimal number: {field}"),
        })?;

        debug!(offset = field, "Chrony tracking offset acquired");

        Ok(TimeSample {
            gen_time: Utc::now(),
            accuracy: Accuracy::from_micros(micros),
        })
    }
}
