//! External-authority strategy: roughtime midpoint and radius.
//!
//! Invokes a roughtime client against a configured server and takes the
//! midpoint/radius pair it prints as a single JSON line. The midpoint is
//! the claimed time; the radius, in microseconds, is the uncertainty.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::protocol::Accuracy;
use crate::time::{TimeSample, TimeSource, TimeSourceError};

/// strftime format handed to the client for its midpoint field.
const TIME_FORMAT_ARG: &str = "%Y-%m-%dT%H:%M:%S%z";

/// One line of roughtime client output.
#[derive(Debug, Deserialize)]
struct ClientReport {
    midpoint: String,
    radius: u64,
}

/// Time source backed by a roughtime client binary.
pub struct RoughtimeTimeSource {
    client: String,
    server: String,
    port: u16,
    timeout: Duration,
}

impl RoughtimeTimeSource {
    /// Creates a source invoking `client --json ... server port`.
    #[must_use]
    pub fn new(
        client: impl Into<String>,
        server: impl Into<String>,
        port: u16,
        timeout: Duration,
    ) -> Self {
        Self {
            client: client.into(),
            server: server.into(),
            port,
            timeout,
        }
    }

    fn parse_report(stdout: &str) -> Result<ClientReport, TimeSourceError> {
        let line = stdout.lines().next().ok_or(TimeSourceError::Malformed {
            reason: "client produced no output".to_string(),
        })?;
        serde_json::from_str(line).map_err(|err| TimeSourceError::Malformed {
            reason: format!("client line is not a midpoint/radius report: {err}"),
        })
    }
}

#[async_trait]
impl TimeSource for RoughtimeTimeSource {
    async fn sample(&self) -> Result<TimeSample, TimeSourceError> {
        let mut command = Command::new(&self.client);
        command
            .arg("--json")
            .args(["--time-format", TIME_FORMAT_ARG])
            .arg(&self.server)
            .arg(self.port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.timeout, command.output())
            .await
            .map_err(|_| TimeSourceError::Timeout {
                command: self.client.clone(),
                timeout: self.timeout,
            })?
            .map_err(|err| TimeSourceError::Spawn {
                command: self.client.clone(),
                source: err,
            })?;

        if !output.status.success() {
            return Err(TimeSourceError::Failed {
                command: self.client.clone(),
                status: output.status.code().unwrap_or(-1),
            });
        }

        let report = Self::parse_report(&String::from_utf8_lossy(&output.stdout))?;
        let midpoint = DateTime::parse_from_str(&report.midpoint, TIME_FORMAT_ARG).map_err(
            |err| TimeSourceError::Malformed {
                reason: format!("midpoint `{}` is not a timestamp: {err}", report.midpoint),
            },
        )?;

        debug!(
            midpoint = %report.midpoint,
            radius = report.radius,
            "Roughtime sample acquired"
        );

        Ok(TimeSample {
            gen_time: midpoint.with_timezone(&Utc),
            accuracy: Accuracy::from_micros(report.radius),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_midpoint_and_radius() {
        let line = r#"{"midpoint":"2024-01-01T00:00:00+0000","radius":1000000,"verified":true}"#;
        let report = RoughtimeTimeSource::parse_report(line).unwrap();
        assert_eq!(report.midpoint, "2024-01-01T00:00:00+0000");
        assert_eq!(report.radius, 1_000_000);
    }

    #[test]
    fn only_first_line_is_read() {
        let output = "{\"midpoint\":\"2024-01-01T00:00:00+0000\",\"radius\":3}\ngarbage\n";
        assert_eq!(
            RoughtimeTimeSource::parse_report(output).unwrap().radius,
            3
        );
    }

    #[test]
    fn empty_or_malformed_output_is_an_error() {
        assert!(matches!(
            RoughtimeTimeSource::parse_report(""),
            Err(TimeSourceError::Malformed { .. })
        ));
        assert!(matches!(
            RoughtimeTimeSource::parse_report("not json"),
            Err(TimeSourceError::Malformed { .. })
        ));
        assert!(matches!(
            RoughtimeTimeSource::parse_report(r#"{"midpoint":"x"}"#),
            Err(TimeSourceError::Malformed { .. })
        ));
    }

    #[test]
    fn midpoint_format_matches_client_argument() {
        let parsed = DateTime::parse_from_str("2024-06-30T23:59:59+0000", TIME_FORMAT_ARG)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap());
    }
}
