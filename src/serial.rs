//! Durable serial number issuance.
//!
//! Every issued token carries a serial number unique across the authority's
//! lifetime, including restarts. The counter lives behind a single async
//! mutex, and each new value is persisted (tempfile plus atomic rename)
//! before it is ever handed to a caller. A crash between increment and
//! persist can therefore only waste a number, never reuse one.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::TsaError;

/// A serial number issued to exactly one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SerialNumber(u64);

impl SerialNumber {
    /// Wraps a raw counter value, e.g. one read back from a stored token.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw counter value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic counter with write-ahead persistence.
pub struct SerialNumberGenerator {
    path: PathBuf,
    state: Mutex<u64>,
}

impl SerialNumberGenerator {
    /// Opens the generator, loading the last persisted counter value.
    ///
    /// A missing or unparseable state file starts the counter at zero, the
    /// state of a freshly provisioned authority.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = match std::fs::read_to_string(&path) {
            Ok(content) => match content.trim().parse::<u64>() {
                Ok(value) => value,
                Err(_) => {
                    warn!(
                        path = %path.display(),
                        "Serial state file is not a decimal counter; starting at zero"
                    );
                    0
                }
            },
            Err(err) => {
                info!(
                    path = %path.display(),
                    error = %err,
                    "No readable serial state; starting at zero"
                );
                0
            }
        };
        Self {
            path,
            state: Mutex::new(initial),
        }
    }

    /// Issues the next serial number.
    ///
    /// The whole read-increment-persist-return sequence runs under one
    /// lock, and the candidate is durably persisted before it is returned.
    /// Concurrent callers can never observe a duplicate, and a restart can
    /// never reissue a number that was already handed out.
    ///
    /// # Errors
    ///
    /// Fails when the new value cannot be persisted (the candidate is then
    /// not consumed) or when the counter space is exhausted.
    pub async fn next(&self) -> Result<SerialNumber, TsaError> {
        let mut state = self.state.lock().await;
        let candidate = state
            .checked_add(1)
            .ok_or_else(|| TsaError::serial("serial number space exhausted"))?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || persist(&path, candidate))
            .await
            .map_err(|err| TsaError::serial(format!("persistence task failed: {err}")))??;

        *state = candidate;
        Ok(SerialNumber(candidate))
    }

    /// The last value handed out, which is also the persisted floor.
    pub async fn last_issued(&self) -> u64 {
        *self.state.lock().await
    }
}

/// Replaces the state file atomically: write a tempfile in the same
/// directory, sync it, then rename over the target.
fn persist(path: &Path, value: u64) -> Result<(), TsaError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(parent).map_err(|err| {
        TsaError::serial(format!(
            "cannot create temporary state file in {}: {err}",
            parent.display()
        ))
    })?;
    file.write_all(value.to_string().as_bytes())
        .map_err(|err| TsaError::serial(format!("cannot write serial state: {err}")))?;
    file.as_file()
        .sync_all()
        .map_err(|err| TsaError::serial(format!("cannot sync serial state: {err}")))?;
    file.persist(path).map_err(|err| {
        TsaError::serial(format!(
            "cannot replace serial state file {}: {err}",
            path.display()
        ))
    })?;
    Ok(())
}
