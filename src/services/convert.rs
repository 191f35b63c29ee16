//! Conversion polling: wait until the collaborator has turned an uploaded
//! CAD file into primitives.
//!
//! Fixed delay between checks, a hard cap on attempts, and a
//! `tokio::sync::watch` flag that cancels the wait between checks.

#[cfg(test)]
#[path = "convert_test.rs"]
mod convert_test;

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::repository::RepositoryError;
use crate::config::ZonemapConfig;

/// Conversion status collaborator. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ConversionStatus: Send + Sync {
    /// Whether the named file has finished converting.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if the status cannot be fetched.
    async fn is_converted(&self, file_name: &str) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollSettings {
    #[must_use]
    pub fn from_config(config: &ZonemapConfig) -> Self {
        Self { interval: config.convert_poll_interval(), max_attempts: config.convert_max_attempts }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{file_name} was not converted after {attempts} attempts")]
    Exhausted { file_name: String, attempts: u32 },
    #[error("conversion wait canceled")]
    Canceled,
}

/// Poll until `file_name` is converted. Returns the attempt that saw it.
/// Status errors count as a failed attempt.
///
/// # Errors
///
/// [`ConvertError::Exhausted`] after `max_attempts` checks, or
/// [`ConvertError::Canceled`] once `cancel` turns true.
pub async fn wait_for_conversion(
    status: &dyn ConversionStatus,
    file_name: &str,
    settings: PollSettings,
    mut cancel: watch::Receiver<bool>,
) -> Result<u32, ConvertError> {
    for attempt in 1..=settings.max_attempts {
        if *cancel.borrow() {
            return Err(ConvertError::Canceled);
        }

        match status.is_converted(file_name).await {
            Ok(true) => {
                info!(file_name, attempt, "conversion finished");
                return Ok(attempt);
            }
            Ok(false) => debug!(file_name, attempt, "conversion pending"),
            Err(e) => warn!(file_name, attempt, error = %e, "conversion status check failed"),
        }

        if attempt < settings.max_attempts {
            tokio::select! {
                () = tokio::time::sleep(settings.interval) => {}
                () = canceled(&mut cancel) => return Err(ConvertError::Canceled),
            }
        }
    }

    Err(ConvertError::Exhausted { file_name: file_name.to_string(), attempts: settings.max_attempts })
}

/// Resolves once the flag is set. Never resolves if the sender is gone.
async fn canceled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|flag| *flag).await.is_err() {
        std::future::pending::<()>().await;
    }
}
