//! Retry policy for transport failures.

use std::time::Duration;

use tracing::warn;

use crate::error::ClientError;

/// How often and how patiently to retry a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// retry budget is spent.
    ///
    /// `op` receives the 1-based attempt number. A final
    /// [`ClientError::Network`] reports the total number of attempts.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `op`.
    pub fn run<T>(
        &self,
        mut op: impl FnMut(u32) -> Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt <= self.max_retries => {
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %err,
                        "Request failed, retrying"
                    );
                    if !self.delay.is_zero() {
                        std::thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
                Err(ClientError::Network { message, .. }) => {
                    return Err(ClientError::Network {
                        attempts: attempt,
                        message,
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}
