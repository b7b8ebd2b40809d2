//! Bounded retry for outbound requests

use crate::error::{Error, Result};
use reqwest::{RequestBuilder, Response};
use std::time::Duration;
use tracing::warn;

/// Default attempt ceiling per request
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Attempt ceiling and fixed backoff for transport failures
///
/// Only transport failures are retried. Any HTTP response, whatever its
/// status, ends the retry loop and is handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Pause between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Policy with no pause between attempts
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Duration::ZERO,
        }
    }

    /// Send the request built by `make_request`, retrying transport failures
    ///
    /// `make_request` is called once per attempt since a `RequestBuilder`
    /// is consumed by `send`. Requests are resent as-is, so a non-idempotent
    /// request whose first attempt reached the server before the transport
    /// failed is applied twice; a retried merge PUT then answers 405 even
    /// though the first attempt merged.
    pub async fn send<F>(&self, mut make_request: F) -> Result<Response>
    where
        F: FnMut() -> RequestBuilder,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match make_request().send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < max_attempts => {
                    warn!(attempt, max_attempts, error = %e, "request failed, retrying");
                    if !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                    attempt += 1;
                }
                Err(e) => {
                    return Err(Error::Transport(format!(
                        "{e} (gave up after {attempt} attempts)"
                    )));
                }
            }
        }
    }
}
