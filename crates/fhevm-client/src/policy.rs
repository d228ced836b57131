//! Caller-side deadline and retry policy
//!
//! Session methods never retry or time out on their own. Callers that want
//! either wrap the call:
//!
//! ```ignore
//! let policy = CallPolicy::default().with_timeout(Duration::from_secs(30)).with_retries(2);
//! let result = policy
//!     .run_when(|| client.request_public_decrypt(handle, contract), ClientError::is_transient)
//!     .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError<E: std::error::Error + 'static> {
    #[error("Timed out after {timeout:?} ({attempts} attempts)")]
    TimedOut { timeout: Duration, attempts: u32 },

    #[error("Failed after {attempts} attempts: {source}")]
    Failed {
        attempts: u32,
        #[source]
        source: E,
    },
}

impl<E: std::error::Error + 'static> PolicyError<E> {
    /// The operation's own error, if it got far enough to produce one
    pub fn into_inner(self) -> Option<E> {
        match self {
            PolicyError::Failed { source, .. } => Some(source),
            PolicyError::TimedOut { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    /// Deadline for each attempt; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Extra attempts after the first
    pub retries: u32,
    /// Pause between attempts
    pub poll_interval: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: None,
            retries: 0,
            poll_interval: Duration::from_millis(1000),
        }
    }
}

impl CallPolicy {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Run `op`, retrying every failure
    pub async fn run<T, E, F, Fut>(&self, op: F) -> Result<T, PolicyError<E>>
    where
        E: std::error::Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_when(op, |_| true).await
    }

    /// Run `op`, retrying only failures for which `retryable` holds.
    /// Timeouts are always retryable.
    pub async fn run_when<T, E, F, Fut, R>(
        &self,
        mut op: F,
        retryable: R,
    ) -> Result<T, PolicyError<E>>
    where
        E: std::error::Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let outcome = match self.timeout {
                Some(timeout) => match tokio::time::timeout(timeout, op()).await {
                    Ok(result) => result.map_err(|source| PolicyError::Failed { attempts, source }),
                    Err(_) => Err(PolicyError::TimedOut { timeout, attempts }),
                },
                None => op()
                    .await
                    .map_err(|source| PolicyError::Failed { attempts, source }),
            };

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let retry = match &err {
                PolicyError::TimedOut { .. } => true,
                PolicyError::Failed { source, .. } => retryable(source),
            };
            if !retry || attempts > self.retries {
                return Err(err);
            }

            tracing::warn!(attempt = attempts, error = %err, "Call failed, retrying");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
