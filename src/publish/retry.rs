//! publish::retry
//!
//! Bounded retry-with-delay for waiting on eventually-consistent remote state.
//!
//! [`poll_until`] calls a probe up to `max_attempts` times, sleeping a fixed
//! delay between attempts. Only errors the caller marks as retryable are
//! retried; anything else stops immediately. Sleeping goes through the
//! [`Sleeper`] trait so tests can run without wall-clock delays.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

/// Something that can wait.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeping on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Upper bound on time spent sleeping.
    pub fn max_wait(&self) -> Duration {
        self.delay * self.max_attempts.saturating_sub(1)
    }
}

/// Why [`poll_until`] gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error; carries the last one.
    Exhausted { attempts: u32, last: E },
    /// An attempt failed with an error that is not retried.
    Failed(E),
}

/// Poll `probe` until it succeeds, fails terminally, or the budget runs out.
///
/// `probe` receives the 1-based attempt number.
pub async fn poll_until<T, E, F, Fut, R>(
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
    mut probe: F,
    retryable: R,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let mut attempt = 1;
    loop {
        match probe(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !retryable(&e) => return Err(RetryError::Failed(e)),
            Err(e) if attempt >= policy.max_attempts => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: e,
                })
            }
            Err(_) => {
                sleeper.sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
