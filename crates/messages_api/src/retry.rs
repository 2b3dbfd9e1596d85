use std::future::Future;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::error::{FailureKind, MessagesApiError};

/// Total attempts per call, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Fixed pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Fixed-delay retry policy over classified failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    Terminal,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Decides what follows failed attempt `attempt` (1-based).
    pub fn decide(&self, kind: FailureKind, attempt: u32) -> RetryDecision {
        if kind.is_transient() && attempt < self.max_attempts {
            RetryDecision::RetryAfter(self.delay)
        } else {
            RetryDecision::Terminal
        }
    }
}

/// Failed attempt that will be followed by another one.
#[derive(Debug)]
pub struct RetryNotice<'a> {
    pub attempt: u32,
    pub kind: FailureKind,
    pub delay: Duration,
    pub error: &'a MessagesApiError,
}

/// Pause between attempts, replaceable in tests.
pub trait Sleep: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

impl Sleep for TokioSleep {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Runs `attempt_fn` until it succeeds or the policy declares the failure terminal.
///
/// Non-transient failures are returned unchanged after their first occurrence.
/// Transient failures that exhaust the budget are wrapped in
/// [`MessagesApiError::RetryExhausted`].
pub async fn retry_with_policy<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleep,
    mut on_retry: impl FnMut(RetryNotice<'_>),
    mut attempt_fn: F,
) -> Result<T, MessagesApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, MessagesApiError>>,
{
    let mut attempt = 1;
    loop {
        let error = match attempt_fn(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let kind = error.failure_kind();
        match policy.decide(kind, attempt) {
            RetryDecision::RetryAfter(delay) => {
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts(),
                    kind = %kind,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "messages request failed; retrying"
                );
                on_retry(RetryNotice {
                    attempt,
                    kind,
                    delay,
                    error: &error,
                });
                sleeper.sleep(delay).await;
                attempt += 1;
            }
            RetryDecision::Terminal if kind.is_transient() && attempt > 1 => {
                return Err(MessagesApiError::RetryExhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }
            RetryDecision::Terminal => return Err(error),
        }
    }
}
