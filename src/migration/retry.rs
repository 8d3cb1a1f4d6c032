//! Bounded retry with backoff
//!
//! Used where the store's listing lags behind writes and deletes. Sleeping
//! goes through [`Sleeper`] so tests can run without real delays.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::KeystashResult;

/// How often and how long to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given zero-based attempt (doubling, capped)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Something that can wait
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately and remembers every requested delay
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSleeper {
    delays: std::sync::Mutex<Vec<Duration>>,
}

#[cfg(test)]
impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .map(|delays| delays.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(duration);
        }
    }
}

/// Result of [`retry_until`]
#[derive(Debug)]
pub struct RetryOutcome<T> {
    /// Last value the probe produced, if any attempt succeeded
    pub last: Option<T>,
    /// Whether the condition was met
    pub satisfied: bool,
    /// Attempts made
    pub attempts: u32,
}

/// Run `probe` until `done` accepts its value or the attempts run out
///
/// Probe errors count as unsatisfied attempts.
pub async fn retry_until<T, F, Fut, P>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut probe: F,
    mut done: P,
) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = KeystashResult<T>>,
    P: FnMut(&T) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last = None;

    for attempt in 0..max_attempts {
        match probe().await {
            Ok(value) => {
                if done(&value) {
                    return RetryOutcome {
                        last: Some(value),
                        satisfied: true,
                        attempts: attempt + 1,
                    };
                }
                last = Some(value);
            }
            Err(e) => debug!(attempt = attempt + 1, error = %e, "retry probe failed"),
        }

        if attempt + 1 < max_attempts {
            let delay = policy.delay_for(attempt);
            debug!(attempt = attempt + 1, ?delay, "condition not met, backing off");
            sleeper.sleep(delay).await;
        }
    }

    RetryOutcome {
        last,
        satisfied: false,
        attempts: max_attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeystashError;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = policy();
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(300));
        assert_eq!(policy.delay_for(40), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_succeeds_after_lag() {
        let sleeper = RecordingSleeper::new();
        let mut calls = 0;

        let outcome = retry_until(
            &policy(),
            &sleeper,
            || {
                calls += 1;
                let value = calls;
                async move { Ok::<_, KeystashError>(value) }
            },
            |value| *value >= 3,
        )
        .await;

        assert!(outcome.satisfied);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.last, Some(3));
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let sleeper = RecordingSleeper::new();

        let outcome = retry_until(
            &policy(),
            &sleeper,
            || async { Ok::<_, KeystashError>(false) },
            |value| *value,
        )
        .await;

        assert!(!outcome.satisfied);
        assert_eq!(outcome.attempts, 4);
        assert_eq!(outcome.last, Some(false));
        // No sleep after the final attempt
        assert_eq!(sleeper.delays().len(), 3);
    }

    #[tokio::test]
    async fn test_probe_errors_are_retried() {
        let sleeper = RecordingSleeper::new();
        let mut calls = 0;

        let outcome = retry_until(
            &policy(),
            &sleeper,
            || {
                calls += 1;
                let fail = calls == 1;
                async move {
                    if fail {
                        Err(KeystashError::Connectivity("store unavailable".into()))
                    } else {
                        Ok(true)
                    }
                }
            },
            |value| *value,
        )
        .await;

        assert!(outcome.satisfied);
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_uses_timer() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(5)).await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
