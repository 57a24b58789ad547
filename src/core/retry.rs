use crate::utils::error::{FlashcardError, Result};
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Bounded exponential backoff: wait `base_delay * 2^attempt` between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Wait after the failed attempt `attempt_index` (0-based).
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt_index))
    }
}

/// Run `request` until it succeeds or `policy.max_attempts` attempts have failed.
///
/// The last failure is returned wrapped in [`FlashcardError::RemoteInvocationFailed`].
/// Dropping the returned future cancels any pending backoff wait.
pub async fn invoke<T, F, Fut>(policy: &RetryPolicy, mut request: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    // 至少嘗試一次
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        match request().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::debug!("Request succeeded on attempt {}", attempt + 1);
                }
                return Ok(value);
            }
            Err(e) if attempt + 1 >= max_attempts => {
                tracing::error!("Request failed after {} attempt(s): {}", max_attempts, e);
                return Err(FlashcardError::RemoteInvocationFailed {
                    attempts: max_attempts,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Retrying after error ({}/{}), waiting {:?}: {}",
                    attempt + 1,
                    max_attempts,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    type BoxedAttempt = std::pin::Pin<Box<dyn Future<Output = Result<&'static str>> + Send>>;

    fn flaky(failures: u32, calls: Arc<AtomicU32>) -> impl FnMut() -> BoxedAttempt {
        move || {
            let calls = calls.clone();
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < failures {
                    Err(FlashcardError::ApiStatusError {
                        status: 503,
                        body: format!("failure {}", n + 1),
                    })
                } else {
                    Ok("done")
                }
            })
        }
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let result = invoke(&RetryPolicy::default(), flaky(2, calls.clone())).await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_propagate_last_error() {
        let calls = Arc::new(AtomicU32::new(0));

        let err = invoke(&RetryPolicy::default(), flaky(10, calls.clone()))
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            FlashcardError::RemoteInvocationFailed { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(source.to_string().contains("failure 3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_before_each_attempt() {
        let start = Instant::now();
        let offsets = Arc::new(Mutex::new(Vec::new()));
        let recorded = offsets.clone();

        let policy = RetryPolicy::default().with_max_attempts(4);
        let _ = invoke(&policy, move || {
            recorded.lock().unwrap().push(start.elapsed());
            async { Err::<(), _>(FlashcardError::EmptyResponse) }
        })
        .await;

        let offsets = offsets.lock().unwrap();
        let gaps: Vec<Duration> = offsets.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(offsets[0], Duration::ZERO);
        assert_eq!(
            gaps,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy_does_not_wait() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        let policy = RetryPolicy::default().with_max_attempts(1);

        let result = invoke(&policy, flaky(1, calls.clone())).await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_wait_is_cancellable() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::default().with_base_delay(Duration::from_secs(60));

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            invoke(&policy, flaky(10, calls.clone())),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
