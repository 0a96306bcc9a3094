//! Rate-Limited Fetch Executor.
//!
//! Every gateway call the analysis components make goes through this
//! executor. It caps the number of in-flight calls with a counting
//! semaphore, enforces a minimum inter-request delay even within the cap,
//! and retries transient errors (rate limit, timeout) with exponential
//! backoff and jitter. Backoff and retry live here and nowhere else, so the
//! policy is testable away from the business logic.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;

use crate::ports::ledger::{LedgerError, LedgerResult};

/// Executor policy knobs.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum concurrent gateway calls.
    pub max_in_flight: usize,
    /// Minimum spacing between request dispatches.
    pub min_request_interval: Duration,
    /// Total attempts per call, including the first.
    pub max_attempts: u32,
    /// Base delay for exponential backoff.
    pub retry_base_delay: Duration,
    /// Upper bound of the random jitter added to each backoff.
    pub retry_max_jitter: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 5,
            min_request_interval: Duration::from_millis(200),
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(500),
            retry_max_jitter: Duration::from_millis(250),
        }
    }
}

/// Bounded-concurrency executor for gateway calls.
#[derive(Debug, Clone)]
pub struct FetchExecutor {
    semaphore: Arc<Semaphore>,
    last_dispatch: Arc<Mutex<Option<Instant>>>,
    config: ExecutorConfig,
}

impl FetchExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            last_dispatch: Arc::new(Mutex::new(None)),
            config,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run one gateway call under the concurrency cap with the retry policy.
    ///
    /// `op` is invoked once per attempt. Transient errors are retried up to
    /// `max_attempts`; all other errors propagate on the first occurrence.
    pub async fn run<T, F, Fut>(&self, op: F) -> LedgerResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| LedgerError::Rpc("executor shut down".to_string()))?;

        let mut last_error = LedgerError::Rpc("no attempts made".to_string());
        for attempt in 0..self.config.max_attempts {
            self.pace().await;

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt + 1 < self.config.max_attempts => {
                    let backoff = self.backoff_for(attempt);
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_attempts = self.config.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        "transient gateway error, backing off"
                    );
                    last_error = e;
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error)
    }

    /// Exponential backoff with random jitter for the given attempt index.
    fn backoff_for(&self, attempt: u32) -> Duration {
        let base = self.config.retry_base_delay.as_millis() as u64;
        let exp = base.saturating_mul(2u64.saturating_pow(attempt));
        let jitter_bound = self.config.retry_max_jitter.as_millis() as u64;
        let jitter = if jitter_bound == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_bound)
        };
        Duration::from_millis(exp + jitter)
    }

    /// Enforce the minimum spacing between dispatches.
    async fn pace(&self) {
        let wait = {
            let mut last = self.last_dispatch.lock().await;
            let now = Instant::now();
            let wait = match *last {
                Some(prev) => {
                    let elapsed = now.duration_since(prev);
                    self.config.min_request_interval.saturating_sub(elapsed)
                }
                None => Duration::ZERO,
            };
            *last = Some(now + wait);
            wait
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    fn fast_config() -> ExecutorConfig {
        ExecutorConfig {
            max_in_flight: 2,
            min_request_interval: Duration::from_millis(1),
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(1),
            retry_max_jitter: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let executor = FetchExecutor::new(fast_config());
        let result = executor.run(|| async { Ok::<_, LedgerError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let executor = FetchExecutor::new(fast_config());
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&attempts);
        let result = executor
            .run(move || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(LedgerError::RateLimited)
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_transient_exhausts_attempts() {
        let executor = FetchExecutor::new(fast_config());
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&attempts);
        let result: LedgerResult<()> = executor
            .run(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(LedgerError::Timeout)
                }
            })
            .await;

        assert!(matches!(result, Err(LedgerError::Timeout)));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_transient_not_retried() {
        let executor = FetchExecutor::new(fast_config());
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&attempts);
        let result: LedgerResult<()> = executor
            .run(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(LedgerError::NotFound("gone".to_string()))
                }
            })
            .await;

        assert!(matches!(result, Err(LedgerError::NotFound(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrency_bounded() {
        let executor = Arc::new(FetchExecutor::new(ExecutorConfig {
            max_in_flight: 2,
            min_request_interval: Duration::ZERO,
            ..fast_config()
        }));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let executor = Arc::clone(&executor);
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                executor
                    .run(move || {
                        let in_flight = Arc::clone(&in_flight);
                        let peak = Arc::clone(&peak);
                        async move {
                            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                            in_flight.fetch_sub(1, Ordering::SeqCst);
                            Ok::<_, LedgerError>(())
                        }
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
