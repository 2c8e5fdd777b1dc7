//! Fixed-delay retry policy for external lookups.
//!
//! Email validation and geolocation both retry transient failures with the
//! same budget: five attempts in total, one second apart. Sleeping goes
//! through [`RetrySleeper`] so tests can observe delays without waiting.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::ExternalSourceError;

/// Async clock-independent sleeping abstraction for retries.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    ///
    /// ```rust,no_run
    /// use async_trait::async_trait;
    /// use social_backend::domain::RetrySleeper;
    /// use std::sync::{Arc, Mutex};
    /// use std::time::Duration;
    /// #[derive(Default)]
    /// struct CountingSleeper {
    ///     calls: Arc<Mutex<u32>>,
    /// }
    /// #[async_trait]
    /// impl RetrySleeper for CountingSleeper {
    ///     async fn sleep(&self, _duration: Duration) {
    ///         *self.calls.lock().expect("calls mutex") += 1;
    ///     }
    /// }
    /// # async fn demo() {
    /// let sleeper = CountingSleeper::default();
    /// sleeper.sleep(Duration::from_millis(25)).await;
    /// assert_eq!(*sleeper.calls.lock().expect("calls mutex"), 1);
    /// # }
    /// ```
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry budget with a constant pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl FixedRetryPolicy {
    /// Total attempts, including the first call.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    /// Pause between two attempts.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

    /// Build a policy. A zero attempt budget is raised to one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Total attempts allowed.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay slept after each transient failure except the last.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `call` until it succeeds, fails permanently, or the budget runs
    /// out.
    ///
    /// `call` receives the 1-based attempt number. Transient errors
    /// ([`ExternalSourceError::is_transient`]) are retried after
    /// [`Self::delay`]; anything else stops immediately.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use social_backend::domain::{FixedRetryPolicy, TokioSleeper};
    /// use social_backend::domain::ports::ExternalSourceError;
    ///
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let policy = FixedRetryPolicy::new(3, Duration::ZERO);
    /// let outcome = policy
    ///     .run(&TokioSleeper, |attempt| async move {
    ///         if attempt < 3 {
    ///             Err(ExternalSourceError::timeout("slow"))
    ///         } else {
    ///             Ok(attempt)
    ///         }
    ///     })
    ///     .await
    ///     .expect("third attempt succeeds");
    /// assert_eq!(outcome.value, 3);
    /// assert_eq!(outcome.attempts, 3);
    /// # });
    /// ```
    pub async fn run<T, F, Fut>(
        &self,
        sleeper: &dyn RetrySleeper,
        mut call: F,
    ) -> Result<Attempted<T>, RetryFailure>
    where
        F: FnMut(u32) -> Fut + Send,
        Fut: Future<Output = Result<T, ExternalSourceError>> + Send,
        T: Send,
    {
        let mut attempt = 1;
        loop {
            match call(attempt).await {
                Ok(value) => {
                    return Ok(Attempted {
                        value,
                        attempts: attempt,
                    });
                }
                Err(error) if error.is_transient() && attempt < self.max_attempts => {
                    debug!(attempt, %error, "transient failure, retrying");
                    sleeper.sleep(self.delay).await;
                    attempt += 1;
                }
                Err(error) if error.is_transient() => {
                    warn!(attempts = attempt, %error, "retry budget exhausted");
                    return Err(RetryFailure::Exhausted {
                        attempts: attempt,
                        last_error: error,
                    });
                }
                Err(error) => {
                    return Err(RetryFailure::Rejected {
                        attempts: attempt,
                        error,
                    });
                }
            }
        }
    }
}

impl Default for FixedRetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}

/// Successful result together with the attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T> {
    /// Value returned by the successful call.
    pub value: T,
    /// 1-based number of the successful attempt.
    pub attempts: u32,
}

/// Reason a retried call gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryFailure {
    /// Every attempt failed transiently.
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last_error: ExternalSourceError,
    },
    /// A non-transient error ended the loop early.
    Rejected {
        /// Attempts made.
        attempts: u32,
        /// Error that stopped the loop.
        error: ExternalSourceError,
    },
}

impl RetryFailure {
    /// Attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Rejected { attempts, .. } => *attempts,
        }
    }
}
