//! Bounded retry with outcome classification.
//!
//! Operations report each attempt as success, [`Attempt::Transient`] (try
//! again after a delay) or [`Attempt::Permanent`] (stop now). The
//! [`Retryer`] runs attempts sequentially, sleeping between them with an
//! exponential backoff capped by the [`RetryPolicy`].

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(8);
const DEFAULT_MULTIPLIER: u32 = 2;

/// Classification of a failed attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Attempt<E> {
    /// The failure may clear up; retry while the budget allows.
    Transient(E),
    /// Retrying cannot help; surface the error immediately.
    Permanent(E),
}

/// Errors returned once the retryer stops.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Every attempt in the budget failed transiently.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error reported by the final attempt.
        #[source]
        last: E,
    },
    /// An attempt failed permanently.
    #[error(transparent)]
    Permanent(E),
    /// Cancellation was requested before the budget was used up.
    #[error("retry cancelled after {attempts} attempts")]
    Cancelled {
        /// Number of attempts made before cancellation.
        attempts: u32,
        /// Error reported by the most recent attempt, if any ran.
        last: Option<E>,
    },
}

impl<E> RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Returns the most recent operation error, if any attempt ran.
    #[must_use]
    pub fn into_last(self) -> Option<E> {
        match self {
            Self::Exhausted { last, .. } | Self::Permanent(last) => Some(last),
            Self::Cancelled { last, .. } => last,
        }
    }
}

/// Attempt budget and backoff schedule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Growth factor applied to the delay after each failed attempt.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping, mainly for tests.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.multiplier.max(1).saturating_pow(exponent);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    const fn budget(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }
}

/// Runs fallible operations under a [`RetryPolicy`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Retryer {
    policy: RetryPolicy,
}

impl Retryer {
    /// Creates a retryer with the given policy.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Policy used by this retryer.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs `operation` until it succeeds, fails permanently, or the budget
    /// runs out. The closure receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Exhausted`] carrying the last error when every
    /// attempt failed transiently, or [`RetryError::Permanent`] on the first
    /// permanent failure.
    pub async fn try_async<T, E, F, Fut>(&self, operation: F) -> Result<T, RetryError<E>>
    where
        E: std::error::Error + 'static,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, Attempt<E>>>,
    {
        self.run(operation, None).await
    }

    /// Like [`Retryer::try_async`], but stops as soon as `cancel` fires,
    /// whether an attempt is in flight or the retryer is backing off. An
    /// interrupted attempt is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Cancelled`] when cancellation wins, otherwise
    /// the same errors as [`Retryer::try_async`].
    pub async fn try_with_cancellation<T, E, F, Fut>(
        &self,
        cancel: &CancellationToken,
        operation: F,
    ) -> Result<T, RetryError<E>>
    where
        E: std::error::Error + 'static,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, Attempt<E>>>,
    {
        self.run(operation, Some(cancel)).await
    }

    async fn run<T, E, F, Fut>(
        &self,
        mut operation: F,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, RetryError<E>>
    where
        E: std::error::Error + 'static,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, Attempt<E>>>,
    {
        let budget = self.policy.budget();
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(RetryError::Cancelled {
                attempts: 0,
                last: None,
            });
        }

        let mut attempt: u32 = 1;
        let mut last: Option<E> = None;
        loop {
            let outcome = if let Some(token) = cancel {
                tokio::select! {
                    biased;
                    outcome = operation(attempt) => outcome,
                    () = token.cancelled() => {
                        return Err(RetryError::Cancelled {
                            attempts: attempt,
                            last,
                        });
                    }
                }
            } else {
                operation(attempt).await
            };
            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(Attempt::Permanent(error)) => return Err(RetryError::Permanent(error)),
                Err(Attempt::Transient(error)) => error,
            };

            if attempt >= budget {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: error,
                });
            }

            let delay = self.policy.delay_after(attempt);
            log_retry(attempt, budget, delay, &error);
            if let Some(token) = cancel {
                tokio::select! {
                    () = token.cancelled() => {
                        return Err(RetryError::Cancelled {
                            attempts: attempt,
                            last: Some(error),
                        });
                    }
                    () = sleep(delay) => {}
                }
            } else {
                sleep(delay).await;
            }
            last = Some(error);
            attempt = attempt.saturating_add(1);
        }
    }
}

fn log_retry(attempt: u32, budget: u32, delay: Duration, error: &impl Display) {
    debug!(
        attempt,
        budget,
        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        %error,
        "attempt failed, retrying"
    );
}
