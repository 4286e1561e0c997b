//! Exponential backoff with jitter for calls against a flaky, rate-limited source.
//!
//! [`RetryPolicy::execute`] runs an operation up to `max_retries` times. Between
//! failed attempts the calling thread blocks for a jittered delay:
//!
//! - transient failures wait `min(base * 2^attempt, max) * (0.5 + U)`
//! - rate-limited failures wait `rate_limit_wait + U * rate_limit_jitter`
//!
//! `U` is drawn uniformly from `[0, 1)` out of the RNG handed to `execute`, so a
//! seeded or mock RNG makes the whole delay sequence reproducible. The failure
//! from the last attempt is surfaced unchanged inside [`RetryError::Exhausted`].

use rand::Rng;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// How a failed attempt should be waited out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The source said we are calling too often. Fixed cool-down plus jitter.
    RateLimited,
    /// Anything else. Exponential backoff plus jitter.
    Transient,
}

/// Errors that can be fed through the retry loop.
pub trait Classify {
    fn failure_class(&self) -> FailureClass;
}

/// What happened on a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RateLimited,
    TransientError,
    /// Failed on the last allowed attempt.
    Exhausted,
}

/// Record of one attempt inside [`RetryPolicy::execute`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    /// 0-based, always `< max_retries`.
    pub index: u32,
    /// Time slept after this attempt (zero for success and for the final attempt).
    pub delay_used: Duration,
    pub outcome: AttemptOutcome,
}

/// Invalid retry policy parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max_retries must be at least 1")]
    ZeroRetries,

    #[error("base delay must be positive")]
    ZeroBaseDelay,

    #[error("max delay ({max:?}) is shorter than base delay ({base:?})")]
    MaxBelowBase { base: Duration, max: Duration },
}

/// Immutable retry parameters, built once per call site.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    rate_limit_wait: Duration,
    rate_limit_jitter: Duration,
}

impl RetryPolicy {
    /// Build a policy. The rate-limit path defaults to `base_delay` with no jitter
    /// until [`with_rate_limit_wait`](Self::with_rate_limit_wait) is called.
    pub fn new(
        max_retries: u32,
        base_delay: Duration,
        max_delay: Duration,
    ) -> Result<Self, PolicyError> {
        if max_retries == 0 {
            return Err(PolicyError::ZeroRetries);
        }
        if base_delay.is_zero() {
            return Err(PolicyError::ZeroBaseDelay);
        }
        if max_delay < base_delay {
            return Err(PolicyError::MaxBelowBase {
                base: base_delay,
                max: max_delay,
            });
        }
        Ok(Self {
            max_retries,
            base_delay,
            max_delay,
            rate_limit_wait: base_delay,
            rate_limit_jitter: Duration::ZERO,
        })
    }

    /// Fixed cool-down used when the source signals throttling, plus the width of
    /// the uniform jitter added on top of it.
    pub fn with_rate_limit_wait(mut self, wait: Duration, jitter: Duration) -> Self {
        self.rate_limit_wait = wait;
        self.rate_limit_jitter = jitter;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn rate_limit_wait(&self) -> Duration {
        self.rate_limit_wait
    }

    pub fn rate_limit_jitter(&self) -> Duration {
        self.rate_limit_jitter
    }

    /// Un-jittered exponential delay: `min(base * 2^attempt, max)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2f64.powi(attempt.min(1023) as i32);
        let secs = (self.base_delay.as_secs_f64() * factor).min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(secs)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Scale `delay` by `0.5 + unit`, where `unit` is a draw from `[0, 1)`.
    ///
    /// Saturates at `Duration::MAX`.
    pub fn jittered(delay: Duration, unit: f64) -> Duration {
        scale(delay, 0.5 + unit)
    }

    /// Rate-limit delay for a jitter draw `unit` in `[0, 1)`. Saturates at `Duration::MAX`.
    pub fn rate_limit_delay(&self, unit: f64) -> Duration {
        self.rate_limit_wait
            .saturating_add(scale(self.rate_limit_jitter, unit))
    }

    /// Run `operation` until it succeeds or the budget is spent.
    ///
    /// Sleeps go through `sleeper`; a sleeper that reports cancellation ends the
    /// loop at once with [`RetryError::Cancelled`].
    pub fn execute<T, E, F, R, S>(
        &self,
        rng: &mut R,
        sleeper: &mut S,
        mut operation: F,
    ) -> Result<Retried<T>, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
        E: Classify + fmt::Display,
        R: Rng + ?Sized,
        S: Sleeper + ?Sized,
    {
        let mut attempts = Vec::with_capacity(self.max_retries as usize);
        let last = self.max_retries - 1;
        let mut index = 0;

        loop {
            debug!(attempt = index + 1, max_retries = self.max_retries, "invoking operation");
            let error = match operation() {
                Ok(value) => {
                    attempts.push(Attempt {
                        index,
                        delay_used: Duration::ZERO,
                        outcome: AttemptOutcome::Success,
                    });
                    return Ok(Retried { value, attempts });
                }
                Err(error) => error,
            };

            if index == last {
                attempts.push(Attempt {
                    index,
                    delay_used: Duration::ZERO,
                    outcome: AttemptOutcome::Exhausted,
                });
                warn!(
                    attempt = index + 1,
                    max_retries = self.max_retries,
                    error = %error,
                    "retry budget exhausted"
                );
                return Err(RetryError::Exhausted {
                    last_error: error,
                    attempts,
                });
            }

            let class = error.failure_class();
            let (delay, outcome) = match class {
                FailureClass::RateLimited => {
                    (self.rate_limit_delay(rng.gen()), AttemptOutcome::RateLimited)
                }
                FailureClass::Transient => (
                    Self::jittered(self.backoff_delay(index), rng.gen()),
                    AttemptOutcome::TransientError,
                ),
            };
            attempts.push(Attempt {
                index,
                delay_used: delay,
                outcome,
            });
            warn!(
                attempt = index + 1,
                max_retries = self.max_retries,
                error = %error,
                rate_limited = class == FailureClass::RateLimited,
                delay_secs = delay.as_secs_f64(),
                "attempt failed, retrying"
            );

            if sleeper.sleep(delay).is_err() {
                return Err(RetryError::Cancelled {
                    last_error: error,
                    attempts,
                });
            }
            index += 1;
        }
    }
}

/// `delay * factor`, saturating instead of panicking on overflow.
fn scale(delay: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

/// A successful value plus the attempts it took.
#[derive(Debug, Clone)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: Vec<Attempt>,
}

impl<T> Retried<T> {
    /// Number of backoff sleeps taken before the success.
    pub fn retries(&self) -> usize {
        self.attempts.len().saturating_sub(1)
    }
}

/// Terminal failure of [`RetryPolicy::execute`].
#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("gave up after {} attempt(s): {last_error}", .attempts.len())]
    Exhausted { last_error: E, attempts: Vec<Attempt> },

    #[error("cancelled while backing off after {} attempt(s): {last_error}", .attempts.len())]
    Cancelled { last_error: E, attempts: Vec<Attempt> },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> &[Attempt] {
        match self {
            Self::Exhausted { attempts, .. } | Self::Cancelled { attempts, .. } => attempts,
        }
    }

    pub fn last_error(&self) -> &E {
        match self {
            Self::Exhausted { last_error, .. } | Self::Cancelled { last_error, .. } => last_error,
        }
    }

    pub fn into_last_error(self) -> E {
        match self {
            Self::Exhausted { last_error, .. } | Self::Cancelled { last_error, .. } => last_error,
        }
    }
}

/// The backoff wait was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("backoff wait cancelled")]
pub struct Cancelled;

/// Blocks the calling thread between attempts.
pub trait Sleeper {
    fn sleep(&mut self, delay: Duration) -> Result<(), Cancelled>;
}

impl<F> Sleeper for F
where
    F: FnMut(Duration) -> Result<(), Cancelled>,
{
    fn sleep(&mut self, delay: Duration) -> Result<(), Cancelled> {
        self(delay)
    }
}

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Granularity at which [`ThreadSleeper`] re-checks its cancel token.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Real sleeper backed by `std::thread::sleep`.
#[derive(Debug, Clone, Default)]
pub struct ThreadSleeper {
    cancel: Option<CancelToken>,
}

impl ThreadSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep in short slices and bail out as soon as `token` is cancelled.
    pub fn with_cancel(token: CancelToken) -> Self {
        Self {
            cancel: Some(token),
        }
    }
}

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) -> Result<(), Cancelled> {
        let Some(token) = &self.cancel else {
            std::thread::sleep(delay);
            return Ok(());
        };

        // no deadline: the delay is past what `Instant` can represent
        let deadline = Instant::now().checked_add(delay);
        loop {
            if token.is_cancelled() {
                return Err(Cancelled);
            }
            let now = Instant::now();
            if deadline.is_some_and(|d| now >= d) {
                return Ok(());
            }
            let slice = deadline.map_or(CANCEL_POLL, |d| (d - now).min(CANCEL_POLL));
            std::thread::sleep(slice);
        }
    }
}
