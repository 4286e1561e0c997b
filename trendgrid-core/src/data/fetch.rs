//! Series fetcher: runs one request through the retry loop and degrades on
//! partial data.
//!
//! Flow per fetch:
//! 1. Validate the request (never retried).
//! 2. Call the source through [`RetryPolicy::execute`] with the active key set.
//! 3. An empty table ends the fetch with [`FetchError::EmptyResult`]; it is not
//!    a retryable failure.
//! 4. Otherwise drop the completeness column, narrow the active keys to the
//!    columns that came back, and return whatever data there is.

use super::degrade::ActiveKeys;
use super::request::{SeriesRequest, ValidationError};
use super::series::SeriesResult;
use super::source::{SeriesSource, SourceError};
use crate::backoff::{
    Attempt, CancelToken, Retried, RetryError, RetryPolicy, Sleeper, ThreadSleeper,
};
use rand::Rng;
use thiserror::Error;
use tracing::{error, info, warn};

/// A successful, possibly narrowed, fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub result: SeriesResult,
    /// Requested keys that produced data, in request order.
    pub keys_with_data: Vec<String>,
    /// Requested keys that were dropped for lack of data.
    pub missing: Vec<String>,
    pub attempts: Vec<Attempt>,
}

impl FetchOutcome {
    pub fn is_partial(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Why a fetch produced no data. Carries the keys as originally requested.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("no data found for: {}", .keys.join(", "))]
    EmptyResult { keys: Vec<String> },

    #[error("failed to fetch data for {} after {} attempt(s)", .keys.join(", "), .attempts.len())]
    Exhausted {
        keys: Vec<String>,
        attempts: Vec<Attempt>,
        #[source]
        last_error: SourceError,
    },

    #[error("fetch for {} cancelled during backoff", .keys.join(", "))]
    Cancelled {
        keys: Vec<String>,
        attempts: Vec<Attempt>,
    },
}

impl FetchError {
    /// Keys of the original request, unnarrowed. `None` for validation failures.
    pub fn requested_keys(&self) -> Option<&[String]> {
        match self {
            Self::Validation(_) => None,
            Self::EmptyResult { keys }
            | Self::Exhausted { keys, .. }
            | Self::Cancelled { keys, .. } => Some(keys),
        }
    }
}

/// Fetches interest-over-time series from a [`SeriesSource`], one request at a time.
pub struct SeriesFetcher<'a, S: SeriesSource + ?Sized> {
    source: &'a S,
    policy: RetryPolicy,
    cancel: Option<CancelToken>,
}

impl<'a, S: SeriesSource + ?Sized> SeriesFetcher<'a, S> {
    pub fn new(source: &'a S, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy,
            cancel: None,
        }
    }

    /// Abort pending backoff sleeps once `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch with the thread RNG for jitter and real, blocking sleeps.
    pub fn fetch(&self, request: SeriesRequest) -> Result<FetchOutcome, FetchError> {
        let mut rng = rand::thread_rng();
        let mut sleeper = match &self.cancel {
            Some(token) => ThreadSleeper::with_cancel(token.clone()),
            None => ThreadSleeper::new(),
        };
        self.fetch_with(request, &mut rng, &mut sleeper)
    }

    /// Fetch with an injected jitter source and sleeper.
    pub fn fetch_with<R, Sl>(
        &self,
        request: SeriesRequest,
        rng: &mut R,
        sleeper: &mut Sl,
    ) -> Result<FetchOutcome, FetchError>
    where
        R: Rng + ?Sized,
        Sl: Sleeper + ?Sized,
    {
        request.validate()?;

        let requested = request.keys.clone();
        let mut active = ActiveKeys::new(request.keys.clone());
        let max_retries = self.policy.max_retries();
        let mut attempt = 0;

        let retried = self.policy.execute(rng, sleeper, || {
            attempt += 1;
            info!(
                source = self.source.name(),
                keys = %active.as_slice().join(", "),
                attempt,
                max_retries,
                "fetching interest over time"
            );
            self.source
                .interest_over_time(&request.with_keys(active.as_slice()))
        });

        let Retried {
            value: mut table,
            attempts,
        } = match retried {
            Ok(retried) => retried,
            Err(RetryError::Exhausted {
                last_error,
                attempts,
            }) => {
                error!(
                    keys = %requested.join(", "),
                    error = %last_error,
                    "max retries reached, failed to fetch data"
                );
                return Err(FetchError::Exhausted {
                    keys: requested,
                    attempts,
                    last_error,
                });
            }
            Err(RetryError::Cancelled { attempts, .. }) => {
                warn!(keys = %requested.join(", "), "fetch cancelled");
                return Err(FetchError::Cancelled {
                    keys: requested,
                    attempts,
                });
            }
        };

        if table.is_empty() {
            warn!(
                keys = %requested.join(", "),
                "no data returned for the given keywords/timeframe"
            );
            return Err(FetchError::EmptyResult { keys: requested });
        }

        table.drop_completeness_column();
        let narrowing = active.narrow(&table.column_names());

        if narrowing.is_total_loss() {
            warn!(
                keys = %requested.join(", "),
                "response held no column for any requested keyword"
            );
            return Err(FetchError::EmptyResult { keys: requested });
        }
        if narrowing.is_partial() {
            warn!(
                missing = %narrowing.dropped.join(", "),
                "no data found for keyword(s), they will be excluded"
            );
            info!(keys = %narrowing.kept.join(", "), "partial data fetched");
        } else {
            info!(keys = %narrowing.kept.join(", "), "data fetched");
        }

        let result = SeriesResult::from_table(table, active.as_slice());
        Ok(FetchOutcome {
            result,
            keys_with_data: narrowing.kept,
            missing: narrowing.dropped,
            attempts,
        })
    }
}
