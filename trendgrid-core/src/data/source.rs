//! Series source trait and structured error types.
//!
//! The SeriesSource trait abstracts over where interest-over-time tables come
//! from (the Google Trends web API, or an in-memory script in tests) so the
//! fetch pipeline can be exercised without a network.

use super::request::SeriesRequest;
use super::series::SeriesTable;
use crate::backoff::{Classify, FailureClass};
use thiserror::Error;

/// Failure of a single call against the external source.
///
/// Every variant is retryable; [`Classify`] decides which backoff path it takes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by source (HTTP {status})")]
    RateLimited { status: u16 },

    #[error("HTTP {status} from {endpoint}")]
    Http { status: u16, endpoint: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("source error: {0}")]
    Other(String),
}

impl Classify for SourceError {
    fn failure_class(&self) -> FailureClass {
        match self {
            Self::RateLimited { .. } => FailureClass::RateLimited,
            Self::Http { status: 429, .. } => FailureClass::RateLimited,
            // Some throttling only shows up as a "429" buried in a message.
            Self::NetworkUnreachable(msg) | Self::Other(msg) if msg.contains("429") => {
                FailureClass::RateLimited
            }
            _ => FailureClass::Transient,
        }
    }
}

/// A provider of interest-over-time tables.
///
/// One call fetches every key in `request` at once; the source is free to leave
/// out columns for keys it has no data for.
pub trait SeriesSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the interest-over-time table for `request`.
    fn interest_over_time(&self, request: &SeriesRequest) -> Result<SeriesTable, SourceError>;
}
