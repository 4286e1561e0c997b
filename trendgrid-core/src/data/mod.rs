//! Series fetching: requests, sources, retrying fetcher and key degradation

pub mod degrade;
pub mod fetch;
pub mod google;
pub mod request;
pub mod series;
pub mod source;

pub use degrade::{resolve, ActiveKeys, Narrowing};
pub use fetch::{FetchError, FetchOutcome, SeriesFetcher};
pub use google::{GoogleTrendsOptions, GoogleTrendsSource};
pub use request::{parse_keywords, SeriesRequest, ValidationError, MAX_KEYS, MIN_KEYS};
pub use series::{Column, Series, SeriesResult, SeriesTable, COMPLETENESS_COLUMN};
pub use source::{SeriesSource, SourceError};
