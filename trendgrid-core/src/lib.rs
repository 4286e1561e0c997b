//! TrendGrid Core — fetch interest-over-time series and draw them as a text grid.
//!
//! - Exponential backoff with jitter and a separate rate-limit wait
//! - Series sources (Google Trends) behind a blocking trait
//! - Fetcher that narrows the keyword set when some keys return no data
//! - Pure grid renderer producing styled panel lines and a legend
//! - TOML configuration with defaults

pub mod backoff;
pub mod config;
pub mod data;
pub mod render;
