//! Google Trends interest-over-time source.
//!
//! Talks to the unofficial web endpoints the Trends site itself uses:
//! 1. `GET /` once, to pick up the session cookie.
//! 2. `GET /trends/api/explore` to obtain the `TIMESERIES` widget and its token.
//! 3. `GET /trends/api/widgetdata/multiline` with that widget's request + token.
//!
//! Responses are JSON behind an anti-hijacking prefix (`)]}'`), which is
//! stripped before parsing. There is no official API and the format changes
//! without notice; parse failures surface as [`SourceError::ResponseFormatChanged`].

use super::request::SeriesRequest;
use super::series::{Column, SeriesTable, COMPLETENESS_COLUMN};
use super::source::{SeriesSource, SourceError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://trends.google.com";
const EXPLORE_PATH: &str = "/trends/api/explore";
const MULTILINE_PATH: &str = "/trends/api/widgetdata/multiline";
const TIMESERIES_WIDGET: &str = "TIMESERIES";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// `/explore` response: only the widget list matters.
#[derive(Debug, Deserialize)]
struct ExploreResponse {
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    request: Option<serde_json::Value>,
}

/// `/widgetdata/multiline` response.
#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: TimelineBody,
}

#[derive(Debug, Deserialize)]
struct TimelineBody {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    /// Unix seconds, as a string.
    time: String,
    #[serde(default)]
    value: Vec<f64>,
    #[serde(rename = "hasData", default)]
    has_data: Vec<bool>,
    #[serde(rename = "isPartial", default)]
    is_partial: bool,
}

/// Connection settings for [`GoogleTrendsSource`].
#[derive(Debug, Clone)]
pub struct GoogleTrendsOptions {
    /// Interface language, e.g. `en-US`. The last two letters seed the cookie request.
    pub language: String,
    /// Minutes west of UTC, as the Trends site expects (`360` = US Central).
    pub tz_offset_minutes: i32,
    /// Trends category id, `0` for all categories.
    pub category: u32,
    pub timeout: Duration,
}

impl Default for GoogleTrendsOptions {
    fn default() -> Self {
        Self {
            language: "en-US".into(),
            tz_offset_minutes: 360,
            category: 0,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Google Trends source backed by a blocking HTTP client with a cookie store.
pub struct GoogleTrendsSource {
    client: reqwest::blocking::Client,
    options: GoogleTrendsOptions,
    primed: AtomicBool,
}

impl GoogleTrendsSource {
    pub fn new(options: GoogleTrendsOptions) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| SourceError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            options,
            primed: AtomicBool::new(false),
        })
    }

    /// Fetch the landing page once so later calls carry the session cookie.
    fn prime_cookies(&self) -> Result<(), SourceError> {
        if self.primed.load(Ordering::SeqCst) {
            return Ok(());
        }
        let geo = cookie_geo(&self.options.language);
        self.get_text(BASE_URL, &[("geo", geo.to_string())], "cookie")?;
        self.primed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn get_text(
        &self,
        url: &str,
        params: &[(&str, String)],
        endpoint: &str,
    ) -> Result<String, SourceError> {
        debug!(endpoint, url, "GET");
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .map_err(|e| SourceError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        resp.text()
            .map_err(|e| SourceError::NetworkUnreachable(e.to_string()))
    }

    fn timeseries_widget(&self, request: &SeriesRequest) -> Result<(String, String), SourceError> {
        let url = format!("{BASE_URL}{EXPLORE_PATH}");
        let params = [
            ("hl", self.options.language.clone()),
            ("tz", self.options.tz_offset_minutes.to_string()),
            ("req", explore_payload(request, self.options.category)),
        ];
        let body = self.get_text(&url, &params, "explore")?;
        parse_explore(&body)
    }
}

impl SeriesSource for GoogleTrendsSource {
    fn name(&self) -> &str {
        "google_trends"
    }

    fn interest_over_time(&self, request: &SeriesRequest) -> Result<SeriesTable, SourceError> {
        self.prime_cookies()?;
        let (widget_request, token) = self.timeseries_widget(request)?;

        let url = format!("{BASE_URL}{MULTILINE_PATH}");
        let params = [
            ("req", widget_request),
            ("token", token),
            ("tz", self.options.tz_offset_minutes.to_string()),
        ];
        let body = self.get_text(&url, &params, "multiline")?;
        parse_multiline(&body, &request.keys)
    }
}

/// Country code the landing page is requested with: last two letters of the language.
fn cookie_geo(language: &str) -> &str {
    language
        .char_indices()
        .rev()
        .nth(1)
        .map(|(i, _)| &language[i..])
        .unwrap_or("US")
}

/// JSON `req` parameter for `/explore`.
fn explore_payload(request: &SeriesRequest, category: u32) -> String {
    let items: Vec<serde_json::Value> = request
        .keys
        .iter()
        .map(|k| json!({ "keyword": k, "time": request.timeframe, "geo": request.region }))
        .collect();
    json!({ "comparisonItem": items, "category": category, "property": "" }).to_string()
}

/// Drop the `)]}'` / `)]}',` guard in front of the JSON document.
fn strip_guard(body: &str) -> Result<&str, SourceError> {
    body.find('{')
        .map(|start| &body[start..])
        .ok_or_else(|| unparseable(body, "no JSON object in response".into()))
}

/// Error for a body that could not be parsed. Throttling pages (HTML mentioning
/// 429) are reported as rate limiting rather than a format change.
fn unparseable(body: &str, detail: String) -> SourceError {
    if body.contains("429") {
        SourceError::RateLimited { status: 429 }
    } else {
        SourceError::ResponseFormatChanged(detail)
    }
}

/// Returns the `TIMESERIES` widget's serialized request and its token.
fn parse_explore(body: &str) -> Result<(String, String), SourceError> {
    let explore: ExploreResponse = serde_json::from_str(strip_guard(body)?)
        .map_err(|e| unparseable(body, format!("explore: {e}")))?;

    let widget = explore
        .widgets
        .into_iter()
        .find(|w| w.id == TIMESERIES_WIDGET)
        .ok_or_else(|| SourceError::ResponseFormatChanged("no TIMESERIES widget".into()))?;

    match (widget.request, widget.token) {
        (Some(request), Some(token)) => Ok((request.to_string(), token)),
        _ => Err(SourceError::ResponseFormatChanged(
            "TIMESERIES widget without request/token".into(),
        )),
    }
}

/// Turn the timeline into a table with one column per key that has any data.
///
/// A key whose `hasData` flag is false at every point gets no column at all;
/// individual points with `hasData = false` become missing values. The
/// `isPartial` flag is exposed as [`COMPLETENESS_COLUMN`].
fn parse_multiline(body: &str, keys: &[String]) -> Result<SeriesTable, SourceError> {
    let multiline: MultilineResponse = serde_json::from_str(strip_guard(body)?)
        .map_err(|e| unparseable(body, format!("multiline: {e}")))?;
    let points = multiline.default.timeline_data;

    if points.is_empty() {
        return Ok(SeriesTable::default());
    }

    let timestamps = points
        .iter()
        .map(|p| parse_time(&p.time))
        .collect::<Result<Vec<_>, _>>()?;

    let mut columns = Vec::with_capacity(keys.len() + 1);
    for (j, key) in keys.iter().enumerate() {
        let values: Vec<Option<f64>> = points
            .iter()
            .map(|p| {
                let has = p.has_data.get(j).copied().unwrap_or(p.has_data.is_empty());
                if has {
                    p.value.get(j).copied()
                } else {
                    None
                }
            })
            .collect();
        if values.iter().any(Option::is_some) {
            columns.push(Column::new(key.clone(), values));
        }
    }

    if !columns.is_empty() {
        let partial = points
            .iter()
            .map(|p| Some(if p.is_partial { 1.0 } else { 0.0 }))
            .collect();
        columns.push(Column::new(COMPLETENESS_COLUMN, partial));
    }

    Ok(SeriesTable::new(timestamps, columns))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, SourceError> {
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| SourceError::ResponseFormatChanged(format!("invalid timestamp: {raw}")))
}
