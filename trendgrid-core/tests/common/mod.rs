//! Shared fixtures for integration tests: a scripted source and a recording sleeper.

#![allow(dead_code)]

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use trendgrid_core::backoff::Cancelled;
use trendgrid_core::data::{
    Column, SeriesRequest, SeriesSource, SeriesTable, SourceError, COMPLETENESS_COLUMN,
};

/// Replays a fixed list of responses, one per call, and records the keys of each call.
/// Once the script runs out the last response is repeated.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<SeriesTable, SourceError>>>,
    last: Mutex<Option<Result<SeriesTable, SourceError>>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<SeriesTable, SourceError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl SeriesSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn interest_over_time(&self, request: &SeriesRequest) -> Result<SeriesTable, SourceError> {
        self.calls.lock().unwrap().push(request.keys.clone());
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(response) => {
                *last = Some(response.clone());
                response
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(SourceError::Other("script is empty".into()))),
        }
    }
}

/// Weekly timestamps starting 2024-01-07.
pub fn weekly(n: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| start + ChronoDuration::weeks(i as i64))
        .collect()
}

/// A table with one column per key (a ramp offset by key position) plus the
/// completeness column.
pub fn table(keys: &[&str], n: usize) -> SeriesTable {
    let mut columns: Vec<Column> = keys
        .iter()
        .enumerate()
        .map(|(k, key)| {
            let values = (0..n)
                .map(|i| Some(((i * 7 + k * 20) % 101) as f64))
                .collect();
            Column::new(*key, values)
        })
        .collect();
    let mut partial = vec![Some(0.0); n];
    if let Some(last) = partial.last_mut() {
        *last = Some(1.0);
    }
    columns.push(Column::new(COMPLETENESS_COLUMN, partial));
    SeriesTable::new(weekly(n), columns)
}

pub fn empty_table() -> SeriesTable {
    SeriesTable::new(Vec::new(), Vec::new())
}

pub fn request(keys: &[&str]) -> SeriesRequest {
    SeriesRequest {
        keys: keys.iter().map(|k| k.to_string()).collect(),
        timeframe: "today 12-m".into(),
        region: "US".into(),
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Vec<Duration>,
}

impl RecordingSleeper {
    pub fn sleep_fn(&mut self) -> impl FnMut(Duration) -> Result<(), Cancelled> + '_ {
        move |d| {
            self.sleeps.push(d);
            Ok(())
        }
    }
}
