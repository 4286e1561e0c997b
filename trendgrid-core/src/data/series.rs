//! Raw source tables and the narrowed series result handed to the renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookkeeping column some sources append to flag incomplete trailing periods.
/// It carries no series values and is discarded before key resolution.
pub const COMPLETENESS_COLUMN: &str = "isPartial";

/// One named column of a [`SeriesTable`]. `None` marks a missing point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Time-indexed table as returned by a [`SeriesSource`](super::source::SeriesSource).
///
/// Every column has one entry per timestamp. Columns are a subset of the
/// requested keys, possibly followed by [`COMPLETENESS_COLUMN`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesTable {
    pub timestamps: Vec<DateTime<Utc>>,
    pub columns: Vec<Column>,
}

impl SeriesTable {
    pub fn new(timestamps: Vec<DateTime<Utc>>, columns: Vec<Column>) -> Self {
        Self {
            timestamps,
            columns,
        }
    }

    /// No rows or no columns: the source's way of saying "nothing for this request".
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty() || self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Remove the completeness marker, if present.
    pub fn drop_completeness_column(&mut self) {
        self.columns.retain(|c| c.name != COMPLETENESS_COLUMN);
    }

    fn take_column(&mut self, name: &str) -> Option<Column> {
        let pos = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(pos))
    }
}

/// One keyword's values on the shared timestamp axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub key: String,
    pub values: Vec<Option<f64>>,
}

/// Fetched data for the keys that actually came back, in request order.
///
/// All series share `timestamps`; values are interest scores in `[0, 100]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub timestamps: Vec<DateTime<Utc>>,
    pub series: Vec<Series>,
}

impl SeriesResult {
    /// Pull `keys` out of `table`, in the order given. Keys the table lacks are skipped.
    ///
    /// Columns shorter than the timestamp axis are padded with missing points so
    /// every series lines up with `timestamps`.
    pub fn from_table(mut table: SeriesTable, keys: &[String]) -> Self {
        let n = table.timestamps.len();
        let series = keys
            .iter()
            .filter_map(|key| table.take_column(key))
            .map(|column| {
                let mut values = column.values;
                values.resize(n, None);
                Series {
                    key: column.name,
                    values,
                }
            })
            .collect();
        Self {
            timestamps: table.timestamps,
            series,
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.key.as_str()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.key == key)
    }

    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty() || self.series.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.iter().min().copied()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.iter().max().copied()
    }
}
