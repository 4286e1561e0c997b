//! Fixed-size character grid and the renderer that plots series onto it.
//!
//! Coordinates: row 0 is the bottom (value 0), row `H - 1` the top (value 100);
//! column 0 is the first timestamp, column `W - 1` the last. Overlapping points
//! are resolved last-write-wins in key-major, point-minor order.

use super::palette::{marker_for, Marker};
use super::panel::{Legend, LegendEntry, Line, Panel};
use crate::data::request::region_label;
use crate::data::series::{Series, SeriesResult};
use thiserror::Error;

/// Width of the `"100|"` y-axis gutter.
const GUTTER: usize = 4;
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("cannot generate chart: no data points")]
    NoDataPoints,

    #[error("chart size must be positive, got {height}x{width}")]
    InvalidSize { height: usize, width: usize },
}

/// `height × width` cells, each blank or holding one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Option<Marker>>,
}

impl Grid {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![None; height * width],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell at row `y` (0 = bottom), column `x`.
    pub fn get(&self, y: usize, x: usize) -> Option<Marker> {
        self.cells.get(y * self.width + x).copied().flatten()
    }

    pub fn set(&mut self, y: usize, x: usize, marker: Marker) {
        debug_assert!(y < self.height && x < self.width);
        self.cells[y * self.width + x] = Some(marker);
    }

    pub fn row(&self, y: usize) -> &[Option<Marker>] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }
}

/// Column for point `i` of `n`: `min(round(i / max(1, n-1) * (W-1)), W-1)`.
pub fn column_for(i: usize, n: usize, width: usize) -> usize {
    let span = n.saturating_sub(1).max(1) as f64;
    let last = width.saturating_sub(1);
    let x = (i as f64 / span * last as f64).round() as usize;
    x.min(last)
}

/// Row for `value` in `[0, 100]`: `min(round(value / 100 * (H-1)), H-1)`.
pub fn row_for(value: f64, height: usize) -> usize {
    let last = height.saturating_sub(1);
    let y = (value.clamp(0.0, 100.0) / 100.0 * last as f64).round() as usize;
    y.min(last)
}

/// Pieces of the chart title besides the key list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleParts {
    /// Leading label, e.g. `Google Trends Interest`.
    pub label: String,
    pub timeframe: String,
    /// Region code; empty renders as `Global`.
    pub region: String,
}

impl TitleParts {
    pub fn new(
        label: impl Into<String>,
        timeframe: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            timeframe: timeframe.into(),
            region: region.into(),
        }
    }

    fn title(&self, keys: &[&str]) -> String {
        format!(
            "{}: {} ({}, {})",
            self.label,
            keys.join(", "),
            self.timeframe,
            region_label(&self.region)
        )
    }
}

/// Plots a [`SeriesResult`] onto a fixed-size grid and assembles the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRenderer {
    height: usize,
    width: usize,
}

impl GridRenderer {
    pub fn new(height: usize, width: usize) -> Result<Self, RenderError> {
        if height == 0 || width == 0 {
            return Err(RenderError::InvalidSize { height, width });
        }
        Ok(Self { height, width })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Series from `result` for `keys`, in `keys` order, skipping keys without data.
    fn rendered<'r>(result: &'r SeriesResult, keys: &[String]) -> Vec<&'r Series> {
        keys.iter().filter_map(|k| result.get(k)).collect()
    }

    /// Plot every present value of every key. Later keys overwrite earlier ones,
    /// later points overwrite earlier ones.
    pub fn plot(&self, result: &SeriesResult, keys: &[String]) -> Result<Grid, RenderError> {
        let series = Self::rendered(result, keys);
        let n = result.len();
        if n == 0 || series.is_empty() {
            return Err(RenderError::NoDataPoints);
        }

        let mut grid = Grid::new(self.height, self.width);
        for (k, s) in series.iter().enumerate() {
            let marker = marker_for(k);
            for (i, value) in s.values.iter().enumerate().take(n) {
                let Some(value) = value else { continue };
                grid.set(
                    row_for(*value, self.height),
                    column_for(i, n, self.width),
                    marker,
                );
            }
        }
        Ok(grid)
    }

    /// Render the chart panel and its legend.
    ///
    /// Pure: the same inputs always produce the same panel.
    pub fn render(
        &self,
        result: &SeriesResult,
        keys: &[String],
        title: &TitleParts,
    ) -> Result<(Panel, Legend), RenderError> {
        let grid = self.plot(result, keys)?;
        let series = Self::rendered(result, keys);
        let names: Vec<&str> = series.iter().map(|s| s.key.as_str()).collect();
        let full_width = self.width + GUTTER;

        let mut lines = Vec::with_capacity(self.height + 4);
        lines.push(Line::plain(format!(
            "{:^full_width$}",
            title.title(&names)
        )));
        lines.push(Line::plain("-".repeat(full_width)));

        for y in (0..self.height).rev() {
            let mut line = Line::plain(self.y_label(y));
            for cell in grid.row(y) {
                match cell {
                    Some(marker) => line.push_char(marker.glyph, marker.color),
                    None => line.push(" ", None),
                }
            }
            lines.push(line);
        }

        lines.push(Line::plain(format!("---+{}", "-".repeat(self.width))));
        lines.push(Line::plain(self.date_labels(result)));

        let legend = Legend {
            entries: names
                .iter()
                .enumerate()
                .map(|(k, name)| LegendEntry {
                    key: name.to_string(),
                    marker: marker_for(k),
                })
                .collect(),
        };

        Ok((Panel { lines }, legend))
    }

    /// `"%3d|"` on the top, middle and bottom rows, blank gutter elsewhere.
    fn y_label(&self, y: usize) -> String {
        let top = self.height - 1;
        if y != top && y != 0 && y != self.height / 2 {
            return "   |".to_string();
        }
        let value = if self.height > 1 {
            (y as f64 / top as f64 * 100.0).round() as i64
        } else {
            100
        };
        format!("{value:3}|")
    }

    /// First and last date under the axis, at least one space apart.
    fn date_labels(&self, result: &SeriesResult) -> String {
        let start = result
            .first_timestamp()
            .map(|t| t.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        let end = result
            .last_timestamp()
            .map(|t| t.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        let gap = self
            .width
            .saturating_sub(start.chars().count() + end.chars().count())
            .max(1);
        format!("   |{start}{}{end}", " ".repeat(gap))
    }
}
