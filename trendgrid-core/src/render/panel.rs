//! Styled text produced by the renderer: panel lines and the legend.
//!
//! Styling is carried as [`SeriesColor`] tags on spans so the same output can
//! be printed plain (tests, pipes) or colored (terminals).

use super::palette::{Marker, SeriesColor};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub color: Option<SeriesColor>,
}

/// One output line. Adjacent text with the same color is merged into one span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn plain(text: impl Into<String>) -> Self {
        let text: String = text.into();
        let mut line = Self::default();
        line.push(text, None);
        line
    }

    pub fn push(&mut self, text: impl AsRef<str>, color: Option<SeriesColor>) {
        let text = text.as_ref();
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.color == color => last.text.push_str(text),
            _ => self.spans.push(Span {
                text: text.to_string(),
                color,
            }),
        }
    }

    pub fn push_char(&mut self, c: char, color: Option<SeriesColor>) {
        let mut buf = [0u8; 4];
        self.push(c.encode_utf8(&mut buf), color);
    }

    /// Display width in characters.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.spans {
            f.write_str(&span.text)?;
        }
        Ok(())
    }
}

/// The chart: title, rule, plotted rows, axis and date labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub lines: Vec<Line>,
}

impl Panel {
    /// Plain text, lines joined with `\n`.
    pub fn text(&self) -> String {
        self.to_string()
    }

    pub fn width(&self) -> usize {
        self.lines.iter().map(Line::width).max().unwrap_or(0)
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub key: String,
    pub marker: Marker,
}

/// Key-to-glyph mapping printed under the chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    /// `Legend: █ = rust  * = go  ` with each glyph in its series color.
    pub fn to_line(&self) -> Line {
        let mut line = Line::plain("Legend: ");
        for entry in &self.entries {
            line.push_char(entry.marker.glyph, entry.marker.color);
            line.push(format!(" = {}  ", entry.key), None);
        }
        line
    }
}

impl fmt::Display for Legend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_line())
    }
}
