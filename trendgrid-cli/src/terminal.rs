//! Framed, colored panel output for interactive terminals.

use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, PrintStyledContent, Stylize};
use std::io::{self, Write};
use trendgrid_core::render::{Legend, Line, Panel, PanelSink, SeriesColor};

pub const PANEL_TITLE: &str = "Trend Visualization";
const PAD_X: usize = 2;
const PAD_Y: usize = 1;

fn term_color(color: SeriesColor) -> Color {
    match color {
        SeriesColor::Blue => Color::Blue,
        SeriesColor::Red => Color::Red,
        SeriesColor::Green => Color::Green,
    }
}

/// Draws the panel inside a rounded box, then the legend underneath.
///
/// With `color` off the same frame is written without escape sequences.
pub struct TerminalSink<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn border(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            queue!(
                self.out,
                PrintStyledContent(text.with(Color::Blue).attribute(Attribute::Dim))
            )
        } else {
            queue!(self.out, Print(text))
        }
    }

    fn line(&mut self, line: &Line) -> io::Result<()> {
        for span in &line.spans {
            match span.color {
                Some(c) if self.color => queue!(
                    self.out,
                    PrintStyledContent(span.text.as_str().with(term_color(c)).bold())
                )?,
                _ => queue!(self.out, Print(&span.text))?,
            }
        }
        Ok(())
    }

    /// `│  <line><fill>  │`
    fn row(&mut self, line: &Line, inner: usize) -> io::Result<()> {
        let fill = inner.saturating_sub(line.width() + 2 * PAD_X);
        self.border("│")?;
        queue!(self.out, Print(" ".repeat(PAD_X)))?;
        self.line(line)?;
        queue!(self.out, Print(" ".repeat(fill + PAD_X)))?;
        self.border("│")?;
        queue!(self.out, Print("\n"))
    }
}

impl<W: Write> PanelSink for TerminalSink<W> {
    fn write_panel(&mut self, panel: &Panel, legend: &Legend) -> io::Result<()> {
        let title = format!(" {PANEL_TITLE} ");
        let inner = (panel.width() + 2 * PAD_X).max(title.chars().count() + 2);
        let rule = inner - title.chars().count();
        let left = rule / 2;

        self.border(&format!(
            "╭{}{title}{}╮\n",
            "─".repeat(left),
            "─".repeat(rule - left)
        ))?;
        let blank = Line::default();
        for _ in 0..PAD_Y {
            self.row(&blank, inner)?;
        }
        for line in &panel.lines {
            self.row(line, inner)?;
        }
        for _ in 0..PAD_Y {
            self.row(&blank, inner)?;
        }
        self.border(&format!("╰{}╯\n", "─".repeat(inner)))?;

        self.line(&legend.to_line())?;
        queue!(self.out, Print("\n"))?;
        self.out.flush()
    }
}
