//! Output seam for rendered panels.

use super::panel::{Legend, Panel};
use std::io::{self, Write};

/// Something that can display a rendered chart and its legend.
pub trait PanelSink {
    fn write_panel(&mut self, panel: &Panel, legend: &Legend) -> io::Result<()>;
}

/// Writes the panel as uncolored text followed by a blank line and the legend.
pub struct PlainSink<W: Write> {
    out: W,
}

impl<W: Write> PlainSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PanelSink for PlainSink<W> {
    fn write_panel(&mut self, panel: &Panel, legend: &Legend) -> io::Result<()> {
        writeln!(self.out, "{panel}")?;
        writeln!(self.out)?;
        writeln!(self.out, "{legend}")?;
        self.out.flush()
    }
}
