//! Grid rendering

pub mod grid;
pub mod palette;
pub mod panel;
pub mod sink;

pub use grid::{column_for, row_for, Grid, GridRenderer, RenderError, TitleParts};
pub use palette::{marker_for, Marker, SeriesColor, FALLBACK, PALETTE};
pub use panel::{Legend, LegendEntry, Line, Panel, Span};
pub use sink::{PanelSink, PlainSink};
