//! Series glyphs and colors.

use serde::{Deserialize, Serialize};

/// Color a plotted series is drawn in. Sinks decide how (or whether) to show it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesColor {
    Blue,
    Red,
    Green,
}

/// Glyph plus optional color for one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub glyph: char,
    pub color: Option<SeriesColor>,
}

/// One marker per series slot, in key order.
pub const PALETTE: [Marker; 3] = [
    Marker {
        glyph: '█',
        color: Some(SeriesColor::Blue),
    },
    Marker {
        glyph: '*',
        color: Some(SeriesColor::Red),
    },
    Marker {
        glyph: '+',
        color: Some(SeriesColor::Green),
    },
];

/// Uncolored marker for series beyond the palette.
pub const FALLBACK: Marker = Marker {
    glyph: '?',
    color: None,
};

/// Marker for the series at position `index` in key order.
pub fn marker_for(index: usize) -> Marker {
    PALETTE.get(index).copied().unwrap_or(FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_three_slots_are_distinct() {
        let glyphs: Vec<char> = (0..3).map(|i| marker_for(i).glyph).collect();
        assert_eq!(glyphs, vec!['█', '*', '+']);
    }

    #[test]
    fn fourth_slot_falls_back() {
        assert_eq!(marker_for(3), FALLBACK);
        assert_eq!(marker_for(3).color, None);
    }
}
