//! Interactive keyword prompt.

use std::io::{self, BufRead, Write};
use trendgrid_core::data::parse_keywords;

pub const PROMPT: &str = "Keywords: ";

/// Ask for keywords until the answer is 1 to 3 distinct non-empty terms.
///
/// Returns `Ok(None)` when input ends before a valid answer is given.
pub fn read_keywords<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<Vec<String>>> {
    writeln!(out, "Enter 1 to 3 search terms, separated by commas.")?;
    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match parse_keywords(&line) {
            Ok(keys) => return Ok(Some(keys)),
            Err(e) => writeln!(
                out,
                "Please enter between 1 and 3 distinct non-empty keywords ({e})."
            )?,
        }
    }
}
