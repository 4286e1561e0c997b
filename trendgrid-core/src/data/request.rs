//! Series request and keyword validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fewest keywords a single request may carry.
pub const MIN_KEYS: usize = 1;
/// Most keywords a single request may carry (one glyph/color per series).
pub const MAX_KEYS: usize = 3;

/// Malformed request. Raised before any network call and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected 1 to 3 keywords, got {0}")]
    KeyCount(usize),

    #[error("keyword '{0}' appears more than once")]
    DuplicateKey(String),

    #[error("keywords must not be blank")]
    BlankKey,
}

/// Ordered set of 1–3 distinct keywords over a timeframe and region.
///
/// An empty `region` means worldwide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRequest {
    pub keys: Vec<String>,
    pub timeframe: String,
    pub region: String,
}

impl SeriesRequest {
    pub fn new(
        keys: Vec<String>,
        timeframe: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let request = Self {
            keys,
            timeframe: timeframe.into(),
            region: region.into(),
        };
        request.validate()?;
        Ok(request)
    }

    /// Check the key invariants: count within bounds, no blanks, no duplicates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_keys(&self.keys)
    }

    /// Same timeframe and region, different key set.
    pub(crate) fn with_keys(&self, keys: &[String]) -> Self {
        Self {
            keys: keys.to_vec(),
            timeframe: self.timeframe.clone(),
            region: self.region.clone(),
        }
    }

    /// Region as shown to users.
    pub fn region_label(&self) -> &str {
        region_label(&self.region)
    }
}

/// `"Global"` for the empty region code, the code itself otherwise.
pub fn region_label(region: &str) -> &str {
    if region.is_empty() {
        "Global"
    } else {
        region
    }
}

pub fn validate_keys(keys: &[String]) -> Result<(), ValidationError> {
    if !(MIN_KEYS..=MAX_KEYS).contains(&keys.len()) {
        return Err(ValidationError::KeyCount(keys.len()));
    }
    for (i, key) in keys.iter().enumerate() {
        if key.trim().is_empty() {
            return Err(ValidationError::BlankKey);
        }
        if keys[..i].contains(key) {
            return Err(ValidationError::DuplicateKey(key.clone()));
        }
    }
    Ok(())
}

/// Split a comma-separated line into trimmed, non-empty keywords and validate them.
///
/// `"rust, go,,zig "` → `["rust", "go", "zig"]`.
pub fn parse_keywords(raw: &str) -> Result<Vec<String>, ValidationError> {
    let keys: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect();
    validate_keys(&keys)?;
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ks: &[&str]) -> Vec<String> {
        ks.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn accepts_one_to_three_keys() {
        for n in 1..=3 {
            let ks: Vec<String> = (0..n).map(|i| format!("k{i}")).collect();
            assert!(SeriesRequest::new(ks, "today 12-m", "US").is_ok());
        }
    }

    #[test]
    fn rejects_zero_and_four_keys() {
        assert_eq!(
            SeriesRequest::new(vec![], "today 12-m", "").unwrap_err(),
            ValidationError::KeyCount(0)
        );
        assert_eq!(
            SeriesRequest::new(keys(&["a", "b", "c", "d"]), "today 12-m", "").unwrap_err(),
            ValidationError::KeyCount(4)
        );
    }

    #[test]
    fn rejects_duplicates_and_blanks() {
        assert_eq!(
            validate_keys(&keys(&["a", "b", "a"])),
            Err(ValidationError::DuplicateKey("a".into()))
        );
        assert_eq!(validate_keys(&keys(&["a", "  "])), Err(ValidationError::BlankKey));
    }

    #[test]
    fn parse_keywords_trims_and_drops_empty_segments() {
        assert_eq!(
            parse_keywords(" rust, go,,zig ").unwrap(),
            keys(&["rust", "go", "zig"])
        );
        assert_eq!(parse_keywords("solo").unwrap(), keys(&["solo"]));
    }

    #[test]
    fn parse_keywords_enforces_bounds() {
        assert_eq!(parse_keywords(" , ,"), Err(ValidationError::KeyCount(0)));
        assert_eq!(parse_keywords("a,b,c,d"), Err(ValidationError::KeyCount(4)));
    }

    #[test]
    fn empty_region_reads_as_global() {
        let global = SeriesRequest::new(keys(&["a"]), "today 12-m", "").unwrap();
        let us = SeriesRequest::new(keys(&["a"]), "today 12-m", "US").unwrap();
        assert_eq!(global.region_label(), "Global");
        assert_eq!(us.region_label(), "US");
    }
}
