//! Partial-failure degradation: which requested keys actually came back.
//!
//! The active key set only ever shrinks within one fetch. A key that produced
//! no column is dropped and never asked for again in that fetch; the caller
//! gets best-effort data for the rest instead of a hard failure.

/// Result of checking a response's columns against the active keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrowing {
    /// Active keys that have a column, in active-key order.
    pub kept: Vec<String>,
    /// Active keys with no column, in active-key order.
    pub dropped: Vec<String>,
}

impl Narrowing {
    /// Some, but not all, keys came back.
    pub fn is_partial(&self) -> bool {
        !self.kept.is_empty() && !self.dropped.is_empty()
    }

    /// None of the active keys came back.
    pub fn is_total_loss(&self) -> bool {
        self.kept.is_empty()
    }
}

/// Split `active` into keys present in `columns` and keys missing from it.
///
/// Pure: order follows `active`, extra columns are ignored.
pub fn resolve(active: &[String], columns: &[&str]) -> Narrowing {
    let (kept, dropped): (Vec<String>, Vec<String>) = active
        .iter()
        .cloned()
        .partition(|key| columns.contains(&key.as_str()));
    Narrowing { kept, dropped }
}

/// Monotonically narrowing key set for one fetch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveKeys {
    keys: Vec<String>,
}

impl ActiveKeys {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keep only keys that appear in `columns`. Never adds keys back.
    pub fn narrow(&mut self, columns: &[&str]) -> Narrowing {
        let narrowing = resolve(&self.keys, columns);
        self.keys.clone_from(&narrowing.kept);
        narrowing
    }
}
