//! Fog-of-war state: the set of revealed cells.
//!
//! A cell absent from the set is hidden. Order carries no meaning; the
//! serialized form is sorted only so that saved projects diff cleanly.

#[cfg(test)]
#[path = "fog_test.rs"]
mod fog_test;

use std::collections::HashSet;

use crate::grid::CellKey;

/// Revealed cells of the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FogState {
    revealed: HashSet<CellKey>,
}

impl FogState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reveal `key`. Returns `true` if it was hidden before.
    pub fn reveal(&mut self, key: CellKey) -> bool {
        self.revealed.insert(key)
    }

    /// Hide `key`. Returns `true` if it was revealed before.
    pub fn hide(&mut self, key: CellKey) -> bool {
        self.revealed.remove(&key)
    }

    /// Hide every cell.
    pub fn clear(&mut self) {
        self.revealed.clear();
    }

    #[must_use]
    pub fn contains(&self, key: CellKey) -> bool {
        self.revealed.contains(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.revealed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }

    /// Revealed cells in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.revealed.iter().copied()
    }

    /// Revealed cells as `"col,row"` strings, sorted by `(col, row)`.
    #[must_use]
    pub fn serialize(&self) -> Vec<String> {
        let mut keys: Vec<CellKey> = self.iter().collect();
        keys.sort_unstable();
        keys.into_iter().map(String::from).collect()
    }

    /// Replace the revealed set with the parsed `keys`.
    ///
    /// Malformed entries are skipped and logged; the number skipped is returned.
    pub fn restore<I, S>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.revealed.clear();
        let mut skipped = 0;
        for raw in keys {
            match raw.as_ref().parse::<CellKey>() {
                Ok(key) => {
                    self.revealed.insert(key);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed revealed cell");
                    skipped += 1;
                }
            }
        }
        skipped
    }
}

impl FromIterator<CellKey> for FogState {
    fn from_iter<T: IntoIterator<Item = CellKey>>(iter: T) -> Self {
        Self { revealed: iter.into_iter().collect() }
    }
}
