//! Source map bookkeeping.
//!
//! The preprocessor chain rewrites `.dingo` bytes into valid Go bytes. Every
//! insertion/removal is paired with a [`Mapping`] so later stages (and, at
//! the end, diagnostic rendering) can translate a position in the
//! preprocessed text back to the original source.

use serde::{Deserialize, Serialize};

/// A 1-indexed line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// One recorded span translation, `{preprocessed, original, length, name}`
/// from the distilled spec's data model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub preprocessed: Position,
    pub original: Position,
    pub length: usize,
    /// Short tag identifying the preprocessor that produced the entry
    /// (e.g. `"error_prop"`, `"match"`, `"enum"`).
    pub name: String,
}

/// Ordered, append-only table of [`Mapping`]s for one file.
#[derive(Debug, Default, Clone)]
pub struct SourceMap {
    mappings: Vec<Mapping>,
    sorted: bool,
}

impl SourceMap {
    pub fn push(&mut self, mapping: Mapping) {
        self.mappings.push(mapping);
        self.sorted = false;
    }

    pub fn extend(&mut self, mappings: impl IntoIterator<Item = Mapping>) {
        self.mappings.extend(mappings);
        self.sorted = false;
    }

    fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.mappings.sort_by_key(|m| m.preprocessed);
            self.sorted = true;
        }
    }

    /// Given a preprocessed position, return the original position recorded
    /// by the mapping with the greatest `preprocessed` position that is
    /// `<=` the query (binary search over the sorted table). Falls back to
    /// the query itself (identity) when the map has no entry at or before
    /// it — this is what makes an already-valid Go file (no SL constructs,
    /// empty mappings table) translate as the identity function.
    pub fn lookup(&self, preprocessed: Position) -> Position {
        // `lookup` takes `&self` so callers can hold a `SourceMap` behind a
        // shared reference; sort eagerly whenever a mutation happens instead.
        debug_assert!(
            self.sorted || self.mappings.windows(2).all(|w| w[0].preprocessed <= w[1].preprocessed),
            "SourceMap::lookup called on an unsorted table"
        );

        let idx = match self
            .mappings
            .binary_search_by(|m| m.preprocessed.cmp(&preprocessed))
        {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => Some(i - 1),
        };

        match idx {
            Some(i) => {
                let m = &self.mappings[i];
                let line_delta = preprocessed.line.saturating_sub(m.preprocessed.line);
                if line_delta == 0 {
                    let col_delta = preprocessed.col.saturating_sub(m.preprocessed.col);
                    Position::new(m.original.line, m.original.col + col_delta)
                } else {
                    Position::new(m.original.line + line_delta, preprocessed.col)
                }
            }
            None => preprocessed,
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Consume this map into its raw mapping list, order not guaranteed
    /// sorted unless [`SourceMap::sorted_mappings`] was already called.
    pub fn into_mappings(self) -> Vec<Mapping> {
        self.mappings
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Sorted view of the mapping table, as required before emitting the
    /// `.go.map` JSON document (§6.4) or calling [`SourceMap::lookup`].
    pub fn sorted_mappings(&mut self) -> &[Mapping] {
        self.ensure_sorted();
        &self.mappings
    }
}

/// On-disk shape of `<file>.go.map`, per §6.4.
#[derive(Debug, Serialize, Deserialize)]
pub struct SourceMapDocument {
    pub version: u32,
    pub file: String,
    pub source: String,
    pub mappings: Vec<SourceMapEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SourceMapEntry {
    pub pl: usize,
    pub pc: usize,
    pub ol: usize,
    pub oc: usize,
    pub len: usize,
    pub name: String,
}

impl SourceMapDocument {
    pub fn from_source_map(file: &str, source: &str, map: &mut SourceMap) -> Self {
        let mappings = map
            .sorted_mappings()
            .iter()
            .map(|m| SourceMapEntry {
                pl: m.preprocessed.line,
                pc: m.preprocessed.col,
                ol: m.original.line,
                oc: m.original.col,
                len: m.length,
                name: m.name.clone(),
            })
            .collect();

        Self {
            version: 1,
            file: file.to_string(),
            source: source.to_string(),
            mappings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pl: usize, pc: usize, ol: usize, oc: usize, name: &str) -> Mapping {
        Mapping {
            preprocessed: Position::new(pl, pc),
            original: Position::new(ol, oc),
            length: 1,
            name: name.into(),
        }
    }

    #[test]
    fn identity_lookup_on_empty_map() {
        let map = SourceMap::default();
        assert_eq!(map.lookup(Position::new(4, 2)), Position::new(4, 2));
    }

    #[test]
    fn lookup_picks_greatest_mapping_leq_query() {
        let mut map = SourceMap::default();
        map.push(mapping(1, 1, 1, 1, "type_annotation"));
        map.push(mapping(3, 5, 2, 10, "error_prop"));
        map.sorted_mappings();

        assert_eq!(map.lookup(Position::new(3, 5)), Position::new(2, 10));
        assert_eq!(map.lookup(Position::new(3, 8)), Position::new(2, 13));
    }

    #[test]
    fn lookup_is_non_decreasing_within_a_line() {
        let mut map = SourceMap::default();
        map.push(mapping(1, 1, 1, 1, "a"));
        map.push(mapping(1, 10, 1, 30, "b"));
        map.sorted_mappings();

        let mut last = Position::new(0, 0);
        for col in 1..40 {
            let got = map.lookup(Position::new(1, col));
            assert!(got >= last, "lookup must be non-decreasing on a line");
            last = got;
        }
    }
}
