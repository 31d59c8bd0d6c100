//! Insertion-ordered string table for generated metadata.
//!
//! Every name and non-builtin type a declaration's metadata refers to is
//! stored once; the metadata array refers to strings by their position in
//! this table. The order strings are registered in is part of the generated
//! binary layout, so registration order is significant.
//!
//! Strings are stored unescaped. The generator escapes them when writing the
//! C literal and records the unescaped byte length.

use rustc_hash::FxHashMap;

/// Deduplicating string table with stable, 0-based indices.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    /// Map from string to index
    map: FxHashMap<String, usize>,

    /// Strings in registration order
    strings: Vec<String>,
}

impl StringTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a string, returning its index.
    ///
    /// Registering the same bytes again is a no-op and returns the index
    /// assigned the first time.
    pub fn register(&mut self, s: &str) -> usize {
        if let Some(&index) = self.map.get(s) {
            return index;
        }
        let index = self.strings.len();
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), index);
        index
    }

    /// Index of a registered string.
    ///
    /// # Panics
    ///
    /// Panics if the string was never registered. Every string the
    /// generator looks up is registered by its registration pass first.
    pub fn index(&self, s: &str) -> usize {
        match self.get(s) {
            Some(index) => index,
            None => panic!("string {s:?} looked up before registration"),
        }
    }

    /// Index of a string, if registered.
    pub fn get(&self, s: &str) -> Option<usize> {
        self.map.get(s).copied()
    }

    /// Get the number of strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Strings in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}
