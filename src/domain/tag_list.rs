//! Tag List
//!
//! The free-text form of an owner's tags: delimiter-separated names in display order.

use std::collections::HashSet;

/// Ordered, de-duplicated list of tag names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList {
    names: Vec<String>,
}

impl TagList {
    /// Parse delimiter-separated text.
    ///
    /// Entries are trimmed; empty entries are dropped and only the first
    /// occurrence of a repeated name is kept.
    pub fn parse(text: &str, delimiter: &str) -> Self {
        if delimiter.is_empty() {
            return Self::from_names(std::iter::once(text));
        }
        Self::from_names(text.split(delimiter))
    }

    /// Build from already separated names, applying the same canonicalization as [`parse`](Self::parse)
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut list = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || !seen.insert(name.to_string()) {
                continue;
            }
            list.push(name.to_string());
        }
        Self { names: list }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Canonical text form
    pub fn join(&self, delimiter: &str) -> String {
        self.names.join(delimiter)
    }
}
