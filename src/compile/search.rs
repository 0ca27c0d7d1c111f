//! Finds delimiters in markup source.
//!
//! There are only ever a dozen patterns so a plain scan is used. At each
//! position the longest pattern wins, which is how `{{-` is preferred over
//! `{{`.

use crate::types::syntax::{Kind, Syntax};

#[derive(Debug)]
pub struct Searcher {
    /// Patterns sorted longest first.
    patterns: Vec<(Kind, String)>,
}

impl Searcher {
    pub fn new(syntax: Syntax<'_>) -> Self {
        let mut patterns = syntax.patterns;
        patterns.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()));
        Self { patterns }
    }

    /// Returns the leftmost pattern at or after `at`, as the kind and the
    /// start and end byte offsets.
    pub fn find_at(&self, haystack: &str, at: usize) -> Option<(Kind, usize, usize)> {
        let bytes = haystack.as_bytes();
        (at..bytes.len()).find_map(|i| {
            self.longest_at(bytes, i)
                .map(|(kind, len)| (kind, i, i + len))
        })
    }

    /// Returns the pattern that begins exactly at `at` and where it ends.
    pub fn starts_with(&self, haystack: &str, at: usize) -> Option<(Kind, usize)> {
        self.longest_at(haystack.as_bytes(), at)
            .map(|(kind, len)| (kind, at + len))
    }

    fn longest_at(&self, bytes: &[u8], i: usize) -> Option<(Kind, usize)> {
        let rest = bytes.get(i..)?;
        self.patterns
            .iter()
            .find(|(_, p)| rest.starts_with(p.as_bytes()))
            .map(|(kind, p)| (*kind, p.len()))
    }
}
