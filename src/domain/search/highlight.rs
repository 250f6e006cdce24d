//! Case-insensitive match highlighting

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Find every non-overlapping, case-insensitive occurrence of `needle`.
///
/// Spans are ordered, lie on char boundaries and are scanned left to right,
/// so the text itself is never modified.
pub fn find_spans(text: &str, needle: &str) -> Vec<TextSpan> {
    let needle = needle.trim();
    if needle.is_empty() || text.is_empty() {
        return Vec::new();
    }

    let needle_lower: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    let mut spans = Vec::new();
    let mut start = 0;

    while start < text.len() {
        match match_at(&text[start..], &needle_lower) {
            Some(len) => {
                spans.push(TextSpan::new(start, start + len));
                start += len;
            }
            None => {
                start += text[start..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    spans
}

/// Byte length of the match of `needle` at the start of `haystack`
fn match_at(haystack: &str, needle: &[char]) -> Option<usize> {
    let mut pending = needle.iter();
    let mut expected = pending.next();
    let mut consumed = 0;

    for c in haystack.chars() {
        for lower in c.to_lowercase() {
            match expected {
                Some(&e) if e == lower => expected = pending.next(),
                _ => return None,
            }
        }

        consumed += c.len_utf8();

        if expected.is_none() {
            return Some(consumed);
        }
    }

    None
}
