//! Occurrence counting
//!
//! Counting is always case-sensitive: a symbol pattern matches its literal
//! text exactly, whatever case folding the host uses for other searches.

use std::fmt;

use crate::symbol::SymbolPattern;

/// Total boundary-matched occurrences in `text`
pub fn count(pattern: &SymbolPattern, text: &str) -> usize {
    pattern.find_all(text).len()
}

/// Occurrences that end strictly before `cursor`.
///
/// An occurrence the cursor is inside of, or right after, is not counted.
pub fn rank_before(pattern: &SymbolPattern, text: &str, cursor: usize) -> usize {
    pattern
        .find_all(text)
        .iter()
        .take_while(|m| m.end < cursor)
        .count()
}

/// "Occurrence k/n" report for the cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// 1-based rank of the occurrence at the cursor
    pub rank: usize,
    pub count: usize,
}

impl Occurrence {
    pub fn at(pattern: &SymbolPattern, text: &str, cursor: usize) -> Self {
        Self {
            rank: rank_before(pattern, text, cursor) + 1,
            count: count(pattern, text),
        }
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            f.write_str("Only occurrence in buffer")
        } else {
            write!(f, "Occurrence {}/{} in buffer", self.rank, self.count)
        }
    }
}

/// A line containing the symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurLine {
    /// 1-based line number
    pub line: usize,
    pub text: String,
}

/// Every line containing the symbol, once per line
pub fn occur(pattern: &SymbolPattern, text: &str) -> Vec<OccurLine> {
    let mut lines = Vec::new();
    let mut line_start = 0;
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let body = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        let line_end = line_start + body.len();
        // Match against the whole text so boundaries at line ends are real ones
        if pattern.find_forward(text, line_start, line_end).is_some() {
            lines.push(OccurLine {
                line: idx + 1,
                text: body.to_string(),
            });
        }
        line_start += line.len();
    }
    lines
}
