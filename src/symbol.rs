//! Symbols and their boundary-anchored match patterns
//!
//! A symbol is a maximal run of symbol constituents (alphanumerics plus a
//! configurable set of extra characters). Matching a symbol means finding
//! its literal text where both ends sit on a symbol boundary, so `foo`
//! never matches inside `foobar` or `my_foo`.

use std::ops::Range;

use regex::Regex;

use crate::config::Config;
use crate::error::Result;

/// Left symbol-boundary marker in a pattern's textual form
pub const PREFIX: &str = r"\_<";
/// Right symbol-boundary marker in a pattern's textual form
pub const SUFFIX: &str = r"\_>";

/// Which characters make up a symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSyntax {
    extra: Vec<char>,
}

impl SymbolSyntax {
    /// Alphanumerics plus the characters in `extra`
    pub fn new(extra: &str) -> Self {
        Self {
            extra: extra.chars().collect(),
        }
    }

    pub fn is_constituent(&self, ch: char) -> bool {
        ch.is_alphanumeric() || self.extra.contains(&ch)
    }

    /// True if a symbol may start at `start` and end at `end`
    pub fn is_boundary_pair(&self, text: &str, start: usize, end: usize) -> bool {
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(|c| self.is_constituent(c))
            && !after.is_some_and(|c| self.is_constituent(c))
    }

    /// Span of the symbol containing `offset`, or ending right at it
    pub fn span_at(&self, text: &str, offset: usize) -> Option<Range<usize>> {
        let offset = floor_char_boundary(text, offset);

        let on_symbol = text[offset..]
            .chars()
            .next()
            .is_some_and(|c| self.is_constituent(c));
        let after_symbol = text[..offset]
            .chars()
            .next_back()
            .is_some_and(|c| self.is_constituent(c));
        if !on_symbol && !after_symbol {
            return None;
        }

        let start = text[..offset]
            .char_indices()
            .rev()
            .take_while(|&(_, c)| self.is_constituent(c))
            .last()
            .map_or(offset, |(i, _)| i);
        let end = text[offset..]
            .char_indices()
            .find(|&(_, c)| !self.is_constituent(c))
            .map_or(text.len(), |(i, _)| offset + i);

        Some(start..end)
    }
}

impl Default for SymbolSyntax {
    fn default() -> Self {
        Self::new("_")
    }
}

/// Nearest char boundary at or before `pos`
fn floor_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut p = pos;
    while p > 0 && !text.is_char_boundary(p) {
        p -= 1;
    }
    p
}

/// A symbol literal wrapped in boundary anchors
#[derive(Debug, Clone)]
pub struct SymbolPattern {
    literal: String,
    source: String,
    regex: Regex,
    syntax: SymbolSyntax,
}

impl SymbolPattern {
    fn new(literal: &str, syntax: &SymbolSyntax) -> Option<Self> {
        let escaped = regex::escape(literal);
        Regex::new(&escaped).ok().map(|regex| Self {
            literal: literal.to_string(),
            source: format!("{}{}{}", PREFIX, escaped, SUFFIX),
            regex,
            syntax: syntax.clone(),
        })
    }

    /// Textual form, `\_<literal\_>`; renderers key highlights on this
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The literal with the boundary markers stripped
    pub fn display_text(&self) -> &str {
        &self.literal
    }

    /// Next boundary match starting at or after `from` and ending by `limit`
    pub fn find_forward(&self, text: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        let limit = limit.min(text.len());
        let mut pos = floor_char_boundary(text, from);
        while pos <= limit {
            let m = self.regex.find_at(text, pos)?;
            if m.end() > limit {
                return None;
            }
            if self.syntax.is_boundary_pair(text, m.start(), m.end()) {
                return Some(m.range());
            }
            // Retry one char further so overlapping candidates are not skipped
            pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }

    /// Last boundary match starting at or after `floor` and ending by `to`
    pub fn find_backward(&self, text: &str, to: usize, floor: usize) -> Option<Range<usize>> {
        let mut found = None;
        let mut pos = floor;
        while let Some(m) = self.find_forward(text, pos, to) {
            pos = m.end;
            found = Some(m);
        }
        found
    }

    /// All boundary matches, in order
    pub fn find_all(&self, text: &str) -> Vec<Range<usize>> {
        let mut matches = Vec::new();
        let mut pos = 0;
        while let Some(m) = self.find_forward(text, pos, text.len()) {
            pos = m.end;
            matches.push(m);
        }
        matches
    }
}

/// A symbol: its literal text and derived pattern.
///
/// Equality is by literal text.
#[derive(Debug, Clone)]
pub struct Symbol {
    pattern: SymbolPattern,
}

impl Symbol {
    pub fn text(&self) -> &str {
        self.pattern.display_text()
    }

    pub fn pattern(&self) -> &SymbolPattern {
        &self.pattern
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text()
    }
}

impl Eq for Symbol {}

/// Turns raw text into symbols, honoring the ignore list
#[derive(Debug, Clone)]
pub struct SymbolMatcher {
    syntax: SymbolSyntax,
    ignore: Vec<Regex>,
}

impl SymbolMatcher {
    /// Create a matcher; every ignore entry must be a valid regex
    pub fn new(syntax: SymbolSyntax, ignore: &[String]) -> Result<Self> {
        let ignore = ignore
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { syntax, ignore })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(SymbolSyntax::new(&config.symbol_chars), &config.ignore)
    }

    pub fn syntax(&self) -> &SymbolSyntax {
        &self.syntax
    }

    /// True if any ignore rule matches the raw text
    pub fn is_ignored(&self, raw: &str) -> bool {
        self.ignore.iter().any(|re| re.is_match(raw))
    }

    /// Boundary-anchored pattern for `raw`; None for empty or ignored text
    pub fn pattern_for(&self, raw: &str) -> Option<SymbolPattern> {
        if raw.is_empty() || self.is_ignored(raw) {
            return None;
        }
        SymbolPattern::new(raw, &self.syntax)
    }

    pub fn symbol_for(&self, raw: &str) -> Option<Symbol> {
        self.pattern_for(raw).map(|pattern| Symbol { pattern })
    }

    /// Symbol around `offset` in `text`, with its span
    pub fn symbol_at(&self, text: &str, offset: usize) -> Option<(Symbol, Range<usize>)> {
        let span = self.syntax.span_at(text, offset)?;
        let symbol = self.symbol_for(&text[span.clone()])?;
        Some((symbol, span))
    }
}

impl Default for SymbolMatcher {
    fn default() -> Self {
        Self {
            syntax: SymbolSyntax::default(),
            ignore: Vec::new(),
        }
    }
}
