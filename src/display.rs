//! Display rendering
//!
//! [`KeywordTable`] is the in-process [`Renderer`]: it keeps the registered
//! patterns for every buffer and paints buffer text with them through
//! crossterm.

use std::collections::HashMap;
use std::io::Write;

use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};

use crate::color::{Rgb, Style};
use crate::error::Result;
use crate::registry::Renderer;
use crate::symbol::SymbolPattern;
use crate::text::BufferId;

/// A painted stretch of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub style: Style,
}

/// Per-buffer keyword highlighting table
#[derive(Debug, Default)]
pub struct KeywordTable {
    /// Registered patterns in registration order. Duplicates are kept so a
    /// double registration stays visible.
    keywords: HashMap<BufferId, Vec<(SymbolPattern, Style)>>,
    refreshes: HashMap<BufferId, usize>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Textual patterns registered in a buffer, in registration order
    pub fn patterns(&self, buffer: BufferId) -> Vec<&str> {
        self.keywords
            .get(&buffer)
            .map(|k| k.iter().map(|(p, _)| p.as_str()).collect())
            .unwrap_or_default()
    }

    /// How many times a pattern is registered in a buffer
    pub fn registration_count(&self, buffer: BufferId, pattern: &SymbolPattern) -> usize {
        self.keywords.get(&buffer).map_or(0, |k| {
            k.iter().filter(|(p, _)| p.as_str() == pattern.as_str()).count()
        })
    }

    pub fn style_of(&self, buffer: BufferId, pattern: &SymbolPattern) -> Option<&Style> {
        self.keywords
            .get(&buffer)?
            .iter()
            .find(|(p, _)| p.as_str() == pattern.as_str())
            .map(|(_, s)| s)
    }

    pub fn refresh_count(&self, buffer: BufferId) -> usize {
        self.refreshes.get(&buffer).copied().unwrap_or(0)
    }

    /// Highlighted spans of `text`, sorted and non-overlapping.
    ///
    /// Where matches overlap, the earlier one wins, and on equal starts the
    /// earlier registration wins.
    pub fn spans(&self, buffer: BufferId, text: &str) -> Vec<Span> {
        let Some(keywords) = self.keywords.get(&buffer) else {
            return Vec::new();
        };

        let mut found: Vec<(usize, usize, usize)> = Vec::new();
        for (idx, (pattern, _)) in keywords.iter().enumerate() {
            found.extend(pattern.find_all(text).into_iter().map(|m| (m.start, idx, m.end)));
        }
        found.sort_unstable();

        let mut spans: Vec<Span> = Vec::new();
        let mut covered = 0;
        for (start, idx, end) in found {
            if start < covered {
                continue;
            }
            covered = end;
            spans.push(Span {
                start,
                end,
                style: keywords[idx].1.clone(),
            });
        }
        spans
    }

    /// Write `text` with the buffer's highlights applied
    pub fn paint<W: Write>(&self, buffer: BufferId, text: &str, out: &mut W) -> Result<()> {
        let mut pos = 0;
        for span in self.spans(buffer, text) {
            queue!(out, Print(&text[pos..span.start]))?;
            apply_style(out, &span.style)?;
            queue!(out, Print(&text[span.start..span.end]))?;
            queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
            pos = span.end;
        }
        queue!(out, Print(&text[pos..]))?;
        out.flush()?;
        Ok(())
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

fn apply_style<W: Write>(out: &mut W, style: &Style) -> Result<()> {
    match style {
        // Named faces have no color of their own on a plain terminal
        Style::Face(_) => queue!(out, SetAttribute(Attribute::Reverse))?,
        Style::Colors { bg, fg } => {
            queue!(out, SetBackgroundColor(to_color(*bg)))?;
            if let Some(fg) = fg {
                queue!(out, SetForegroundColor(to_color(*fg)))?;
            }
        }
    }
    Ok(())
}

impl Renderer for KeywordTable {
    fn register_highlight(&mut self, buffer: BufferId, pattern: &SymbolPattern, style: &Style) -> Result<()> {
        self.keywords
            .entry(buffer)
            .or_default()
            .push((pattern.clone(), style.clone()));
        Ok(())
    }

    fn unregister_highlight(&mut self, buffer: BufferId, pattern: &SymbolPattern) {
        if let Some(keywords) = self.keywords.get_mut(&buffer) {
            keywords.retain(|(p, _)| p.as_str() != pattern.as_str());
        }
    }

    fn refresh(&mut self, buffer: BufferId) {
        *self.refreshes.entry(buffer).or_default() += 1;
    }
}
