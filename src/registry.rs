//! Highlight registry
//!
//! Tracks which symbols are highlighted and keeps every open buffer's
//! renderer registrations in step with that set. Explicit highlights are
//! process-wide and toggled by the user; each buffer additionally has at
//! most one transient highlight owned by the idle machinery.
//!
//! Registrations are recorded per buffer, so registering a symbol that is
//! already registered in a buffer is a no-op whatever the renderer does
//! with duplicates.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::color::{ColorAssigner, Style};
use crate::error::Result;
use crate::symbol::{Symbol, SymbolPattern};
use crate::text::BufferId;

/// Rendering collaborator: paints registered patterns in a buffer
pub trait Renderer {
    fn register_highlight(
        &mut self,
        buffer: BufferId,
        pattern: &SymbolPattern,
        style: &Style,
    ) -> Result<()>;

    fn unregister_highlight(&mut self, buffer: BufferId, pattern: &SymbolPattern);

    /// Repaint after the buffer's registrations changed
    fn refresh(&mut self, buffer: BufferId);
}

/// An explicitly highlighted symbol and its style
#[derive(Debug, Clone)]
pub struct HighlightEntry {
    pub symbol: Symbol,
    pub style: Style,
}

/// Explicit and transient highlights across all buffers
#[derive(Debug, Default)]
pub struct HighlightRegistry {
    /// Explicit highlights in the order they were added
    entries: Vec<HighlightEntry>,
    /// Per-buffer transient symbol
    transient: HashMap<BufferId, Symbol>,
    /// Pattern keys registered with the renderer, per buffer
    registered: HashMap<BufferId, HashSet<String>>,
}

impl HighlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the symbol is explicitly highlighted (transients don't count)
    pub fn is_highlighted(&self, symbol: &Symbol) -> bool {
        self.entries.iter().any(|e| e.symbol == *symbol)
    }

    pub fn entries(&self) -> &[HighlightEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn transient(&self, buffer: BufferId) -> Option<&Symbol> {
        self.transient.get(&buffer)
    }

    /// Check whether a pattern is registered in a buffer
    pub fn is_registered(&self, buffer: BufferId, pattern: &SymbolPattern) -> bool {
        self.registered
            .get(&buffer)
            .is_some_and(|keys| keys.contains(pattern.as_str()))
    }

    /// Highlight the symbol in every buffer, or remove it if already highlighted.
    ///
    /// Returns whether the symbol is highlighted afterwards.
    pub fn toggle<R: Renderer>(
        &mut self,
        symbol: Symbol,
        buffers: &[BufferId],
        colors: &mut ColorAssigner,
        renderer: &mut R,
    ) -> Result<bool> {
        if self.is_highlighted(&symbol) {
            self.remove(&symbol, renderer);
            Ok(false)
        } else {
            self.add(symbol, buffers, colors, renderer)?;
            Ok(true)
        }
    }

    /// Add an explicit highlight to every listed buffer.
    ///
    /// Either every registration succeeds or none is left behind.
    pub fn add<R: Renderer>(
        &mut self,
        symbol: Symbol,
        buffers: &[BufferId],
        colors: &mut ColorAssigner,
        renderer: &mut R,
    ) -> Result<()> {
        if self.is_highlighted(&symbol) {
            return Ok(());
        }

        let shadowed: Vec<BufferId> = self
            .transient
            .iter()
            .filter(|(_, s)| **s == symbol)
            .map(|(b, _)| *b)
            .collect();
        for &buffer in &shadowed {
            self.clear_transient(buffer, renderer);
        }

        let style = colors.peek_style(symbol.text());
        let mut done = Vec::new();
        for &buffer in buffers {
            match self.register(buffer, symbol.pattern(), &style, renderer) {
                Ok(true) => done.push(buffer),
                Ok(false) => {}
                Err(e) => {
                    warn!(symbol = symbol.text(), %buffer, error = %e, "highlight failed, rolling back");
                    for &b in &done {
                        self.unregister(b, symbol.pattern(), renderer);
                        renderer.refresh(b);
                    }
                    for &b in &shadowed {
                        if let Err(e) = self.set_transient(b, symbol.clone(), renderer) {
                            warn!(symbol = symbol.text(), buffer = %b, error = %e, "transient not restored");
                        }
                    }
                    return Err(e);
                }
            }
        }

        colors.advance();
        for &buffer in &done {
            renderer.refresh(buffer);
        }
        debug!(symbol = symbol.text(), %style, buffers = done.len(), "highlighted");
        self.entries.push(HighlightEntry { symbol, style });
        Ok(())
    }

    /// Remove an explicit highlight from every buffer
    pub fn remove<R: Renderer>(&mut self, symbol: &Symbol, renderer: &mut R) -> bool {
        let Some(idx) = self.entries.iter().position(|e| e.symbol == *symbol) else {
            return false;
        };
        let entry = self.entries.remove(idx);
        for buffer in self.buffers_with(entry.symbol.pattern()) {
            self.unregister(buffer, entry.symbol.pattern(), renderer);
            renderer.refresh(buffer);
        }
        debug!(symbol = entry.symbol.text(), "unhighlighted");
        true
    }

    /// Remove every explicit highlight
    pub fn remove_all<R: Renderer>(&mut self, renderer: &mut R) {
        let entries = std::mem::take(&mut self.entries);
        let mut touched = HashSet::new();
        for entry in &entries {
            for buffer in self.buffers_with(entry.symbol.pattern()) {
                self.unregister(buffer, entry.symbol.pattern(), renderer);
                touched.insert(buffer);
            }
        }
        for buffer in touched {
            renderer.refresh(buffer);
        }
        debug!(count = entries.len(), "removed all highlights");
    }

    /// (literal, style) for every explicit highlight
    pub fn list_all(&self) -> Vec<(String, Style)> {
        self.entries
            .iter()
            .map(|e| (e.symbol.pattern().display_text().to_string(), e.style.clone()))
            .collect()
    }

    /// Register every explicit highlight in a newly visible buffer.
    ///
    /// Returns how many registrations were made; already registered symbols
    /// are skipped.
    pub fn rehighlight<R: Renderer>(&mut self, buffer: BufferId, renderer: &mut R) -> Result<usize> {
        let mut done: Vec<SymbolPattern> = Vec::new();
        let entries = self.entries.clone();
        for entry in &entries {
            match self.register(buffer, entry.symbol.pattern(), &entry.style, renderer) {
                Ok(true) => done.push(entry.symbol.pattern().clone()),
                Ok(false) => {}
                Err(e) => {
                    warn!(%buffer, error = %e, "rehighlight failed, rolling back");
                    for pattern in &done {
                        self.unregister(buffer, pattern, renderer);
                    }
                    return Err(e);
                }
            }
        }
        if !done.is_empty() {
            renderer.refresh(buffer);
        }
        Ok(done.len())
    }

    /// Make `symbol` the buffer's transient highlight.
    ///
    /// Explicitly highlighted symbols are left alone.
    pub fn set_transient<R: Renderer>(
        &mut self,
        buffer: BufferId,
        symbol: Symbol,
        renderer: &mut R,
    ) -> Result<()> {
        if self.is_highlighted(&symbol) || self.transient.get(&buffer) == Some(&symbol) {
            return Ok(());
        }
        self.clear_transient(buffer, renderer);
        self.register(buffer, symbol.pattern(), &Style::TRANSIENT, renderer)?;
        renderer.refresh(buffer);
        debug!(symbol = symbol.text(), %buffer, "transient highlight");
        self.transient.insert(buffer, symbol);
        Ok(())
    }

    /// Drop the buffer's transient highlight, returning it
    pub fn clear_transient<R: Renderer>(&mut self, buffer: BufferId, renderer: &mut R) -> Option<Symbol> {
        let symbol = self.transient.remove(&buffer)?;
        if !self.is_highlighted(&symbol) {
            self.unregister(buffer, symbol.pattern(), renderer);
            renderer.refresh(buffer);
        }
        debug!(symbol = symbol.text(), %buffer, "transient cleared");
        Some(symbol)
    }

    /// Forget a closed buffer
    pub fn forget_buffer(&mut self, buffer: BufferId) {
        self.registered.remove(&buffer);
        self.transient.remove(&buffer);
    }

    fn buffers_with(&self, pattern: &SymbolPattern) -> Vec<BufferId> {
        let mut buffers: Vec<BufferId> = self
            .registered
            .iter()
            .filter(|(_, keys)| keys.contains(pattern.as_str()))
            .map(|(b, _)| *b)
            .collect();
        buffers.sort();
        buffers
    }

    /// Returns false if the pattern was already registered in the buffer
    fn register<R: Renderer>(
        &mut self,
        buffer: BufferId,
        pattern: &SymbolPattern,
        style: &Style,
        renderer: &mut R,
    ) -> Result<bool> {
        let keys = self.registered.entry(buffer).or_default();
        if keys.contains(pattern.as_str()) {
            return Ok(false);
        }
        renderer.register_highlight(buffer, pattern, style)?;
        keys.insert(pattern.as_str().to_string());
        Ok(true)
    }

    fn unregister<R: Renderer>(&mut self, buffer: BufferId, pattern: &SymbolPattern, renderer: &mut R) {
        if let Some(keys) = self.registered.get_mut(&buffer) {
            if keys.remove(pattern.as_str()) {
                renderer.unregister_highlight(buffer, pattern);
            }
        }
    }
}
