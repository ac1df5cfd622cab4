//! Transient highlighting
//!
//! With highlight mode on, the symbol under the cursor is highlighted after
//! the editor has been idle for a while, and the highlight goes away once
//! the cursor leaves it. A zero idle delay updates the highlight after every
//! command instead.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::occurrence::{self, Occurrence};
use crate::registry::{HighlightRegistry, Renderer};
use crate::symbol::{Symbol, SymbolMatcher};
use crate::text::{BufferId, TextView};
use crate::timer::{IdleTimer, Scheduler};

/// Per-buffer transient highlight state machine
#[derive(Debug)]
pub struct TransientController {
    enabled: BTreeSet<BufferId>,
    timer: IdleTimer,
    delay: Duration,
    /// Highlight symbols that occur only once
    single_occurrence: bool,
    /// Re-run the idle logic right after a jump
    on_navigation: bool,
}

impl TransientController {
    pub fn new(delay: Duration, single_occurrence: bool, on_navigation: bool) -> Self {
        Self {
            enabled: BTreeSet::new(),
            timer: IdleTimer::new(),
            delay,
            single_occurrence,
            on_navigation,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.idle_delay(),
            config.highlight_single_occurrence,
            config.highlight_on_navigation,
        )
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_enabled(&self, buffer: BufferId) -> bool {
        self.enabled.contains(&buffer)
    }

    pub fn timer(&self) -> &IdleTimer {
        &self.timer
    }

    /// Turn highlight mode on for a buffer
    pub fn enable<S: Scheduler>(&mut self, buffer: BufferId, scheduler: &mut S) -> Result<()> {
        if !self.delay.is_zero() {
            self.timer.ensure_armed(self.delay, scheduler)?;
        }
        self.enabled.insert(buffer);
        debug!(%buffer, "highlight mode on");
        Ok(())
    }

    /// Turn highlight mode off for a buffer, dropping its transient highlight
    pub fn disable<R: Renderer, S: Scheduler>(
        &mut self,
        buffer: BufferId,
        registry: &mut HighlightRegistry,
        renderer: &mut R,
        scheduler: &mut S,
    ) {
        if !self.enabled.remove(&buffer) {
            return;
        }
        registry.clear_transient(buffer, renderer);
        if self.enabled.is_empty() {
            self.timer.disarm(scheduler);
        }
        debug!(%buffer, "highlight mode off");
    }

    /// Change the idle delay, re-arming the timer
    pub fn set_idle_delay<S: Scheduler>(&mut self, delay: Duration, scheduler: &mut S) -> Result<()> {
        self.delay = delay;
        if self.enabled.is_empty() {
            self.timer.disarm(scheduler);
            return Ok(());
        }
        self.timer.rearm(delay, scheduler)
    }

    /// Idle timer fired: highlight the symbol at the cursor.
    ///
    /// Returns the occurrence report when a new transient highlight was set.
    pub fn on_idle<V: TextView, R: Renderer>(
        &mut self,
        view: &V,
        matcher: &SymbolMatcher,
        registry: &mut HighlightRegistry,
        renderer: &mut R,
    ) -> Result<Option<Occurrence>> {
        let buffer = view.current_buffer();
        if !self.is_enabled(buffer) {
            return Ok(None);
        }

        let symbol = symbol_at_cursor(view, buffer, matcher)?;
        if symbol.as_ref() == registry.transient(buffer) {
            return Ok(None);
        }
        if symbol.as_ref().is_some_and(|s| registry.is_highlighted(s)) {
            return Ok(None);
        }

        registry.clear_transient(buffer, renderer);
        let Some(symbol) = symbol else {
            return Ok(None);
        };

        let text = view.text(buffer)?;
        let count = occurrence::count(symbol.pattern(), text);
        if !self.single_occurrence && count <= 1 {
            return Ok(None);
        }

        let report = Occurrence::at(symbol.pattern(), text, view.cursor(buffer)?);
        registry.set_transient(buffer, symbol, renderer)?;
        Ok(Some(report))
    }

    /// A command finished in the current buffer.
    ///
    /// Returns the occurrence report when a new transient highlight was set.
    pub fn on_command<V: TextView, R: Renderer>(
        &mut self,
        view: &V,
        matcher: &SymbolMatcher,
        registry: &mut HighlightRegistry,
        renderer: &mut R,
        after_jump: bool,
    ) -> Result<Option<Occurrence>> {
        let buffer = view.current_buffer();
        if !self.is_enabled(buffer) {
            return Ok(None);
        }
        if self.delay.is_zero() {
            return self.on_idle(view, matcher, registry, renderer);
        }

        if let Some(transient) = registry.transient(buffer) {
            let here = symbol_at_cursor(view, buffer, matcher)?;
            if here.as_ref() != Some(transient) {
                registry.clear_transient(buffer, renderer);
            }
        }

        if after_jump && self.on_navigation {
            return self.on_idle(view, matcher, registry, renderer);
        }
        Ok(None)
    }

    /// Forget a closed buffer
    pub fn forget_buffer<S: Scheduler>(&mut self, buffer: BufferId, scheduler: &mut S) {
        if self.enabled.remove(&buffer) && self.enabled.is_empty() {
            self.timer.disarm(scheduler);
        }
    }
}

fn symbol_at_cursor<V: TextView>(view: &V, buffer: BufferId, matcher: &SymbolMatcher) -> Result<Option<Symbol>> {
    Ok(view
        .symbol_at_cursor(buffer, matcher.syntax())?
        .and_then(|span| matcher.symbol_for(&span.text)))
}
