//! Highlight session
//!
//! [`HighlightSymbol`] is the service object a host creates once. It owns
//! the highlight state and the host's collaborators, exposes the user
//! commands, and takes the host's events (buffer opened, command completed,
//! idle timer fired) through explicit entry points.
//!
//! Commands that fail leave state untouched and return the error; the host
//! shows it in its message area. Informational output ("Occurrence 2/3 in
//! buffer", wrap notices) is queued and collected with
//! [`HighlightSymbol::take_messages`].

use std::ops::Range;
use std::time::Duration;

use tracing::{debug, warn};

use crate::color::{ColorAssigner, Style};
use crate::config::{Config, MessageMode};
use crate::error::{HighlightError, Result};
use crate::navigation::{Direction, Mark, Navigator, Resolve, Scope};
use crate::occurrence::{self, OccurLine, Occurrence};
use crate::registry::{HighlightRegistry, Renderer};
use crate::symbol::{Symbol, SymbolMatcher};
use crate::text::{BufferId, TextView};
use crate::timer::Scheduler;
use crate::transient::TransientController;

/// Symbol highlighting for one host
pub struct HighlightSymbol<V, R, S> {
    config: Config,
    matcher: SymbolMatcher,
    colors: ColorAssigner,
    registry: HighlightRegistry,
    navigator: Navigator,
    transient: TransientController,
    messages: Vec<String>,
    view: V,
    renderer: R,
    scheduler: S,
}

impl<V: TextView, R: Renderer, S: Scheduler> HighlightSymbol<V, R, S> {
    /// Build a session; fails on invalid ignore rules or colors
    pub fn new(config: Config, view: V, renderer: R, scheduler: S) -> Result<Self> {
        let matcher = SymbolMatcher::from_config(&config)?;
        let colors = ColorAssigner::from_config(&config)?;
        let transient = TransientController::from_config(&config);
        Ok(Self {
            config,
            matcher,
            colors,
            registry: HighlightRegistry::new(),
            navigator: Navigator::new(),
            transient,
            messages: Vec::new(),
            view,
            renderer,
            scheduler,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn matcher(&self) -> &SymbolMatcher {
        &self.matcher
    }

    pub fn registry(&self) -> &HighlightRegistry {
        &self.registry
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn transient(&self) -> &TransientController {
        &self.transient
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Drain queued messages, oldest first
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    fn message(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        debug!(%msg, "message");
        self.messages.push(msg);
    }

    /// The symbol under the cursor of the current buffer
    fn symbol_at_point(&self) -> Result<(BufferId, Symbol, Range<usize>)> {
        let buffer = self.view.current_buffer();
        let span = self
            .view
            .symbol_at_cursor(buffer, self.matcher.syntax())?
            .ok_or(HighlightError::NoSymbolAtCursor)?;
        let symbol = self
            .matcher
            .symbol_for(&span.text)
            .ok_or(HighlightError::NoSymbolAtCursor)?;
        Ok((buffer, symbol, span.range))
    }

    fn occurrence_at_cursor(&self, buffer: BufferId, symbol: &Symbol) -> Result<Occurrence> {
        let text = self.view.text(buffer)?;
        let cursor = self.view.cursor(buffer)?;
        Ok(Occurrence::at(symbol.pattern(), text, cursor))
    }

    // ---------------------------------------------------------------
    // Explicit highlights
    // ---------------------------------------------------------------

    /// Toggle the highlight of the symbol at point in every buffer.
    ///
    /// Returns whether the symbol is highlighted afterwards.
    pub fn toggle_highlight(&mut self) -> Result<bool> {
        let (_, symbol, _) = self.symbol_at_point()?;
        self.toggle(symbol)
    }

    /// Toggle the highlight of a literal symbol, wherever the cursor is
    pub fn toggle_symbol(&mut self, text: &str) -> Result<bool> {
        let symbol = self
            .matcher
            .symbol_for(text)
            .ok_or(HighlightError::NoSymbolAtCursor)?;
        self.toggle(symbol)
    }

    fn toggle(&mut self, symbol: Symbol) -> Result<bool> {
        let buffers = self.view.buffer_ids();
        let highlighted = self.registry.toggle(
            symbol.clone(),
            &buffers,
            &mut self.colors,
            &mut self.renderer,
        )?;
        if highlighted && self.config.message_enabled(MessageMode::Explicit) {
            // The highlight is in place; a missing report is not a failure
            match self.occurrence_at_cursor(self.view.current_buffer(), &symbol) {
                Ok(report) => self.message(report.to_string()),
                Err(e) => warn!(symbol = symbol.text(), "no occurrence report: {}", e),
            }
        }
        Ok(highlighted)
    }

    pub fn remove_all_highlights(&mut self) {
        self.registry.remove_all(&mut self.renderer);
    }

    /// (symbol, style) for every explicit highlight, oldest first
    pub fn list_highlighted(&self) -> Vec<(String, Style)> {
        self.registry.list_all()
    }

    /// Report the rank and count of the symbol at point
    pub fn report_occurrence(&mut self) -> Result<Occurrence> {
        let (buffer, symbol, _) = self.symbol_at_point()?;
        let report = self.occurrence_at_cursor(buffer, &symbol)?;
        self.message(report.to_string());
        Ok(report)
    }

    /// Every line of the current buffer containing the symbol at point
    pub fn occur(&self) -> Result<Vec<OccurLine>> {
        let (buffer, symbol, _) = self.symbol_at_point()?;
        Ok(occurrence::occur(symbol.pattern(), self.view.text(buffer)?))
    }

    // ---------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------

    pub fn jump_next(&mut self) -> Result<usize> {
        self.jump(Direction::Forward, Resolve::AtCursor, Scope::Buffer)
    }

    pub fn jump_previous(&mut self) -> Result<usize> {
        self.jump(Direction::Backward, Resolve::AtCursor, Scope::Buffer)
    }

    /// Jump to the next occurrence of the last symbol jumped to
    pub fn jump_next_force(&mut self) -> Result<usize> {
        self.jump(Direction::Forward, Resolve::Last, Scope::Buffer)
    }

    pub fn jump_previous_force(&mut self) -> Result<usize> {
        self.jump(Direction::Backward, Resolve::Last, Scope::Buffer)
    }

    /// Jump within the enclosing top-level form
    pub fn jump_next_in_scope(&mut self) -> Result<usize> {
        self.jump(Direction::Forward, Resolve::AtCursor, Scope::Defun)
    }

    pub fn jump_previous_in_scope(&mut self) -> Result<usize> {
        self.jump(Direction::Backward, Resolve::AtCursor, Scope::Defun)
    }

    fn jump(&mut self, direction: Direction, resolve: Resolve, scope: Scope) -> Result<usize> {
        let jump = self
            .navigator
            .jump(&mut self.view, &self.matcher, direction, resolve, scope)?;

        if self.config.message_enabled(MessageMode::Navigation) {
            let report = self.occurrence_at_cursor(self.view.current_buffer(), &jump.symbol)?;
            self.message(report.to_string());
        } else if let Some(notice) = jump.wrap_notice() {
            self.message(notice);
        }
        Ok(jump.target)
    }

    /// Return to the position saved before the last run of jumps
    pub fn pop_mark(&mut self) -> Result<Option<Mark>> {
        let Some(mark) = self.navigator.pop_mark() else {
            return Ok(None);
        };
        self.view.set_cursor(mark.buffer, mark.offset)?;
        Ok(Some(mark))
    }

    // ---------------------------------------------------------------
    // Replacement
    // ---------------------------------------------------------------

    /// Replace the symbol at point, from its current occurrence to the end
    /// of the buffer.
    ///
    /// The cursor ends up at the start of the first replacement. A
    /// highlighted symbol stays highlighted under its new name. Returns the
    /// number of replacements.
    pub fn replace_symbol_interactive(&mut self, replacement: &str) -> Result<usize> {
        let (buffer, symbol, span) = self.symbol_at_point()?;

        let matches = {
            let text = self.view.text(buffer)?;
            let mut matches = Vec::new();
            let mut pos = span.start;
            while let Some(m) = symbol.pattern().find_forward(text, pos, text.len()) {
                pos = m.end;
                matches.push(m);
            }
            matches
        };
        // Back to front so earlier ranges stay valid
        for range in matches.iter().rev() {
            self.view.replace_range(buffer, range.clone(), replacement)?;
        }
        self.view.set_cursor(buffer, span.start)?;

        if self.registry.transient(buffer) == Some(&symbol) {
            self.registry.clear_transient(buffer, &mut self.renderer);
        }
        if self.registry.remove(&symbol, &mut self.renderer) {
            if let Some(renamed) = self.matcher.symbol_for(replacement) {
                if !self.registry.is_highlighted(&renamed) {
                    let buffers = self.view.buffer_ids();
                    self.registry
                        .add(renamed, &buffers, &mut self.colors, &mut self.renderer)?;
                }
            }
        }

        let count = matches.len();
        debug!(symbol = symbol.text(), replacement, count, "replaced");
        self.message(format!(
            "Replaced {} occurrence{}",
            count,
            if count == 1 { "" } else { "s" }
        ));
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Highlight mode
    // ---------------------------------------------------------------

    /// Turn on transient highlighting in a buffer
    pub fn enable_mode(&mut self, buffer: BufferId) -> Result<()> {
        self.transient.enable(buffer, &mut self.scheduler)
    }

    pub fn disable_mode(&mut self, buffer: BufferId) {
        self.transient.disable(
            buffer,
            &mut self.registry,
            &mut self.renderer,
            &mut self.scheduler,
        );
    }

    pub fn set_idle_delay(&mut self, delay: Duration) -> Result<()> {
        self.transient.set_idle_delay(delay, &mut self.scheduler)?;
        self.config.idle_delay = delay.as_secs_f64();
        Ok(())
    }

    // ---------------------------------------------------------------
    // Host events
    // ---------------------------------------------------------------

    /// A buffer became visible: show the existing highlights in it
    pub fn on_buffer_opened(&mut self, buffer: BufferId) -> Result<usize> {
        self.registry.rehighlight(buffer, &mut self.renderer)
    }

    pub fn on_buffer_closed(&mut self, buffer: BufferId) {
        self.registry.forget_buffer(buffer);
        self.transient.forget_buffer(buffer, &mut self.scheduler);
    }

    /// A command finished; `command` is its name
    pub fn on_command_completed(&mut self, command: &str) -> Result<()> {
        self.navigator.command_completed(command);
        let report = self.transient.on_command(
            &self.view,
            &self.matcher,
            &mut self.registry,
            &mut self.renderer,
            self.navigator.last_was_jump(),
        )?;
        self.report_transient(report);
        Ok(())
    }

    /// The idle timer fired
    pub fn on_idle(&mut self) -> Result<()> {
        let report = self.transient.on_idle(
            &self.view,
            &self.matcher,
            &mut self.registry,
            &mut self.renderer,
        )?;
        self.report_transient(report);
        Ok(())
    }

    fn report_transient(&mut self, report: Option<Occurrence>) {
        if let Some(report) = report {
            if self.config.message_enabled(MessageMode::Transient) {
                self.message(report.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Buffer, Workspace};
    use crate::display::KeywordTable;
    use crate::navigation::JUMP_COMMAND;
    use crate::symbol::SymbolPattern;
    use crate::timer::PolledScheduler;

    type Session = HighlightSymbol<Workspace, KeywordTable, PolledScheduler>;

    fn session_with(config: Config, texts: &[&str]) -> Session {
        let mut workspace = Workspace::new();
        for (i, text) in texts.iter().enumerate() {
            workspace.add(Buffer::new(format!("b{}", i), *text));
        }
        workspace.switch_to(BufferId(0)).unwrap();
        HighlightSymbol::new(config, workspace, KeywordTable::new(), PolledScheduler::new()).unwrap()
    }

    fn session(texts: &[&str]) -> Session {
        session_with(Config::default(), texts)
    }

    fn at(session: &mut Session, offset: usize) {
        let buffer = session.view().current_buffer();
        session.view_mut().set_cursor(buffer, offset).unwrap();
    }

    fn pattern(raw: &str) -> SymbolPattern {
        SymbolMatcher::default().pattern_for(raw).unwrap()
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut s = session(&["foo bar foo", "foo"]);
        at(&mut s, 1);

        assert!(s.toggle_highlight().unwrap());
        assert_eq!(s.renderer().patterns(BufferId(0)), vec![r"\_<foo\_>"]);
        assert_eq!(s.renderer().patterns(BufferId(1)), vec![r"\_<foo\_>"]);
        assert_eq!(s.take_messages(), vec!["Occurrence 1/2 in buffer"]);

        assert!(!s.toggle_highlight().unwrap());
        assert!(s.registry().is_empty());
        assert!(s.renderer().patterns(BufferId(0)).is_empty());
        assert!(s.renderer().patterns(BufferId(1)).is_empty());
        assert!(s.take_messages().is_empty());
    }

    #[test]
    fn test_ignored_symbol_is_no_symbol() {
        let config = Config {
            ignore: vec!["^TODO$".to_string()],
            ..Config::default()
        };
        let mut s = session_with(config, &["// TODO fix"]);
        at(&mut s, 4);

        assert!(matches!(s.toggle_highlight(), Err(HighlightError::NoSymbolAtCursor)));
        assert!(matches!(s.toggle_symbol("TODO"), Err(HighlightError::NoSymbolAtCursor)));
        assert!(matches!(s.jump_next(), Err(HighlightError::NoSymbolAtCursor)));
        assert!(s.registry().is_empty());
    }

    #[test]
    fn test_toggle_without_symbol() {
        let mut s = session(&["foo  bar"]);
        at(&mut s, 4);
        assert!(matches!(s.toggle_highlight(), Err(HighlightError::NoSymbolAtCursor)));
        assert_eq!(
            HighlightError::NoSymbolAtCursor.to_string(),
            "No symbol at point"
        );
    }

    #[test]
    fn test_explicit_replaces_transient() {
        let mut s = session(&["foo bar foo"]);
        s.enable_mode(BufferId(0)).unwrap();
        at(&mut s, 0);
        s.on_idle().unwrap();
        assert_eq!(s.registry().transient(BufferId(0)).map(|t| t.text()), Some("foo"));

        s.toggle_highlight().unwrap();
        assert_eq!(s.registry().transient(BufferId(0)), None);
        assert_eq!(s.renderer().registration_count(BufferId(0), &pattern("foo")), 1);
    }

    #[test]
    fn test_rehighlight_on_open() {
        let mut s = session(&["foo bar"]);
        s.toggle_symbol("foo").unwrap();
        s.toggle_symbol("bar").unwrap();

        let opened = s.view_mut().add(Buffer::new("new", "bar foo"));
        assert_eq!(s.on_buffer_opened(opened).unwrap(), 2);
        assert_eq!(s.on_buffer_opened(opened).unwrap(), 0);
        assert_eq!(s.renderer().registration_count(opened, &pattern("foo")), 1);
        assert_eq!(s.renderer().registration_count(opened, &pattern("bar")), 1);
    }

    #[test]
    fn test_list_highlighted() {
        let mut s = session(&["a.b c"]);
        s.toggle_symbol("a.b").unwrap();
        s.toggle_symbol("c").unwrap();

        let names: Vec<String> = s.list_highlighted().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a.b", "c"]);

        s.remove_all_highlights();
        assert!(s.list_highlighted().is_empty());
    }

    #[test]
    fn test_palette_and_foreground_from_config() {
        let config = Config {
            colors: vec!["yellow".to_string(), "cyan".to_string()],
            foreground_color: Some("".to_string()),
            ..Config::default()
        };
        let mut s = session_with(config, &["a b c"]);
        s.toggle_symbol("a").unwrap();
        s.toggle_symbol("b").unwrap();
        s.toggle_symbol("c").unwrap();

        let styles: Vec<String> = s.list_highlighted().iter().map(|(_, st)| st.to_string()).collect();
        assert_eq!(styles, vec!["on #ffff00", "on #00ffff", "on #ffff00"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_ignore = Config {
            ignore: vec!["(".to_string()],
            ..Config::default()
        };
        assert!(matches!(
            HighlightSymbol::new(bad_ignore, Workspace::new(), KeywordTable::new(), PolledScheduler::new()),
            Err(HighlightError::InvalidPattern(_))
        ));

        let bad_color = Config {
            colors: vec!["no-such-color".to_string()],
            ..Config::default()
        };
        assert!(matches!(
            HighlightSymbol::new(bad_color, Workspace::new(), KeywordTable::new(), PolledScheduler::new()),
            Err(HighlightError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_report_occurrence() {
        let mut s = session(&["foo foo bar foo"]);
        at(&mut s, 5);
        assert_eq!(s.report_occurrence().unwrap(), Occurrence { rank: 2, count: 3 });
        assert_eq!(s.take_messages(), vec!["Occurrence 2/3 in buffer"]);
    }

    #[test]
    fn test_jump_wrap_notice() {
        let text = format!("{}foo{}foo{}", " ".repeat(5), " ".repeat(32), " ".repeat(7));
        let mut s = session(&[text.as_str()]);
        at(&mut s, 40);

        assert_eq!(s.jump_next().unwrap(), 5);
        assert_eq!(s.take_messages(), vec!["Continued from beginning of buffer"]);

        assert_eq!(s.jump_next().unwrap(), 40);
        assert!(s.take_messages().is_empty());

        assert_eq!(s.jump_previous().unwrap(), 5);
        assert_eq!(s.jump_previous().unwrap(), 40);
        assert_eq!(s.take_messages(), vec!["Continued from end of buffer"]);
    }

    #[test]
    fn test_jump_occurrence_message() {
        let config = Config {
            occurrence_message: vec![MessageMode::Navigation],
            ..Config::default()
        };
        let text = format!("{}foo{}foo{}", " ".repeat(5), " ".repeat(32), " ".repeat(7));
        let mut s = session_with(config, &[text.as_str()]);
        at(&mut s, 40);

        s.jump_next().unwrap();
        assert_eq!(s.take_messages(), vec!["Occurrence 1/2 in buffer"]);
        s.jump_next().unwrap();
        assert_eq!(s.take_messages(), vec!["Occurrence 2/2 in buffer"]);
    }

    #[test]
    fn test_force_and_scoped_jumps() {
        let text = "fn a() {\n    x(y);\n    x(y);\n}\nfn b() {\n    x(y);\n}\n";
        let mut s = session(&[text]);
        let xs: Vec<usize> = text.match_indices('x').map(|(i, _)| i).collect();

        at(&mut s, xs[0]);
        assert_eq!(s.jump_next().unwrap(), xs[1]);
        // On `y`, forcing keeps following `x`
        at(&mut s, xs[1] + 2);
        assert_eq!(s.jump_next_force().unwrap(), xs[2]);
        assert_eq!(s.jump_previous_force().unwrap(), xs[1]);

        assert_eq!(s.jump_next_in_scope().unwrap(), xs[0]);
        assert_eq!(s.jump_previous_in_scope().unwrap(), xs[1]);
    }

    #[test]
    fn test_pop_mark() {
        let mut s = session(&["foo bar foo bar foo"]);
        at(&mut s, 0);
        s.jump_next().unwrap();
        s.jump_next().unwrap();

        let mark = s.pop_mark().unwrap().unwrap();
        assert_eq!(mark.offset, 0);
        assert_eq!(s.view().cursor(BufferId(0)).unwrap(), 0);
        assert_eq!(s.pop_mark().unwrap(), None);
    }

    #[test]
    fn test_replace_symbol() {
        let mut s = session(&["foo foobar foo"]);
        at(&mut s, 0);
        assert_eq!(s.replace_symbol_interactive("bar").unwrap(), 2);
        assert_eq!(s.view().text(BufferId(0)).unwrap(), "bar foobar bar");
        assert_eq!(s.view().cursor(BufferId(0)).unwrap(), 0);
        assert_eq!(s.take_messages(), vec!["Replaced 2 occurrences"]);
    }

    #[test]
    fn test_replace_from_current_occurrence() {
        let mut s = session(&["foo x foo x foo"]);
        at(&mut s, 7);
        assert_eq!(s.replace_symbol_interactive("baz").unwrap(), 2);
        assert_eq!(s.view().text(BufferId(0)).unwrap(), "foo x baz x baz");
        assert_eq!(s.view().cursor(BufferId(0)).unwrap(), 6);
    }

    #[test]
    fn test_replace_keeps_highlight() {
        let mut s = session(&["foo foo"]);
        at(&mut s, 0);
        s.toggle_highlight().unwrap();
        s.replace_symbol_interactive("qux").unwrap();

        let names: Vec<String> = s.list_highlighted().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["qux"]);
        assert_eq!(s.renderer().patterns(BufferId(0)), vec![r"\_<qux\_>"]);
    }

    #[test]
    fn test_occur() {
        let mut s = session(&["foo\nbar\nfoo bar\n"]);
        at(&mut s, 0);
        let lines: Vec<usize> = s.occur().unwrap().into_iter().map(|l| l.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn test_highlight_on_navigation() {
        let config = Config {
            highlight_on_navigation: true,
            occurrence_message: vec![MessageMode::Transient],
            ..Config::default()
        };
        let mut s = session_with(config, &["foo bar foo"]);
        s.enable_mode(BufferId(0)).unwrap();
        at(&mut s, 0);

        s.jump_next().unwrap();
        s.on_command_completed(JUMP_COMMAND).unwrap();
        assert_eq!(s.registry().transient(BufferId(0)).map(|t| t.text()), Some("foo"));
        assert_eq!(s.take_messages(), vec!["Occurrence 2/2 in buffer"]);

        at(&mut s, 4);
        s.on_command_completed("forward-word").unwrap();
        assert_eq!(s.registry().transient(BufferId(0)), None);
    }

    #[test]
    fn test_highlight_on_navigation_with_host_command_name() {
        let config = Config {
            highlight_on_navigation: true,
            ..Config::default()
        };
        let mut s = session_with(config, &["foo bar foo"]);
        s.enable_mode(BufferId(0)).unwrap();
        at(&mut s, 0);

        s.jump_next().unwrap();
        s.on_command_completed("highlight-symbol-next").unwrap();
        assert_eq!(s.registry().transient(BufferId(0)).map(|t| t.text()), Some("foo"));

        s.jump_next().unwrap();
        s.on_command_completed("highlight-symbol-next").unwrap();
        assert_eq!(s.navigator().marks().count(), 1);
    }

    #[test]
    fn test_toggle_without_current_buffer_still_highlights() {
        let mut s: Session =
            HighlightSymbol::new(Config::default(), Workspace::new(), KeywordTable::new(), PolledScheduler::new())
                .unwrap();
        assert!(s.toggle_symbol("foo").unwrap());
        assert!(s.registry().is_highlighted(&SymbolMatcher::default().symbol_for("foo").unwrap()));
        assert!(s.take_messages().is_empty());
    }

    #[test]
    fn test_mode_and_timer() {
        let mut s = session(&["foo"]);
        s.enable_mode(BufferId(0)).unwrap();
        assert!(s.transient().timer().is_armed());
        assert_eq!(s.scheduler().active_count(), 1);

        s.set_idle_delay(Duration::from_millis(200)).unwrap();
        assert_eq!(s.scheduler().active_count(), 1);
        assert_eq!(s.config().idle_delay, 0.2);

        s.disable_mode(BufferId(0));
        assert_eq!(s.scheduler().active_count(), 0);
    }

    #[test]
    fn test_buffer_closed() {
        let mut s = session(&["foo bar foo"]);
        s.enable_mode(BufferId(0)).unwrap();
        at(&mut s, 0);
        s.on_idle().unwrap();

        s.on_buffer_closed(BufferId(0));
        assert_eq!(s.registry().transient(BufferId(0)), None);
        assert!(!s.transient().is_enabled(BufferId(0)));
        assert_eq!(s.scheduler().active_count(), 0);
    }

    /// Refuses every registration in buffer #1
    #[derive(Default)]
    struct FlakyRenderer {
        table: KeywordTable,
    }

    impl Renderer for FlakyRenderer {
        fn register_highlight(&mut self, buffer: BufferId, pattern: &SymbolPattern, style: &Style) -> Result<()> {
            if buffer == BufferId(1) {
                return Err(HighlightError::Render("no window".to_string()));
            }
            self.table.register_highlight(buffer, pattern, style)
        }

        fn unregister_highlight(&mut self, buffer: BufferId, pattern: &SymbolPattern) {
            self.table.unregister_highlight(buffer, pattern)
        }

        fn refresh(&mut self, buffer: BufferId) {
            self.table.refresh(buffer)
        }
    }

    #[test]
    fn test_failed_toggle_leaves_nothing() {
        let mut workspace = Workspace::new();
        workspace.add(Buffer::new("a", "foo"));
        workspace.add(Buffer::new("b", "foo"));
        workspace.switch_to(BufferId(0)).unwrap();
        let mut s = HighlightSymbol::new(
            Config::default(),
            workspace,
            FlakyRenderer::default(),
            PolledScheduler::new(),
        )
        .unwrap();

        assert!(matches!(s.toggle_highlight(), Err(HighlightError::Render(_))));
        assert!(s.registry().is_empty());
        assert!(s.renderer().table.patterns(BufferId(0)).is_empty());
        assert!(s.take_messages().is_empty());
    }
}
