//! Occurrence navigation
//!
//! Jumps cycle through the occurrences of a symbol, wrapping at the ends of
//! the search range. The cursor keeps its position relative to the
//! occurrence it started in, so jumping from the second character of one
//! occurrence lands on the second character of the next.
//!
//! The last resolved symbol is remembered, which lets repeated jumps carry on
//! after the cursor was moved off the symbol, and lets forced jumps ignore
//! whatever is under the cursor.

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use crate::error::{HighlightError, Result};
use crate::symbol::{Symbol, SymbolMatcher};
use crate::text::{BufferId, TextView};

/// Command identity recorded by every jump
pub const JUMP_COMMAND: &str = "highlight-symbol-jump";

/// Maximum number of positions kept in the mark ring
const MARK_RING_MAX: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn wrap_notice(self) -> &'static str {
        match self {
            Direction::Forward => "Continued from beginning of buffer",
            Direction::Backward => "Continued from end of buffer",
        }
    }
}

/// Which symbol a jump follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolve {
    /// The symbol at the cursor, falling back to the last one
    AtCursor,
    /// Always the last symbol jumped to
    Last,
}

/// Where a jump may land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Buffer,
    /// The top-level form around the cursor
    Defun,
}

/// A saved cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub buffer: BufferId,
    pub offset: usize,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.buffer, self.offset)
    }
}

/// What a successful jump did
#[derive(Debug, Clone)]
pub struct Jump {
    pub symbol: Symbol,
    pub direction: Direction,
    /// Final cursor offset
    pub target: usize,
    /// The search ran off the end of the range and restarted at the other end
    pub wrapped: bool,
}

impl Jump {
    /// "Continued from ..." notice, if the jump wrapped
    pub fn wrap_notice(&self) -> Option<&'static str> {
        self.wrapped.then(|| self.direction.wrap_notice())
    }
}

/// The last symbol searched for and where the cursor sat inside it
#[derive(Debug, Clone)]
struct LastSearch {
    symbol: Symbol,
    /// Cursor offset from the start of the occurrence
    inner: usize,
}

/// Navigation state shared by all buffers
#[derive(Debug, Default)]
pub struct Navigator {
    last: Option<LastSearch>,
    marks: VecDeque<Mark>,
    last_command: Option<String>,
    /// A jump ran since the host last reported a finished command
    jumped: bool,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbol of the most recent jump
    pub fn last_symbol(&self) -> Option<&Symbol> {
        self.last.as_ref().map(|l| &l.symbol)
    }

    /// True if the last completed command was a jump
    pub fn last_was_jump(&self) -> bool {
        self.last_command.as_deref() == Some(JUMP_COMMAND)
    }

    /// Record the identity of a command the host just finished.
    ///
    /// The first report after a jump belongs to that jump, whatever name
    /// the host gives its command.
    pub fn command_completed(&mut self, command: &str) {
        if std::mem::take(&mut self.jumped) {
            self.last_command = Some(JUMP_COMMAND.to_string());
        } else {
            self.last_command = Some(command.to_string());
        }
    }

    pub fn marks(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter().rev()
    }

    /// Remove and return the most recent mark
    pub fn pop_mark(&mut self) -> Option<Mark> {
        self.marks.pop_back()
    }

    fn push_mark(&mut self, mark: Mark) {
        self.marks.push_back(mark);
        if self.marks.len() > MARK_RING_MAX {
            self.marks.pop_front();
        }
    }

    /// Move the cursor of the current buffer to the next occurrence.
    ///
    /// On failure the cursor and the navigation state are left untouched.
    pub fn jump<V: TextView>(
        &mut self,
        view: &mut V,
        matcher: &SymbolMatcher,
        direction: Direction,
        resolve: Resolve,
        scope: Scope,
    ) -> Result<Jump> {
        let buffer = view.current_buffer();
        let cursor = view.cursor(buffer)?;

        let fresh = match resolve {
            Resolve::AtCursor => view
                .symbol_at_cursor(buffer, matcher.syntax())?
                .and_then(|span| matcher.symbol_for(&span.text)),
            Resolve::Last => None,
        };
        let symbol = match (fresh, &self.last) {
            (Some(symbol), _) => symbol,
            (None, Some(last)) => last.symbol.clone(),
            (None, None) => return Err(HighlightError::NoSymbolAtCursor),
        };

        // Step off the occurrence under the cursor, or search from the
        // cursor with the remembered position inside the occurrence
        let on_symbol = view
            .symbol_at_cursor(buffer, matcher.syntax())?
            .filter(|span| span.text == symbol.text());
        let (origin, inner) = match on_symbol {
            Some(span) => {
                let origin = match direction {
                    Direction::Forward => span.range.end,
                    Direction::Backward => span.range.start,
                };
                (origin, cursor - span.range.start)
            }
            None => {
                let inner = self
                    .last
                    .as_ref()
                    .filter(|l| l.symbol == symbol)
                    .map_or(0, |l| l.inner);
                (cursor, inner)
            }
        };

        let range = match scope {
            Scope::Buffer => view.bounds(buffer)?,
            Scope::Defun => view.defun_range(buffer, cursor)?,
        };

        let pattern = symbol.pattern();
        let search = |view: &V, from: usize| match direction {
            Direction::Forward => view.search_forward(buffer, pattern, from, range.clone()),
            Direction::Backward => view.search_backward(buffer, pattern, from, range.clone()),
        };

        let mut wrapped = false;
        let mut found = search(&*view, origin)?;
        if found.is_none() {
            wrapped = true;
            let restart = match direction {
                Direction::Forward => range.start,
                Direction::Backward => range.end,
            };
            found = search(&*view, restart)?;
        }
        let Some(found) = found else {
            return Err(HighlightError::SymbolNotFound(symbol.text().to_string()));
        };

        let target = (found.start + inner)
            .min(found.end)
            .clamp(range.start, range.end);
        view.set_cursor(buffer, target)?;

        if !self.last_was_jump() {
            self.push_mark(Mark {
                buffer,
                offset: cursor,
            });
        }
        debug!(symbol = symbol.text(), from = cursor, to = target, wrapped, "jump");

        self.last = Some(LastSearch {
            symbol: symbol.clone(),
            inner,
        });
        self.last_command = Some(JUMP_COMMAND.to_string());
        self.jumped = true;

        Ok(Jump {
            symbol,
            direction,
            target,
            wrapped,
        })
    }
}
