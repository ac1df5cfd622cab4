//! Text and cursor access
//!
//! The highlighting core never owns buffer text. It reads text and moves
//! the cursor through [`TextView`], which the host editor implements. The
//! searching helpers are provided in terms of the required methods; hosts
//! with their own search machinery may override them.

use std::fmt;
use std::ops::Range;

use crate::error::Result;
use crate::symbol::{SymbolPattern, SymbolSyntax};

/// Identifies an open buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The symbol text under the cursor and where it sits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSpan {
    pub text: String,
    pub range: Range<usize>,
}

/// Text/cursor collaborator. Offsets are byte offsets on char boundaries.
pub trait TextView {
    /// All open buffers
    fn buffer_ids(&self) -> Vec<BufferId>;

    /// The buffer commands act on
    fn current_buffer(&self) -> BufferId;

    fn text(&self, buffer: BufferId) -> Result<&str>;

    fn cursor(&self, buffer: BufferId) -> Result<usize>;

    fn set_cursor(&mut self, buffer: BufferId, offset: usize) -> Result<()>;

    /// Replace a range of text. The cursor is left wherever the host puts it.
    fn replace_range(&mut self, buffer: BufferId, range: Range<usize>, replacement: &str)
        -> Result<()>;

    /// Accessible region of the buffer
    fn bounds(&self, buffer: BufferId) -> Result<Range<usize>> {
        Ok(0..self.text(buffer)?.len())
    }

    /// Symbol under (or just before) the cursor
    fn symbol_at_cursor(&self, buffer: BufferId, syntax: &SymbolSyntax) -> Result<Option<SymbolSpan>> {
        let text = self.text(buffer)?;
        let cursor = self.cursor(buffer)?;
        Ok(syntax.span_at(text, cursor).map(|range| SymbolSpan {
            text: text[range.clone()].to_string(),
            range,
        }))
    }

    /// First match starting at or after `from`, within `scope`
    fn search_forward(
        &self,
        buffer: BufferId,
        pattern: &SymbolPattern,
        from: usize,
        scope: Range<usize>,
    ) -> Result<Option<Range<usize>>> {
        let text = self.text(buffer)?;
        Ok(pattern.find_forward(text, from.max(scope.start), scope.end))
    }

    /// Last match ending at or before `from`, within `scope`
    fn search_backward(
        &self,
        buffer: BufferId,
        pattern: &SymbolPattern,
        from: usize,
        scope: Range<usize>,
    ) -> Result<Option<Range<usize>>> {
        let text = self.text(buffer)?;
        Ok(pattern.find_backward(text, from.min(scope.end), scope.start))
    }

    /// Extent of the top-level form around `offset`.
    ///
    /// Hosts without a notion of functions get the whole buffer.
    fn defun_range(&self, buffer: BufferId, _offset: usize) -> Result<Range<usize>> {
        self.bounds(buffer)
    }
}
