//! In-memory buffers
//!
//! A plain text model implementing [`TextView`], used by the `hisym`
//! binary and by tests. Editors embedding the core implement [`TextView`]
//! over their own buffers instead.

use std::ops::Range;
use std::path::Path;

use unicode_width::UnicodeWidthStr;

use crate::error::{HighlightError, Result};
use crate::text::{BufferId, TextView};

/// A buffer containing text and a cursor
#[derive(Debug, Clone)]
pub struct Buffer {
    /// Full text content
    text: String,
    /// Buffer name (e.g., "main.rs", "*scratch*")
    name: String,
    /// Cursor byte offset
    cursor: usize,
}

impl Buffer {
    /// Create a buffer with the given name and contents
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            name: name.into(),
            cursor: 0,
        }
    }

    /// Create a buffer from file contents
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        Ok(Self::new(name, content))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, clamped to the text and snapped to a char boundary
    pub fn set_cursor(&mut self, offset: usize) {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        self.cursor = offset;
    }

    /// Replace a byte range, keeping the cursor on the same text
    pub fn replace_range(&mut self, range: Range<usize>, replacement: &str) -> Result<()> {
        if range.start > range.end
            || range.end > self.text.len()
            || !self.text.is_char_boundary(range.start)
            || !self.text.is_char_boundary(range.end)
        {
            return Err(HighlightError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }

        let removed = range.end - range.start;
        self.text.replace_range(range.clone(), replacement);

        if self.cursor >= range.end {
            self.cursor = self.cursor - removed + replacement.len();
        } else if self.cursor > range.start {
            self.cursor = range.start;
        }
        Ok(())
    }

    /// 1-based line number and 0-based display column of an offset
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let before = &self.text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        (line, before[line_start..].width())
    }

    /// `name:line:column` of an offset, columns counted from 1
    pub fn position(&self, offset: usize) -> String {
        let (line, col) = self.line_col(offset);
        format!("{}:{}:{}", self.name, line, col + 1)
    }

    /// Extent of the top-level form containing `offset`.
    ///
    /// A top-level form starts on a line whose first character is in column
    /// 0 and is neither whitespace nor a closing bracket, and runs up to the
    /// next such line.
    pub fn defun_range(&self, offset: usize) -> Range<usize> {
        let offset = offset.min(self.text.len());
        let mut start = 0;
        let mut end = self.text.len();

        let mut line_start = 0;
        for line in self.text.split_inclusive('\n') {
            let opens_form = line
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace() && !matches!(c, '}' | ')' | ']'));
            if opens_form {
                if line_start <= offset {
                    start = line_start;
                } else {
                    end = line_start;
                    break;
                }
            }
            line_start += line.len();
        }

        start..end
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new("*scratch*", "")
    }
}

/// All open buffers plus the current one
#[derive(Debug, Default)]
pub struct Workspace {
    buffers: Vec<Buffer>,
    current: usize,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a buffer and make it current
    pub fn add(&mut self, buffer: Buffer) -> BufferId {
        self.buffers.push(buffer);
        self.current = self.buffers.len() - 1;
        BufferId(self.current)
    }

    /// Open a file in a new buffer
    pub fn open_file(&mut self, path: &Path) -> Result<BufferId> {
        let buffer = Buffer::from_file(path)?;
        Ok(self.add(buffer))
    }

    pub fn switch_to(&mut self, id: BufferId) -> Result<()> {
        if id.0 >= self.buffers.len() {
            return Err(HighlightError::NoSuchBuffer(id.0));
        }
        self.current = id.0;
        Ok(())
    }

    pub fn buffer(&self, id: BufferId) -> Result<&Buffer> {
        self.buffers.get(id.0).ok_or(HighlightError::NoSuchBuffer(id.0))
    }

    pub fn buffer_mut(&mut self, id: BufferId) -> Result<&mut Buffer> {
        self.buffers
            .get_mut(id.0)
            .ok_or(HighlightError::NoSuchBuffer(id.0))
    }
}

impl TextView for Workspace {
    fn buffer_ids(&self) -> Vec<BufferId> {
        (0..self.buffers.len()).map(BufferId).collect()
    }

    fn current_buffer(&self) -> BufferId {
        BufferId(self.current)
    }

    fn text(&self, buffer: BufferId) -> Result<&str> {
        Ok(self.buffer(buffer)?.text())
    }

    fn cursor(&self, buffer: BufferId) -> Result<usize> {
        Ok(self.buffer(buffer)?.cursor())
    }

    fn set_cursor(&mut self, buffer: BufferId, offset: usize) -> Result<()> {
        self.buffer_mut(buffer)?.set_cursor(offset);
        Ok(())
    }

    fn replace_range(
        &mut self,
        buffer: BufferId,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<()> {
        self.buffer_mut(buffer)?.replace_range(range, replacement)
    }

    fn defun_range(&self, buffer: BufferId, offset: usize) -> Result<Range<usize>> {
        Ok(self.buffer(buffer)?.defun_range(offset))
    }
}
