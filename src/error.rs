//! Error types for hisym

use thiserror::Error;

/// Result type alias for hisym operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlighting and navigation error types
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("No symbol at point")]
    NoSymbolAtCursor,

    /// A wrapped re-search found nothing. Only possible if the buffer
    /// changed between resolving the symbol and searching for it.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Could not write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Renderer error: {0}")]
    Render(String),

    /// Returned by host [`Scheduler`](crate::timer::Scheduler) implementations
    /// that cannot start a timer
    #[error("Could not schedule timer: {0}")]
    Schedule(String),

    #[error("Invalid range {start}..{end}")]
    InvalidRange { start: usize, end: usize },

    #[error("No such buffer: {0}")]
    NoSuchBuffer(usize),
}
