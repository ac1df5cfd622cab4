//! hisym - symbol highlighting for text editors
//!
//! Highlights identifier-like symbols with a stable color per symbol, keeps
//! the highlights in step across every open buffer, highlights the symbol
//! under the cursor after an idle delay, and jumps between occurrences.
//!
//! The host editor plugs in through three traits: [`TextView`] for text and
//! cursor access, [`Renderer`] for painting, and [`Scheduler`] for the idle
//! timer. [`HighlightSymbol`] ties everything together.

pub mod buffer;
pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod occurrence;
pub mod registry;
pub mod session;
pub mod symbol;
pub mod text;
pub mod timer;
pub mod transient;

pub use color::{color_for, ColorAssigner, Rgb, Style};
pub use config::{Config, MessageMode};
pub use error::{HighlightError, Result};
pub use registry::{HighlightRegistry, Renderer};
pub use session::HighlightSymbol;
pub use symbol::{Symbol, SymbolMatcher, SymbolPattern};
pub use text::{BufferId, TextView};
pub use timer::{Scheduler, TimerHandle};
