//! Configuration file support
//!
//! Loads settings from ~/.hisym.toml (or %USERPROFILE%\.hisym.toml on Windows)
//!
//! Every key is optional; missing keys keep their defaults.
//!
//! Example:
//! ```text
//! # hisym configuration
//! idle-delay = 1.5
//! highlight-single-occurrence = true
//! highlight-on-navigation = false
//! ignore = ["^TODO$", "^FIXME$"]
//! foreground-color = "black"
//! occurrence-message = ["explicit", "navigation"]
//! colors = ["yellow", "DeepPink", "#00ffff"]
//! symbol-chars = "_"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// When to echo occurrence counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageMode {
    /// After toggling a highlight or running the count command
    Explicit,
    /// After the idle timer highlights a symbol
    Transient,
    /// After jumping to an occurrence
    Navigation,
}

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Seconds of idle time before the symbol at point is highlighted.
    /// Zero highlights after every command.
    pub idle_delay: f64,
    /// Highlight the symbol at point even if it occurs only once
    pub highlight_single_occurrence: bool,
    /// Highlight the symbol at point right after a jump
    pub highlight_on_navigation: bool,
    /// Regexes for symbols that are never highlighted or navigated
    pub ignore: Vec<String>,
    /// Foreground for explicit highlights; an empty string disables it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<String>,
    /// Which commands echo "Occurrence k/n"
    pub occurrence_message: Vec<MessageMode>,
    /// Palette for explicit highlights; empty means hashed colors
    pub colors: Vec<String>,
    /// Characters besides alphanumerics that make up symbols
    pub symbol_chars: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            idle_delay: 1.5,
            highlight_single_occurrence: true,
            highlight_on_navigation: false,
            ignore: Vec::new(),
            foreground_color: Some("black".to_string()),
            occurrence_message: vec![MessageMode::Explicit],
            colors: Vec::new(),
            symbol_chars: "_".to_string(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".hisym.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".hisym.toml"))
        }
    }

    /// Load configuration from the default path.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse config file contents
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Save current configuration to the default path
    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    /// Write the configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = format!(
            "# hisym configuration\n# Generated automatically\n\n{}",
            self.to_toml_string()?
        );
        fs::write(path, contents)?;
        Ok(())
    }

    /// Idle delay as a duration; negative values mean every event
    pub fn idle_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.idle_delay.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn message_enabled(&self, mode: MessageMode) -> bool {
        self.occurrence_message.contains(&mode)
    }
}
