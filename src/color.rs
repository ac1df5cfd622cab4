//! Symbol colors
//!
//! Every highlighted symbol gets a background color. By default the color
//! is derived from a SHA-256 hash of the symbol text, so the same symbol is
//! painted the same way in every buffer and every session. A configured
//! palette replaces hashing with a ring that hands out colors in order.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::{HighlightError, Result};

/// Hand-tuned hue (degrees) to saturation control points, sorted by hue
const HUE_SATURATION: [(f64, f64); 11] = [
    (0.0, 0.45),
    (30.0, 0.55),
    (60.0, 0.70),
    (90.0, 0.60),
    (120.0, 0.50),
    (180.0, 0.55),
    (210.0, 0.45),
    (240.0, 0.35),
    (270.0, 0.40),
    (300.0, 0.45),
    (330.0, 0.45),
];

/// Named colors accepted in config files (X11 names, case-insensitive)
const NAMED_COLORS: [(&str, Rgb); 11] = [
    ("yellow", Rgb::new(0xff, 0xff, 0x00)),
    ("deeppink", Rgb::new(0xff, 0x14, 0x93)),
    ("cyan", Rgb::new(0x00, 0xff, 0xff)),
    ("mediumpurple1", Rgb::new(0xab, 0x82, 0xff)),
    ("springgreen1", Rgb::new(0x00, 0xff, 0x7f)),
    ("darkorange", Rgb::new(0xff, 0x8c, 0x00)),
    ("hotpink1", Rgb::new(0xff, 0x6e, 0xb4)),
    ("royalblue1", Rgb::new(0x48, 0x76, 0xff)),
    ("olivedrab", Rgb::new(0x6b, 0x8e, 0x23)),
    ("black", Rgb::new(0x00, 0x00, 0x00)),
    ("white", Rgb::new(0xff, 0xff, 0xff)),
];

/// A 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or a known color name
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(HighlightError::InvalidColor(s.to_string()));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .map_err(|_| HighlightError::InvalidColor(s.to_string()))
            };
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?));
        }

        let lower = s.to_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, rgb)| *rgb)
            .ok_or_else(|| HighlightError::InvalidColor(s.to_string()))
    }

    /// Convert an HSV triple (hue in degrees, saturation and value in 0..=1)
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let sector = h.floor();
        let f = h - sector;
        let p = value * (1.0 - saturation);
        let q = value * (1.0 - saturation * f);
        let t = value * (1.0 - saturation * (1.0 - f));

        let (r, g, b) = match sector as u32 {
            0 => (value, t, p),
            1 => (q, value, p),
            2 => (p, value, t),
            3 => (p, q, value),
            4 => (t, p, value),
            _ => (value, p, q),
        };

        Self::new(to_channel(r), to_channel(g), to_channel(b))
    }

    /// Format as `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn to_channel(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// How a highlighted symbol is painted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Style {
    /// A semantic style the renderer resolves by name
    Face(&'static str),
    /// Explicit background, with an optional foreground override
    Colors { bg: Rgb, fg: Option<Rgb> },
}

impl Style {
    /// Style used for the transient (idle) highlight
    pub const TRANSIENT: Style = Style::Face("highlight-symbol-face");

    pub fn background(&self) -> Option<Rgb> {
        match self {
            Style::Face(_) => None,
            Style::Colors { bg, .. } => Some(*bg),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Style::Face(name) => f.write_str(name),
            Style::Colors { bg, fg: Some(fg) } => write!(f, "{} on {}", fg, bg),
            Style::Colors { bg, fg: None } => write!(f, "on {}", bg),
        }
    }
}

/// Stable background color for a symbol
pub fn color_for(text: &str) -> Rgb {
    let hue = hue_for(text);
    Rgb::from_hsv(hue, saturation_at(hue), 1.0)
}

/// Reduce the symbol's SHA-256 digest to a hue in [0, 360)
fn hue_for(text: &str) -> f64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let n = u64::from_be_bytes(head);
    (n % 36_000) as f64 / 100.0
}

/// Interpolated saturation for a hue, wrapping around the table ends
fn saturation_at(hue: f64) -> f64 {
    let (lower, upper) = bracket(hue);
    let span = upper.0 - lower.0;
    if span <= 0.0 {
        return lower.1;
    }
    lower.1 + (upper.1 - lower.1) * (hue - lower.0) / span
}

/// The control points on either side of `hue`.
///
/// The table is cyclic: past the last point the upper bracket is the first
/// point shifted by 360, and before the first point the lower bracket is the
/// last point shifted by -360.
fn bracket(hue: f64) -> ((f64, f64), (f64, f64)) {
    let len = HUE_SATURATION.len();
    match HUE_SATURATION.iter().rposition(|&(h, _)| h <= hue) {
        Some(i) if i + 1 < len => (HUE_SATURATION[i], HUE_SATURATION[i + 1]),
        Some(i) => {
            let (h, s) = HUE_SATURATION[0];
            (HUE_SATURATION[i], (h + 360.0, s))
        }
        None => {
            let (h, s) = HUE_SATURATION[len - 1];
            ((h - 360.0, s), HUE_SATURATION[0])
        }
    }
}

/// Where highlight colors come from
#[derive(Debug, Clone)]
enum ColorSource {
    Hashed,
    Palette { colors: Vec<Rgb>, next: usize },
}

/// Hands out styles for newly highlighted symbols
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    source: ColorSource,
    foreground: Option<Rgb>,
}

impl ColorAssigner {
    /// Hash-based colors
    pub fn hashed(foreground: Option<Rgb>) -> Self {
        Self {
            source: ColorSource::Hashed,
            foreground,
        }
    }

    /// Rotate through a fixed palette. An empty palette falls back to hashing.
    pub fn palette(colors: Vec<Rgb>, foreground: Option<Rgb>) -> Self {
        if colors.is_empty() {
            return Self::hashed(foreground);
        }
        Self {
            source: ColorSource::Palette { colors, next: 0 },
            foreground,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let foreground = config
            .foreground_color
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(Rgb::parse)
            .transpose()?;
        let colors = config
            .colors
            .iter()
            .map(|c| Rgb::parse(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::palette(colors, foreground))
    }

    pub fn is_hashed(&self) -> bool {
        matches!(self.source, ColorSource::Hashed)
    }

    /// Style the next highlight of `text` would get, without using it up
    pub fn peek_style(&self, text: &str) -> Style {
        let bg = match &self.source {
            ColorSource::Hashed => color_for(text),
            ColorSource::Palette { colors, next } => colors[*next % colors.len()],
        };
        Style::Colors {
            bg,
            fg: self.foreground,
        }
    }

    /// Move the palette on to its next color. No-op when hashing.
    pub fn advance(&mut self) {
        if let ColorSource::Palette { colors, next } = &mut self.source {
            *next = (*next + 1) % colors.len();
        }
    }

}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self::hashed(None)
    }
}
