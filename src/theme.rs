//! Colour themes applied by the recolorer.
//!
//! A [`Theme`] is a background/foreground pair of 24-bit RGB colours, plus
//! optional derived colours (`muted`, `accent`) that downstream consumers may
//! use for chrome around the page. The recoloring algorithm itself only ever
//! reads `background` and `foreground`.
//!
//! Colours parse from the usual hex notations (`#0F172A`, `0F172A`, `#fff`).

use thiserror::Error;

/// A 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Failure to parse a hex colour string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    /// Input was not 3 or 6 hex digits after an optional leading `#`.
    #[error("colour '{input}' must be 3 or 6 hex digits, e.g. '#0F172A'")]
    BadLength { input: String },

    /// Input had the right shape but a non-hex character.
    #[error("colour '{input}' contains a non-hex digit")]
    BadDigit { input: String },
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parses `#RRGGBB`, `RRGGBB` or the shorthand `#RGB` (each digit doubled).
    pub fn from_hex(input: &str) -> Result<Self, ParseColorError> {
        let digits = input.strip_prefix('#').unwrap_or(input);
        // the byte slicing below assumes ASCII; multi-byte input must fail
        // here rather than panic on a char boundary
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError::BadDigit {
                input: input.to_string(),
            });
        }
        let expanded;
        let digits = match digits.len() {
            6 => digits,
            3 => {
                expanded = digits
                    .chars()
                    .flat_map(|c| [c, c])
                    .collect::<String>();
                expanded.as_str()
            }
            _ => {
                return Err(ParseColorError::BadLength {
                    input: input.to_string(),
                })
            }
        };
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ParseColorError::BadDigit {
                input: input.to_string(),
            })
        };
        Ok(Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Lowercase `#rrggbb` form, the inverse of [`Rgb::from_hex`].
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s)
    }
}

/// A visual theme: the two colours the recolorer interpolates between, plus
/// optional derived colours for callers that render surrounding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Theme {
    /// Colour that full-lightness (white) pixels map to.
    pub background: Rgb,
    /// Colour that zero-lightness (black) pixels map to.
    pub foreground: Rgb,
    /// Optional secondary text colour; ignored by the recoloring algorithm.
    #[serde(default)]
    pub muted: Option<Rgb>,
    /// Optional highlight colour; ignored by the recoloring algorithm.
    #[serde(default)]
    pub accent: Option<Rgb>,
}

impl Theme {
    pub const fn new(background: Rgb, foreground: Rgb) -> Self {
        Theme {
            background,
            foreground,
            muted: None,
            accent: None,
        }
    }

    pub fn with_muted(mut self, muted: Rgb) -> Self {
        self.muted = Some(muted);
        self
    }

    pub fn with_accent(mut self, accent: Rgb) -> Self {
        self.accent = Some(accent);
        self
    }

    /// Dark slate background with near-white text.
    pub const fn midnight() -> Self {
        Theme {
            background: Rgb::new(0x0F, 0x17, 0x2A),
            foreground: Rgb::new(0xF1, 0xF5, 0xF9),
            muted: Some(Rgb::new(0x94, 0xA3, 0xB8)),
            accent: Some(Rgb::new(0x38, 0xBD, 0xF8)),
        }
    }

    /// Plain white background with near-black text.
    pub const fn paper() -> Self {
        Theme {
            background: Rgb::new(0xFF, 0xFF, 0xFF),
            foreground: Rgb::new(0x11, 0x18, 0x27),
            muted: Some(Rgb::new(0x6B, 0x72, 0x80)),
            accent: Some(Rgb::new(0x25, 0x63, 0xEB)),
        }
    }

    /// Warm paper tone for long reading sessions.
    pub const fn sepia() -> Self {
        Theme {
            background: Rgb::new(0xF4, 0xEC, 0xD8),
            foreground: Rgb::new(0x5B, 0x46, 0x36),
            muted: Some(Rgb::new(0x8A, 0x73, 0x57)),
            accent: Some(Rgb::new(0xA0, 0x52, 0x2D)),
        }
    }

    /// Looks up a built-in preset by name (case-insensitive).
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "midnight" => Some(Self::midnight()),
            "paper" => Some(Self::paper()),
            "sepia" => Some(Self::sepia()),
            _ => None,
        }
    }

    /// Names accepted by [`Theme::preset`], for CLI help text.
    pub const PRESET_NAMES: &'static [&'static str] = &["midnight", "paper", "sepia"];
}
